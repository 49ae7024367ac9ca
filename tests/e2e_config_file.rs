/// End-to-end tests for config file loading and CLI context merging.
///
/// These tests exercise the full flow from config file on disk through CLI invocation
/// to correct output, using `assert_cmd` and `tempfile` for isolated test environments.
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Write a config file at the specified path.
fn write_config(path: &std::path::Path, content: &str) {
    fs::write(path, content).unwrap();
}

fn run(dir: &TempDir, extra: &[&str]) -> std::process::Output {
    cargo_bin_cmd!("collector-deploy")
        .args(["-p", dir.path().to_str().unwrap()])
        .args(extra)
        .output()
        .unwrap()
}

fn template(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Config File Auto-Discovery Tests
// ============================================================================

mod auto_discovery_tests {
    use super::*;

    #[test]
    fn test_auto_discovery_applies_deployment_shape() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("collector-deploy.config.yml"),
            r#"
computeTarget: fargate
exporterType: cloudwatch
vpcId: vpc-0abc
subnetIds:
  - subnet-1
  - subnet-2
securityGroupIds: sg-01
"#,
        );

        let output = run(&dir, &[]);

        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Auto-discovered config file"));

        let template = template(&output);
        let service = &template["Resources"]["CollectorService"];
        assert_eq!(service["Type"], "AWS::ECS::Service");
        let subnets = &service["Properties"]["NetworkConfiguration"]["AwsvpcConfiguration"]["Subnets"];
        assert_eq!(subnets, &serde_json::json!(["subnet-1", "subnet-2"]));
        assert!(template["Resources"].get("CollectorSchedule").is_none());
    }

    #[test]
    fn test_auto_discovery_applies_format() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("collector-deploy.config.yml"),
            "format: markdown\nexporterType: cloudwatch\n",
        );

        let output = run(&dir, &[]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("# Collector Deployment Plan"));
    }

    #[test]
    fn test_no_config_file_runs_normally() {
        let dir = TempDir::new().unwrap();

        let output = run(&dir, &[]);

        assert!(output.status.success());
        let template = template(&output);
        assert!(template["Resources"].get("CollectorFunction").is_some());
    }
}

// ============================================================================
// Explicit --config Tests
// ============================================================================

mod explicit_config_tests {
    use super::*;

    #[test]
    fn test_explicit_config_path() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("staging.yml");
        write_config(&config_path, "exporterType: cloudwatch\neventsTrigger: true\n");

        let output = run(&dir, &["--config", config_path.to_str().unwrap()]);

        assert!(output.status.success());
        let template = template(&output);
        assert!(template["Resources"]
            .get("EventsCollectorFunction")
            .is_some());
    }

    #[test]
    fn test_explicit_config_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.yml");

        let output = run(&dir, &["--config", missing.to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("collector-deploy.config.yml"),
            "exporterType: [unterminated\n",
        );

        let output = run(&dir, &[]);

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Failed to parse config file"));
    }

    #[test]
    fn test_unknown_config_field_warns() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("collector-deploy.config.yml"),
            "exporterType: cloudwatch\nclusterName: metrics\n",
        );

        let output = run(&dir, &[]);

        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Unknown config field 'clusterName'"));
    }
}

// ============================================================================
// CLI Merge Tests
// ============================================================================

mod merge_tests {
    use super::*;

    #[test]
    fn test_cli_context_overrides_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("collector-deploy.config.yml"),
            "exporterType: prometheus\nlogLevel: warn\n",
        );

        let output = run(&dir, &["-c", "exporterType=cloudwatch"]);

        assert!(output.status.success());
        let template = template(&output);
        let variables = &template["Resources"]["CollectorFunction"]["Properties"]["Environment"]["Variables"];
        assert_eq!(variables["EXPORTER_TYPE"], "cloudwatch");
        assert_eq!(variables["LOG_LEVEL"], "warn");
    }

    #[test]
    fn test_cli_format_overrides_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("collector-deploy.config.yml"),
            "format: markdown\nexporterType: cloudwatch\n",
        );

        let output = run(&dir, &["-f", "json"]);

        assert!(output.status.success());
        let template = template(&output);
        assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    }

    #[test]
    fn test_target_arch_flag_selects_architecture() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("collector-deploy.config.yml"),
            "exporterType: cloudwatch\ntargetArch: x86_64\n",
        );

        let output = run(&dir, &["--target-arch", "arm64"]);

        assert!(output.status.success());
        let template = template(&output);
        assert_eq!(
            template["Resources"]["CollectorFunction"]["Properties"]["Architectures"],
            serde_json::json!(["arm64"])
        );
    }

    #[test]
    fn test_network_disabled_in_config_warns_and_detaches() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("collector-deploy.config.yml"),
            "exporterType: cloudwatch\nnetworkAttached: false\nvpcId: vpc-0abc\n",
        );

        let output = run(&dir, &[]);

        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Network attachment is disabled"));
        let template = template(&output);
        assert!(template["Resources"]["CollectorFunction"]["Properties"]
            .get("VpcConfig")
            .is_none());
    }
}
