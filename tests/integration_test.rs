/// Integration tests for the application layer
mod test_utilities;

use collector_deploy::composition::domain::context::keys;
use collector_deploy::composition::domain::runtime_config as env;
use collector_deploy::composition::domain::EntryPoint;
use collector_deploy::composition::services::NETWORK_INTERFACE_ACTIONS;
use collector_deploy::prelude::*;
use std::path::PathBuf;
use test_utilities::mocks::*;

const CUSTOM_METRICS: &str = r#"
[[metric]]
name = "db_connections"
query = "SELECT count(*) FROM pg_stat_activity"

[[metric]]
name = "db_size_bytes"
query = "SELECT pg_database_size(current_database())"
"#;

fn compose(
    context: DeploymentContext,
    reader: MockCustomMetricsReader,
) -> (Result<ComposeResponse>, MockProgressReporter) {
    let progress_reporter = MockProgressReporter::new();
    let use_case = ComposeDeploymentUseCase::new(reader, progress_reporter.clone());
    let result = use_case.execute(ComposeRequest::new(PathBuf::from("/srv/collector"), context));
    (result, progress_reporter)
}

fn prometheus() -> DeploymentContext {
    DeploymentContext::new().with(keys::PROMETHEUS_URL, "https://aps.example.com/api/v1/remote_write")
}

#[test]
fn test_scenario_function_local_detached() {
    let (result, reporter) = compose(prometheus(), MockCustomMetricsReader::missing());
    let plan = result.unwrap().plan;

    assert_eq!(plan.compute_targets.len(), 1);
    let target = &plan.compute_targets[0];
    assert_eq!(target.kind(), ComputeKind::Function);
    assert!(!target.network.is_attached());

    assert_eq!(plan.triggers.len(), 1);
    assert_eq!(
        plan.triggers[0].kind().schedule_expression().as_deref(),
        Some("rate(5 minutes)")
    );
    assert_eq!(plan.triggers[0].target_id(), target.logical_id);

    let scope = plan.identity.scope();
    for action in NETWORK_INTERFACE_ACTIONS {
        assert!(!scope.grants(action));
    }
    assert!(!scope.grants("ssm:GetParameter"));
    assert!(plan.parameter.is_none());
    assert!(reporter.completed());
}

#[test]
fn test_scenario_container_service_attached() {
    let context = DeploymentContext::new()
        .with(keys::RUN_MODE, "CRON")
        .with(keys::EXPORTER_TYPE, "cloudwatch")
        .with(keys::VPC_ID, "vpc-0abc")
        .with(keys::SUBNET_IDS, "subnet-1,subnet-2")
        .with(keys::NETWORK_ATTACHED, "true");
    let (result, _) = compose(context, MockCustomMetricsReader::missing());
    let plan = result.unwrap().plan;

    assert_eq!(plan.compute_targets.len(), 1);
    let target = &plan.compute_targets[0];
    assert_eq!(target.kind(), ComputeKind::ContainerService);

    let placement = target.network.placement().unwrap();
    let subnets: Vec<&str> = placement.subnet_ids().iter().map(|s| s.as_str()).collect();
    assert_eq!(subnets, vec!["subnet-1", "subnet-2"]);

    for action in NETWORK_INTERFACE_ACTIONS {
        assert!(plan.identity.scope().grants(action));
    }
    assert!(plan.triggers.is_empty());
    assert_eq!(target.environment.literal(env::RUN_MODE), Some("CRON"));
}

#[test]
fn test_scenario_events_collector_shares_identity() {
    let context = prometheus().with(keys::EVENTS_TRIGGER, "true");
    let (result, _) = compose(context, MockCustomMetricsReader::missing());
    let plan = result.unwrap().plan;

    assert_eq!(plan.compute_targets.len(), 2);
    assert_eq!(plan.triggers.len(), 2);

    let entry_points: Vec<EntryPoint> = plan.triggers.iter().map(|t| t.entry_point()).collect();
    assert_eq!(entry_points, vec![EntryPoint::Collector, EntryPoint::EventsCollector]);
    assert_ne!(plan.triggers[0].target_id(), plan.triggers[1].target_id());

    for target in &plan.compute_targets {
        assert_eq!(target.role_id, plan.identity.logical_id());
    }

    let events = plan.target(EntryPoint::EventsCollector).unwrap();
    assert!(events.environment.contains(env::EXPORTER_TYPE));
    assert!(events.environment.contains(env::PROMETHEUS_REMOTE_WRITE_URL));
    assert!(events.environment.contains(env::LOG_LEVEL));
    assert!(!events.environment.contains(env::RUN_MODE));
}

#[test]
fn test_fargate_events_collector_identity_trusts_both_services() {
    let context = DeploymentContext::new()
        .with(keys::COMPUTE_TARGET, "fargate")
        .with(keys::EXPORTER_TYPE, "cloudwatch")
        .with(keys::VPC_ID, "vpc-0abc")
        .with(keys::SUBNET_IDS, "subnet-1")
        .with(keys::EVENTS_TRIGGER, "true");
    let (result, _) = compose(context, MockCustomMetricsReader::missing());
    let plan = result.unwrap().plan;

    let kinds: Vec<ComputeKind> = plan.compute_targets.iter().map(|t| t.kind()).collect();
    assert_eq!(kinds, vec![ComputeKind::ContainerService, ComputeKind::Function]);
    assert_eq!(
        plan.identity.principals(),
        &[ServicePrincipal::EcsTasks, ServicePrincipal::Lambda]
    );

    let json = CloudFormationFormatter::new().format(&plan).unwrap();
    let template: serde_json::Value = serde_json::from_str(&json).unwrap();
    let resources = &template["Resources"];
    assert_eq!(
        resources["CollectorRole"]["Properties"]["AssumeRolePolicyDocument"]["Statement"][0]
            ["Principal"]["Service"],
        serde_json::json!(["ecs-tasks.amazonaws.com", "lambda.amazonaws.com"])
    );
    assert_eq!(
        resources["CollectorTaskDefinition"]["Properties"]["ExecutionRoleArn"],
        serde_json::json!({ "Fn::GetAtt": ["CollectorExecutionRole", "Arn"] })
    );
}

#[test]
fn test_attached_function_without_security_group_fails() {
    let context = prometheus()
        .with(keys::VPC_ID, "vpc-0abc")
        .with(keys::SUBNET_IDS, "subnet-1");
    let (result, reporter) = compose(context, MockCustomMetricsReader::missing());

    let err = result.unwrap_err();
    match err.downcast_ref::<ComposeError>() {
        Some(ComposeError::Configuration { key, .. }) => assert_eq!(key, "securityGroupIds"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!reporter
        .get_messages()
        .iter()
        .any(|m| m.ends_with("network-resolved")));
}

#[test]
fn test_custom_metrics_parameter_scopes_read_access() {
    let reader = MockCustomMetricsReader::new(CUSTOM_METRICS);
    let context = prometheus().with(keys::CUSTOM_METRICS_FILE, "custom-metrics.toml");
    let (result, _) = compose(context, reader.clone());
    let response = result.unwrap();
    let plan = &response.plan;

    assert_eq!(
        reader.requested_paths(),
        vec![PathBuf::from("/srv/collector/custom-metrics.toml")]
    );
    assert_eq!(response.custom_metric_count, Some(2));

    let parameter = plan.parameter.as_ref().unwrap();
    assert_eq!(parameter.value(), CUSTOM_METRICS);

    let statements: Vec<_> = plan
        .identity
        .scope()
        .statements_granting("ssm:GetParameter")
        .collect();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].resources(),
        &[ResourcePattern::Arn(parameter.arn())]
    );

    let collector = plan.target(EntryPoint::Collector).unwrap();
    assert!(collector.environment.contains(env::CUSTOM_METRICS_FILE));
}

#[test]
fn test_missing_custom_metrics_file_aborts_composition() {
    let context = prometheus().with(keys::CUSTOM_METRICS_FILE, "absent.toml");
    let (result, reporter) = compose(context, MockCustomMetricsReader::missing());

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ComposeError>(),
        Some(ComposeError::CustomMetricsFileNotFound { .. })
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::CompositionFailed);
    assert!(!reporter
        .get_messages()
        .iter()
        .any(|m| m.starts_with("Progress:")));
    assert!(!reporter.completed());
}

#[test]
fn test_empty_subnets_fail_before_compute_creation() {
    let context = prometheus()
        .with(keys::NETWORK_ATTACHED, "true")
        .with(keys::VPC_ID, "vpc-0abc")
        .with(keys::SUBNET_IDS, "");
    let (result, reporter) = compose(context, MockCustomMetricsReader::missing());

    let err = result.unwrap_err();
    match err.downcast_ref::<ComposeError>() {
        Some(ComposeError::Configuration { key, .. }) => assert_eq!(key, "subnetIds"),
        other => panic!("unexpected error: {:?}", other),
    }

    let messages = reporter.get_messages();
    assert!(messages.iter().any(|m| m.ends_with("access-scoped")));
    assert!(!messages.iter().any(|m| m.ends_with("network-resolved")));
    assert!(!messages.iter().any(|m| m.ends_with("compute-target-created")));
}

#[test]
fn test_network_capabilities_iff_attached() {
    let detached = prometheus();
    let attached = prometheus()
        .with(keys::VPC_ID, "vpc-0abc")
        .with(keys::SUBNET_IDS, "subnet-a1")
        .with(keys::SECURITY_GROUP_IDS, "sg-01");

    for (context, expected) in [(detached, false), (attached, true)] {
        let (result, _) = compose(context, MockCustomMetricsReader::missing());
        let plan = result.unwrap().plan;

        let any_attached = plan.compute_targets.iter().any(|t| t.network.is_attached());
        assert_eq!(any_attached, expected);
        for action in NETWORK_INTERFACE_ACTIONS {
            assert_eq!(plan.identity.scope().grants(action), expected);
        }
    }
}

#[test]
fn test_secret_statements_present_in_every_shape() {
    let shapes = [
        prometheus(),
        prometheus().with(keys::EVENTS_TRIGGER, "true"),
        DeploymentContext::new()
            .with(keys::COMPUTE_TARGET, "fargate")
            .with(keys::EXPORTER_TYPE, "cloudwatch")
            .with(keys::VPC_ID, "vpc-0abc")
            .with(keys::SUBNET_IDS, "subnet-1"),
    ];

    for context in shapes {
        let (result, _) = compose(context, MockCustomMetricsReader::missing());
        let plan = result.unwrap().plan;
        let scope = plan.identity.scope();

        let list = scope
            .statements_granting("secretsmanager:ListSecrets")
            .next()
            .unwrap();
        assert!(list.condition().is_none());

        let read = scope
            .statements_granting("secretsmanager:GetSecretValue")
            .next()
            .unwrap();
        assert!(read.condition().is_some());
    }
}

#[test]
fn test_warnings_are_reported() {
    let context = DeploymentContext::new()
        .with(keys::NETWORK_ATTACHED, "false")
        .with(keys::VPC_ID, "vpc-0abc")
        .with("clusterName", "metrics");
    let (result, reporter) = compose(context, MockCustomMetricsReader::missing());
    let response = result.unwrap();

    assert_eq!(response.warnings.len(), 3);
    let reported = reporter.warnings();
    assert_eq!(reported.len(), 3);
    assert!(reported.iter().any(|w| w.contains("clusterName")));
    assert!(reported.iter().any(|w| w.contains("Network attachment is disabled")));
}

#[test]
fn test_contradicting_compute_selection_fails() {
    let context = prometheus()
        .with(keys::COMPUTE_TARGET, "lambda")
        .with(keys::RUN_MODE, "CRON");
    let (result, _) = compose(context, MockCustomMetricsReader::missing());

    let err = result.unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::CompositionFailed);
}

#[test]
fn test_independent_composers_on_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let context = if i % 2 == 0 {
                    prometheus()
                } else {
                    prometheus().with(keys::EVENTS_TRIGGER, "true")
                };
                let (result, _) = compose(context, MockCustomMetricsReader::missing());
                result.unwrap().plan
            })
        })
        .collect();

    let plans: Vec<DeploymentPlan> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, plan) in plans.iter().enumerate() {
        let expected = if i % 2 == 0 { 1 } else { 2 };
        assert_eq!(plan.compute_targets.len(), expected);
    }
    assert_ne!(
        plans[0].metadata.composition_id(),
        plans[2].metadata.composition_id()
    );
}

#[test]
fn test_rendered_template_contains_every_resource() {
    let context = prometheus().with(keys::EVENTS_TRIGGER, "true");
    let (result, _) = compose(context, MockCustomMetricsReader::missing());
    let plan = result.unwrap().plan;

    let json = CloudFormationFormatter::new().format(&plan).unwrap();
    let template: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    let resources = template["Resources"].as_object().unwrap();
    assert!(resources.contains_key("CollectorRole"));
    assert!(resources.contains_key("CollectorFunction"));
    assert!(resources.contains_key("EventsCollectorFunction"));
    assert!(resources.contains_key("CollectorSchedule"));
    assert!(resources.contains_key("DatabaseEventsRule"));

    let markdown = MarkdownFormatter::new().format(&plan).unwrap();
    assert!(markdown.contains("# Collector Deployment Plan"));
    assert!(markdown.contains("CollectorSchedule"));
}
