//! Configuration file support for collector-deploy.
//!
//! Provides YAML-based configuration through `collector-deploy.config.yml`
//! files. Keys are camelCase and map one to one onto deployment context keys;
//! `--context KEY=VALUE` flags override them.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::application::dto::OutputFormat;
use crate::composition::domain::context::{keys, DeploymentContext};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "collector-deploy.config.yml";

/// A list given either as YAML sequence or as one comma separated string.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum IdList {
    Many(Vec<String>),
    Joined(String),
}

impl IdList {
    fn joined(&self) -> String {
        match self {
            IdList::Many(items) => items.join(","),
            IdList::Joined(joined) => joined.clone(),
        }
    }
}

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Output format, overridden by `--format`
    pub format: Option<String>,
    pub exporter_type: Option<String>,
    pub prometheus_url: Option<String>,
    pub vpc_id: Option<String>,
    pub subnet_ids: Option<IdList>,
    pub security_group_ids: Option<IdList>,
    pub ssm_parameter_path: Option<String>,
    pub compute_target: Option<String>,
    pub run_mode: Option<String>,
    pub build_source: Option<String>,
    pub artifact_uri: Option<String>,
    pub events_artifact_uri: Option<String>,
    pub custom_metrics_file: Option<String>,
    pub events_trigger: Option<bool>,
    pub network_attached: Option<bool>,
    pub target_arch: Option<String>,
    pub cron_schedule: Option<String>,
    pub log_level: Option<String>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    /// Deployment context holding every value the file sets.
    pub fn to_context(&self) -> DeploymentContext {
        let mut context = DeploymentContext::new();
        let strings = [
            (keys::EXPORTER_TYPE, &self.exporter_type),
            (keys::PROMETHEUS_URL, &self.prometheus_url),
            (keys::VPC_ID, &self.vpc_id),
            (keys::SSM_PARAMETER_PATH, &self.ssm_parameter_path),
            (keys::COMPUTE_TARGET, &self.compute_target),
            (keys::RUN_MODE, &self.run_mode),
            (keys::BUILD_SOURCE, &self.build_source),
            (keys::ARTIFACT_URI, &self.artifact_uri),
            (keys::EVENTS_ARTIFACT_URI, &self.events_artifact_uri),
            (keys::CUSTOM_METRICS_FILE, &self.custom_metrics_file),
            (keys::TARGET_ARCH, &self.target_arch),
            (keys::CRON_SCHEDULE, &self.cron_schedule),
            (keys::LOG_LEVEL, &self.log_level),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                context.set(key, value.clone());
            }
        }

        for (key, list) in [
            (keys::SUBNET_IDS, &self.subnet_ids),
            (keys::SECURITY_GROUP_IDS, &self.security_group_ids),
        ] {
            if let Some(list) = list {
                context.set(key, list.joined());
            }
        }

        for (key, flag) in [
            (keys::EVENTS_TRIGGER, self.events_trigger),
            (keys::NETWORK_ATTACHED, self.network_attached),
        ] {
            if let Some(flag) = flag {
                context.set(key, flag.to_string());
            }
        }

        context
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    eprintln!("📄 Auto-discovered config file: {}", config_path.display());
    Ok(Some(config))
}

/// Checks what can be checked without composing: the output format and
/// list entries. Everything else is validated during composition.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(format) = &config.format {
        if let Err(e) = format.parse::<OutputFormat>() {
            bail!("Invalid config: format: {}", e);
        }
    }

    for (field, list) in [
        ("subnetIds", &config.subnet_ids),
        ("securityGroupIds", &config.security_group_ids),
    ] {
        if let Some(IdList::Many(items)) = list {
            if let Some(i) = items.iter().position(|item| item.trim().is_empty()) {
                bail!(
                    "Invalid config: {}[{}] must not be empty.\n\n\
                     💡 Hint: Remove the blank entry or give the full identifier.",
                    field,
                    i
                );
            }
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!("⚠️  Warning: Unknown config field '{}' will be ignored.", key);
    }
}
