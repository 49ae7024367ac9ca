use crate::shared::error::ComposeError;
use crate::shared::Result;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Context keys understood by the composer.
pub mod keys {
    pub const EXPORTER_TYPE: &str = "exporterType";
    pub const PROMETHEUS_URL: &str = "prometheusUrl";
    pub const VPC_ID: &str = "vpcId";
    pub const SUBNET_IDS: &str = "subnetIds";
    pub const SECURITY_GROUP_IDS: &str = "securityGroupIds";
    pub const SSM_PARAMETER_PATH: &str = "ssmParameterPath";
    pub const COMPUTE_TARGET: &str = "computeTarget";
    pub const RUN_MODE: &str = "runMode";
    pub const BUILD_SOURCE: &str = "buildSource";
    pub const ARTIFACT_URI: &str = "artifactUri";
    pub const EVENTS_ARTIFACT_URI: &str = "eventsArtifactUri";
    pub const CUSTOM_METRICS_FILE: &str = "customMetricsFile";
    pub const EVENTS_TRIGGER: &str = "eventsTrigger";
    pub const NETWORK_ATTACHED: &str = "networkAttached";
    pub const TARGET_ARCH: &str = "targetArch";
    pub const CRON_SCHEDULE: &str = "cronSchedule";
    pub const LOG_LEVEL: &str = "logLevel";

    pub const ALL: [&str; 17] = [
        EXPORTER_TYPE,
        PROMETHEUS_URL,
        VPC_ID,
        SUBNET_IDS,
        SECURITY_GROUP_IDS,
        SSM_PARAMETER_PATH,
        COMPUTE_TARGET,
        RUN_MODE,
        BUILD_SOURCE,
        ARTIFACT_URI,
        EVENTS_ARTIFACT_URI,
        CUSTOM_METRICS_FILE,
        EVENTS_TRIGGER,
        NETWORK_ATTACHED,
        TARGET_ARCH,
        CRON_SCHEDULE,
        LOG_LEVEL,
    ];

    pub fn is_known(key: &str) -> bool {
        ALL.contains(&key)
    }
}

/// External configuration snapshot: string keys to raw string values.
///
/// Values are taken as given; blank values read back as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentContext {
    values: BTreeMap<String, String>,
}

impl DeploymentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key`, replacing any earlier value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Layers `other` on top of `self`; keys present in `other` win.
    pub fn merge(&mut self, other: DeploymentContext) {
        self.values.extend(other.values);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// True when the key was supplied at all, even with a blank value.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| ComposeError::configuration(key, e.to_string()).into()),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Some(true)),
                "false" | "no" | "0" => Ok(Some(false)),
                _ => Err(ComposeError::configuration(
                    key,
                    format!("'{}' is not a boolean (use true or false)", raw),
                )
                .into()),
            },
        }
    }

    pub fn unknown_keys(&self) -> Vec<&str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|k| !keys::is_known(k))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
