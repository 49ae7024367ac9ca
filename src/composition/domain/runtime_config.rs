use crate::composition::domain::parameter::{ParameterRef, PersistedParameter};
use crate::shared::Result;

pub const EXPORTER_TYPE: &str = "EXPORTER_TYPE";
pub const PROMETHEUS_REMOTE_WRITE_URL: &str = "PROMETHEUS_REMOTE_WRITE_URL";
pub const RUN_MODE: &str = "RUN_MODE";
pub const CRON_SCHEDULE: &str = "CRON_SCHEDULE";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const CUSTOM_METRICS_FILE: &str = "CUSTOM_METRICS_FILE";

/// Value of one environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    /// Resolved at deploy time to the parameter's name
    Parameter(ParameterRef),
}

impl EnvValue {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            EnvValue::Literal(value) => Some(value),
            EnvValue::Parameter(_) => None,
        }
    }
}

/// Environment handed verbatim to a compute target, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    entries: Vec<(String, EnvValue)>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_name(name: &str) -> Result<()> {
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_uppercase() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            anyhow::bail!("'{}' is not a valid environment variable name", name);
        }
        Ok(())
    }

    fn put(&mut self, name: &str, value: EnvValue) -> Result<()> {
        Self::validate_name(name)?;
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Sets a literal value; an existing entry keeps its position.
    pub fn set_literal(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.put(name, EnvValue::Literal(value.into()))
    }

    /// Points `name` at a parameter. Requires the parameter itself, so a
    /// reference can never precede the parameter's creation.
    pub fn set_parameter(&mut self, name: &str, parameter: &PersistedParameter) -> Result<()> {
        self.put(name, EnvValue::Parameter(parameter.reference()))
    }

    pub fn get(&self, name: &str) -> Option<&EnvValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn literal(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(EnvValue::as_literal)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Copies the listed variables that are present into a new config.
    pub fn subset(&self, names: &[&str]) -> RuntimeConfig {
        RuntimeConfig {
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| names.contains(&n.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
