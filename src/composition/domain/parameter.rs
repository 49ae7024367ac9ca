use crate::shared::Result;
use std::fmt;

/// Maximum length of a parameter name, including the leading slash
const MAX_PARAMETER_NAME_LENGTH: usize = 1011;

/// Largest payload the standard tier accepts (4 KB)
pub const STANDARD_TIER_MAX_BYTES: usize = 4 * 1024;

/// Largest payload the advanced tier accepts (8 KB)
pub const ADVANCED_TIER_MAX_BYTES: usize = 8 * 1024;

/// Hierarchical parameter name such as `/database-collector/custom-metrics`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterName(String);

impl ParameterName {
    pub const DEFAULT: &'static str = "/database-collector/custom-metrics";

    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if !name.starts_with('/') {
            anyhow::bail!("parameter name '{}' must start with '/'", name);
        }
        if name.len() > MAX_PARAMETER_NAME_LENGTH {
            anyhow::bail!(
                "parameter name is too long ({} bytes). Maximum allowed: {} bytes",
                name.len(),
                MAX_PARAMETER_NAME_LENGTH
            );
        }
        if name.ends_with('/') || name.contains("//") {
            anyhow::bail!("parameter name '{}' has an empty path segment", name);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/'))
        {
            anyhow::bail!(
                "parameter name '{}' contains invalid characters. Only letters, digits, '_', '.', '-' and '/' are allowed.",
                name
            );
        }
        if name.to_lowercase().starts_with("/aws") || name.to_lowercase().starts_with("/ssm") {
            anyhow::bail!("parameter name '{}' uses a reserved prefix", name);
        }

        Ok(Self(name))
    }

    pub fn default_name() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterTier {
    Standard,
    Advanced,
}

impl ParameterTier {
    /// Smallest tier that holds `size` bytes.
    pub fn for_size(size: usize) -> Option<Self> {
        if size <= STANDARD_TIER_MAX_BYTES {
            Some(ParameterTier::Standard)
        } else if size <= ADVANCED_TIER_MAX_BYTES {
            Some(ParameterTier::Advanced)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParameterTier::Standard => "Standard",
            ParameterTier::Advanced => "Advanced",
        }
    }
}

/// Durable record holding the custom metrics definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedParameter {
    logical_id: String,
    name: ParameterName,
    value: String,
    tier: ParameterTier,
}

impl PersistedParameter {
    pub const LOGICAL_ID: &'static str = "CustomMetricsParameter";

    pub fn new(name: ParameterName, value: String) -> Result<Self> {
        let Some(tier) = ParameterTier::for_size(value.len()) else {
            anyhow::bail!(
                "parameter value is too large ({} bytes). Maximum allowed: {} bytes",
                value.len(),
                ADVANCED_TIER_MAX_BYTES
            );
        };
        Ok(Self {
            logical_id: Self::LOGICAL_ID.to_string(),
            name,
            value,
            tier,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn name(&self) -> &ParameterName {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn tier(&self) -> ParameterTier {
        self.tier
    }

    /// Identity of the parameter as used in access statements. Partition,
    /// region and account are left to the provisioning framework.
    pub fn arn(&self) -> String {
        format!(
            "arn:${{AWS::Partition}}:ssm:${{AWS::Region}}:${{AWS::AccountId}}:parameter{}",
            self.name
        )
    }

    /// Reference handed to runtime configuration. Only obtainable from an
    /// existing parameter.
    pub fn reference(&self) -> ParameterRef {
        ParameterRef {
            logical_id: self.logical_id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Pointer from runtime configuration to a parameter created in the same pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRef {
    logical_id: String,
    name: ParameterName,
}

impl ParameterRef {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn name(&self) -> &ParameterName {
        &self.name
    }
}
