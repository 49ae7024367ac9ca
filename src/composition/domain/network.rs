use crate::shared::Result;

/// Maximum hex suffix length of a resource identifier (`subnet-` + 17 hex).
const MAX_ID_SUFFIX_LENGTH: usize = 17;

fn validate_resource_id(value: &str, prefix: &str) -> Result<()> {
    let Some(suffix) = value.strip_prefix(prefix).and_then(|s| s.strip_prefix('-')) else {
        anyhow::bail!("'{}' does not start with '{}-'", value, prefix);
    };

    if suffix.is_empty() || suffix.len() > MAX_ID_SUFFIX_LENGTH {
        anyhow::bail!(
            "'{}' must have 1 to {} hex characters after '{}-'",
            value,
            MAX_ID_SUFFIX_LENGTH,
            prefix
        );
    }

    if !suffix
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    {
        anyhow::bail!("'{}' contains characters other than lowercase hex", value);
    }

    Ok(())
}

macro_rules! resource_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                validate_resource_id(&value, $prefix)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

resource_id!(
    /// Virtual network identifier (`vpc-…`)
    VpcId,
    "vpc"
);
resource_id!(
    /// Subnet identifier (`subnet-…`)
    SubnetId,
    "subnet"
);
resource_id!(
    /// Security group identifier (`sg-…`)
    SecurityGroupId,
    "sg"
);

/// Fully specified network placement: one VPC and at least one subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlacement {
    vpc_id: VpcId,
    subnet_ids: Vec<SubnetId>,
    security_group_ids: Vec<SecurityGroupId>,
}

impl NetworkPlacement {
    pub fn new(
        vpc_id: VpcId,
        subnet_ids: Vec<SubnetId>,
        security_group_ids: Vec<SecurityGroupId>,
    ) -> Result<Self> {
        if subnet_ids.is_empty() {
            anyhow::bail!("a network placement needs at least one subnet");
        }
        Ok(Self {
            vpc_id,
            subnet_ids,
            security_group_ids,
        })
    }

    pub fn vpc_id(&self) -> &VpcId {
        &self.vpc_id
    }

    pub fn subnet_ids(&self) -> &[SubnetId] {
        &self.subnet_ids
    }

    pub fn security_group_ids(&self) -> &[SecurityGroupId] {
        &self.security_group_ids
    }
}

/// Network attachment of a compute target. `Detached` is an explicit value,
/// so compute targets are built the same way either way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NetworkAttachment {
    #[default]
    Detached,
    Attached(NetworkPlacement),
}

impl NetworkAttachment {
    pub fn is_attached(&self) -> bool {
        matches!(self, NetworkAttachment::Attached(_))
    }

    pub fn placement(&self) -> Option<&NetworkPlacement> {
        match self {
            NetworkAttachment::Attached(placement) => Some(placement),
            NetworkAttachment::Detached => None,
        }
    }
}
