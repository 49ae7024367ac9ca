use crate::composition::domain::context::{keys, DeploymentContext};
use crate::composition::domain::network::{
    NetworkAttachment, NetworkPlacement, SecurityGroupId, SubnetId, VpcId,
};
use crate::composition::domain::variant::ComputeKind;
use crate::shared::error::ComposeError;
use crate::shared::Result;

/// Output of the network stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkResolution {
    pub attachment: NetworkAttachment,
    pub warnings: Vec<String>,
}

/// NetworkAttacher service
///
/// Turns the raw `vpcId`, `subnetIds` and `securityGroupIds` values into a
/// validated [`NetworkAttachment`]. Lists are comma separated.
///
/// A Lambda function placed in a VPC needs at least one security group;
/// Fargate tasks fall back to the VPC default group.
pub struct NetworkAttacher;

impl NetworkAttacher {
    pub fn resolve(
        attached: bool,
        compute_kind: ComputeKind,
        context: &DeploymentContext,
    ) -> Result<NetworkResolution> {
        let raw_keys = [keys::VPC_ID, keys::SUBNET_IDS, keys::SECURITY_GROUP_IDS];

        if !attached {
            let ignored: Vec<&str> = raw_keys
                .into_iter()
                .filter(|k| context.get(k).is_some())
                .collect();
            let warnings = if ignored.is_empty() {
                Vec::new()
            } else {
                vec![format!(
                    "Network attachment is disabled; ignoring {}",
                    ignored.join(", ")
                )]
            };
            return Ok(NetworkResolution {
                attachment: NetworkAttachment::Detached,
                warnings,
            });
        }

        let vpc_id = match context.get(keys::VPC_ID) {
            Some(raw) => VpcId::new(raw).map_err(|e| malformed(keys::VPC_ID, e))?,
            None => {
                return Err(ComposeError::configuration(
                    keys::VPC_ID,
                    "network attachment requires a VPC id",
                )
                .into());
            }
        };

        let subnet_ids = Self::parse_list(context, keys::SUBNET_IDS, |s| SubnetId::new(s))?;
        if subnet_ids.is_empty() {
            return Err(ComposeError::configuration(
                keys::SUBNET_IDS,
                "network attachment requires at least one subnet id",
            )
            .into());
        }
        let security_group_ids =
            Self::parse_list(context, keys::SECURITY_GROUP_IDS, |s| SecurityGroupId::new(s))?;
        if security_group_ids.is_empty() && compute_kind == ComputeKind::Function {
            return Err(ComposeError::configuration(
                keys::SECURITY_GROUP_IDS,
                "a network-attached lambda target requires at least one security group id",
            )
            .into());
        }

        let placement = NetworkPlacement::new(vpc_id, subnet_ids, security_group_ids)
            .map_err(|e| malformed(keys::SUBNET_IDS, e))?;

        tracing::debug!(
            vpc = %placement.vpc_id(),
            subnets = placement.subnet_ids().len(),
            security_groups = placement.security_group_ids().len(),
            "resolved network placement"
        );

        Ok(NetworkResolution {
            attachment: NetworkAttachment::Attached(placement),
            warnings: Vec::new(),
        })
    }

    /// Parses a comma separated list, dropping duplicates in first-seen
    /// order. Empty items are malformed.
    fn parse_list<T, F>(context: &DeploymentContext, key: &str, parse: F) -> Result<Vec<T>>
    where
        T: PartialEq,
        F: Fn(String) -> Result<T>,
    {
        let Some(raw) = context.get(key) else {
            return Ok(Vec::new());
        };

        let mut ids: Vec<T> = Vec::new();
        for item in raw.split(',').map(str::trim) {
            if item.is_empty() {
                return Err(ComposeError::configuration(
                    key,
                    format!("'{}' contains an empty list item", raw),
                )
                .into());
            }
            let id = parse(item.to_string()).map_err(|e| malformed(key, e))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

fn malformed(key: &str, error: anyhow::Error) -> anyhow::Error {
    ComposeError::configuration(key, error.to_string()).into()
}
