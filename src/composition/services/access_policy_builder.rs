use crate::composition::domain::access::{
    AccessIdentity, AccessScope, Condition, ManagedPolicy, PolicyStatement, ResourcePattern,
    ServicePrincipal,
};
use crate::composition::domain::parameter::PersistedParameter;
use crate::composition::domain::variant::{ComputeKind, DeploymentVariant};
use crate::shared::Result;

/// Logical id of the single collector role
pub const ROLE_LOGICAL_ID: &str = "CollectorRole";

/// Tag a secret must carry before the collector may read its value
pub const OPT_IN_TAG_CONDITION_KEY: &str = "aws:ResourceTag/database-collector:enabled";
pub const OPT_IN_TAG_VALUE: &str = "true";

/// Managed policy granting observability write access
pub const CLOUDWATCH_POLICY: &str = "CloudWatchFullAccessV2";
/// Managed policy granting metrics remote-write access
pub const PROMETHEUS_REMOTE_WRITE_POLICY: &str = "AmazonPrometheusRemoteWriteAccess";

pub const NETWORK_INTERFACE_ACTIONS: [&str; 3] = [
    "ec2:CreateNetworkInterface",
    "ec2:DescribeNetworkInterfaces",
    "ec2:DeleteNetworkInterface",
];

/// AccessPolicyBuilder service for the collector's least-privilege role
///
/// The scope is assembled from the deployment shape and sealed into an
/// [`AccessIdentity`] before any compute target exists.
pub struct AccessPolicyBuilder;

impl AccessPolicyBuilder {
    /// Builds the collector identity.
    ///
    /// # Arguments
    /// * `variant` - Selects the trust principals and whether network
    ///   interface actions are granted
    /// * `parameter` - Custom metrics parameter the collector reads, if any
    pub fn build(
        variant: &DeploymentVariant,
        parameter: Option<&PersistedParameter>,
    ) -> Result<AccessIdentity> {
        let network_required = variant.network_attached();
        let mut scope = AccessScope::new();

        scope.push(PolicyStatement::new(
            "SecretsDiscovery",
            &["secretsmanager:DescribeSecret", "secretsmanager:ListSecrets"],
            vec![ResourcePattern::Any],
        ))?;
        scope.push(
            PolicyStatement::new(
                "SecretsRead",
                &["secretsmanager:GetSecretValue"],
                vec![ResourcePattern::Any],
            )
            .with_condition(Condition::string_equals(
                OPT_IN_TAG_CONDITION_KEY,
                OPT_IN_TAG_VALUE,
            )),
        )?;

        if network_required {
            scope.push(PolicyStatement::new(
                "NetworkInterfaces",
                &NETWORK_INTERFACE_ACTIONS,
                vec![ResourcePattern::Any],
            ))?;
        }

        if let Some(parameter) = parameter {
            scope.push(PolicyStatement::new(
                "CustomMetricsRead",
                &["ssm:GetParameter"],
                vec![ResourcePattern::Arn(parameter.arn())],
            ))?;
        }

        scope.attach(ManagedPolicy::aws(CLOUDWATCH_POLICY));
        scope.attach(ManagedPolicy::aws(PROMETHEUS_REMOTE_WRITE_POLICY));

        tracing::debug!(
            statements = scope.statements().len(),
            network_required,
            "sealed collector access scope"
        );

        Ok(AccessIdentity::new(
            ROLE_LOGICAL_ID,
            Self::trust_principals(variant),
            scope,
        ))
    }

    /// The primary target's principal, then Lambda when the events
    /// collector runs alongside it.
    pub fn trust_principals(variant: &DeploymentVariant) -> Vec<ServicePrincipal> {
        let mut principals = vec![ServicePrincipal::for_compute(variant.compute_kind())];
        if variant.events_trigger() {
            principals.push(ServicePrincipal::for_compute(ComputeKind::Function));
        }
        principals
    }
}
