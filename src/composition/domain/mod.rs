pub mod access;
pub mod compute;
pub mod context;
pub mod network;
pub mod parameter;
pub mod plan;
pub mod runtime_config;
pub mod stage;
pub mod trigger;
pub mod variant;

pub use access::{
    AccessIdentity, AccessScope, Condition, ManagedPolicy, PolicyStatement, ResourcePattern,
    ServicePrincipal,
};
pub use compute::{ArtifactSource, ComputeSpec, ComputeTarget, EntryPoint, FunctionSpec, ServiceSpec};
pub use context::DeploymentContext;
pub use network::{NetworkAttachment, NetworkPlacement, SecurityGroupId, SubnetId, VpcId};
pub use parameter::{ParameterName, ParameterRef, ParameterTier, PersistedParameter};
pub use plan::{DeploymentPlan, PlanMetadata};
pub use runtime_config::{EnvValue, RuntimeConfig};
pub use stage::{CompositionStage, StageTracker};
pub use trigger::{TriggerKind, TriggerSpec};
pub use variant::{
    BuildSettings, BuildSource, ComputeKind, DeploymentVariant, FeatureFlags, RunMode, TargetArch,
};
