use crate::composition::domain::access::AccessIdentity;
use crate::composition::domain::compute::{ComputeTarget, EntryPoint};
use crate::composition::domain::parameter::PersistedParameter;
use crate::composition::domain::trigger::TriggerSpec;
use crate::composition::domain::variant::DeploymentVariant;

/// PlanMetadata value object identifying one composition pass
#[derive(Debug, Clone)]
pub struct PlanMetadata {
    timestamp: String,
    tool_name: String,
    tool_version: String,
    composition_id: String,
}

impl PlanMetadata {
    pub fn new(
        timestamp: String,
        tool_name: String,
        tool_version: String,
        composition_id: String,
    ) -> Self {
        Self {
            timestamp,
            tool_name,
            tool_version,
            composition_id,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    pub fn composition_id(&self) -> &str {
        &self.composition_id
    }
}

/// The composed resource graph handed to the provisioning framework.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub metadata: PlanMetadata,
    pub variant: DeploymentVariant,
    pub parameter: Option<PersistedParameter>,
    pub identity: AccessIdentity,
    pub compute_targets: Vec<ComputeTarget>,
    pub triggers: Vec<TriggerSpec>,
}

impl DeploymentPlan {
    pub fn target(&self, entry_point: EntryPoint) -> Option<&ComputeTarget> {
        self.compute_targets
            .iter()
            .find(|t| t.entry_point == entry_point)
    }

    pub fn triggers_for<'a>(&'a self, target_id: &'a str) -> impl Iterator<Item = &'a TriggerSpec> {
        self.triggers.iter().filter(move |t| t.target_id() == target_id)
    }

    pub fn resource_count(&self) -> usize {
        usize::from(self.parameter.is_some())
            + 1
            + self.compute_targets.len()
            + self.triggers.len()
    }
}
