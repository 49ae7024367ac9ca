use crate::composition::domain::DeploymentPlan;
use crate::shared::Result;

/// PlanFormatter port for rendering a composed deployment plan
///
/// Implementations turn the formatter-agnostic plan into a concrete
/// document, such as a provisioning template or a human-readable summary.
pub trait PlanFormatter {
    /// Renders the plan
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, plan: &DeploymentPlan) -> Result<String>;
}
