use crate::composition::domain::DeploymentPlan;

/// ComposeResponse - the composed plan plus anything worth telling the user
#[derive(Debug, Clone)]
pub struct ComposeResponse {
    pub plan: DeploymentPlan,
    /// Non-fatal findings collected across all stages, in order
    pub warnings: Vec<String>,
    /// Number of `[[metric]]` tables found in the custom metrics file
    pub custom_metric_count: Option<usize>,
}

impl ComposeResponse {
    pub fn new(
        plan: DeploymentPlan,
        warnings: Vec<String>,
        custom_metric_count: Option<usize>,
    ) -> Self {
        Self {
            plan,
            warnings,
            custom_metric_count,
        }
    }
}
