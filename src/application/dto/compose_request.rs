use crate::composition::domain::DeploymentContext;
use std::path::PathBuf;

/// ComposeRequest - input of the deployment composition use case
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// Project root; relative paths in the context resolve against it
    pub project_path: PathBuf,
    /// Merged external configuration (config file overlaid with CLI values)
    pub context: DeploymentContext,
}

impl ComposeRequest {
    pub fn new(project_path: PathBuf, context: DeploymentContext) -> Self {
        Self {
            project_path,
            context,
        }
    }
}
