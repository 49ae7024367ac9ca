use crate::composition::domain::PlanMetadata;
use chrono::Utc;
use uuid::Uuid;

/// PlanGenerator service for deployment plan metadata
///
/// Each composition pass gets its own timestamp and a random composition id,
/// so two plans rendered from the same configuration remain distinguishable.
pub struct PlanGenerator;

impl PlanGenerator {
    /// Generates plan metadata for the given tool.
    ///
    /// # Arguments
    /// * `tool_name` - Name of the tool composing the plan
    /// * `tool_version` - Version of the tool
    pub fn generate_metadata(tool_name: &str, tool_version: &str) -> PlanMetadata {
        let timestamp = Utc::now().to_rfc3339();
        let composition_id = Uuid::new_v4().to_string();

        PlanMetadata::new(
            timestamp,
            tool_name.to_string(),
            tool_version.to_string(),
            composition_id,
        )
    }

    /// Generates plan metadata with the compile-time package name and version
    pub fn generate_default_metadata() -> PlanMetadata {
        Self::generate_metadata(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}
