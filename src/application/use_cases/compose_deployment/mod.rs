use crate::application::dto::{ComposeRequest, ComposeResponse};
use crate::composition::domain::{
    CompositionStage, DeploymentContext, DeploymentPlan, DeploymentVariant, StageTracker,
};
use crate::composition::services::{
    AccessPolicyBuilder, ConfigResolver, CustomMetricsSource, NetworkAttacher, PlanGenerator,
    TriggerBinder,
};
use crate::ports::outbound::{CustomMetricsReader, ProgressReporter};
use crate::shared::Result;

/// Number of stage transitions in one composition pass
const STAGE_STEPS: usize = CompositionStage::ALL.len() - 1;

/// ComposeDeploymentUseCase - composes the collector deployment plan
///
/// Runs the stages in their fixed order, each stage consuming only values
/// produced by earlier ones. A failure anywhere aborts the pass and no plan
/// is returned.
///
/// The use case holds nothing but its adapters, so independent instances can
/// run on separate threads.
///
/// # Type Parameters
/// * `CMR` - CustomMetricsReader implementation
/// * `PR` - ProgressReporter implementation
pub struct ComposeDeploymentUseCase<CMR, PR> {
    custom_metrics_reader: CMR,
    progress_reporter: PR,
}

impl<CMR, PR> ComposeDeploymentUseCase<CMR, PR>
where
    CMR: CustomMetricsReader,
    PR: ProgressReporter,
{
    pub fn new(custom_metrics_reader: CMR, progress_reporter: PR) -> Self {
        Self {
            custom_metrics_reader,
            progress_reporter,
        }
    }

    /// Executes one composition pass
    ///
    /// # Errors
    /// Returns the first configuration, validation, ordering or I/O error
    /// encountered. Nothing partial is returned.
    pub fn execute(&self, request: ComposeRequest) -> Result<ComposeResponse> {
        let ComposeRequest {
            project_path,
            context,
        } = request;
        let mut warnings = Self::unknown_key_warnings(&context);
        let mut tracker = StageTracker::new();

        let variant = DeploymentVariant::from_context(&context, &project_path)?;
        self.progress_reporter.report(&format!(
            "🧭 Composing {} collector deployment (events collector: {})",
            variant.compute_kind(),
            if variant.events_trigger() { "on" } else { "off" }
        ));

        // Configuration
        let custom_metrics = self.read_custom_metrics(&variant)?;
        let resolved = ConfigResolver::resolve(&variant, &context, custom_metrics)?;
        warnings.extend(resolved.warnings);
        self.advance(&mut tracker, CompositionStage::ConfigResolved)?;

        // Access
        tracker.require(CompositionStage::ConfigResolved)?;
        let identity = AccessPolicyBuilder::build(&variant, resolved.parameter.as_ref())?;
        self.advance(&mut tracker, CompositionStage::AccessScoped)?;

        // Network
        let network =
            NetworkAttacher::resolve(variant.network_attached(), variant.compute_kind(), &context)?;
        warnings.extend(network.warnings);
        self.advance(&mut tracker, CompositionStage::NetworkResolved)?;

        // Compute
        tracker.require(CompositionStage::NetworkResolved)?;
        let compute_targets = TriggerBinder::create_targets(
            &variant,
            &identity,
            &resolved.runtime,
            &network.attachment,
        )?;
        self.advance(&mut tracker, CompositionStage::ComputeTargetCreated)?;

        // Triggers
        tracker.require(CompositionStage::ComputeTargetCreated)?;
        let triggers = TriggerBinder::bind_triggers(&compute_targets)?;
        self.advance(&mut tracker, CompositionStage::TriggersBound)?;

        for warning in &warnings {
            self.progress_reporter
                .report_warning(&format!("⚠️  Warning: {}", warning));
        }

        tracker.require(CompositionStage::TriggersBound)?;
        let plan = DeploymentPlan {
            metadata: PlanGenerator::generate_default_metadata(),
            variant,
            parameter: resolved.parameter,
            identity,
            compute_targets,
            triggers,
        };

        tracing::info!(
            composition_id = plan.metadata.composition_id(),
            resources = plan.resource_count(),
            warnings = warnings.len(),
            "composition finished"
        );
        self.progress_reporter.report_completion(&format!(
            "✅ Composed {} resource(s)",
            plan.resource_count()
        ));

        Ok(ComposeResponse::new(
            plan,
            warnings,
            resolved.custom_metric_count,
        ))
    }

    /// Reads the custom metrics file when the variant names one. The reader
    /// releases the file before returning on every path.
    fn read_custom_metrics(&self, variant: &DeploymentVariant) -> Result<Option<CustomMetricsSource>> {
        let Some(path) = variant.custom_metrics_file() else {
            return Ok(None);
        };

        self.progress_reporter.report(&format!(
            "📖 Loading custom metrics from: {}",
            path.display()
        ));
        let contents = self.custom_metrics_reader.read_custom_metrics(path)?;

        Ok(Some(CustomMetricsSource {
            path: path.to_path_buf(),
            contents,
        }))
    }

    fn advance(&self, tracker: &mut StageTracker, stage: CompositionStage) -> Result<()> {
        tracker.advance(stage)?;
        tracing::debug!(%stage, "stage reached");
        self.progress_reporter
            .report_progress(stage.index(), STAGE_STEPS, Some(&stage.to_string()));
        Ok(())
    }

    fn unknown_key_warnings(context: &DeploymentContext) -> Vec<String> {
        context
            .unknown_keys()
            .into_iter()
            .map(|key| format!("Unknown configuration key '{}' is ignored", key))
            .collect()
    }
}
