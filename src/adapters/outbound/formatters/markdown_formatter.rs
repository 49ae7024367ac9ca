use crate::composition::domain::{
    ArtifactSource, BuildSource, ComputeSpec, ComputeTarget, DeploymentPlan, EnvValue,
    NetworkAttachment, ResourcePattern, TriggerKind,
};
use crate::ports::outbound::PlanFormatter;
use crate::shared::Result;
use std::fmt::Write;
use std::path::Path;

/// Markdown table header for compute targets
const TARGET_TABLE_HEADER: &str = "| Target | Entry point | Kind | Memory | Timeout | Network |\n";
const TARGET_TABLE_SEPARATOR: &str = "|--------|-------------|------|--------|---------|---------|\n";

/// Markdown table header for access statements
const ACCESS_TABLE_HEADER: &str = "| Sid | Actions | Resources | Condition |\n";
const ACCESS_TABLE_SEPARATOR: &str = "|-----|---------|-----------|-----------|\n";

/// MarkdownFormatter adapter for a human-readable plan summary
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    fn escape_markdown_table_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    /// Local paths are shown relative to the project root when possible
    fn display_path(path: &Path, root: Option<&Path>) -> String {
        root.and_then(|r| path.strip_prefix(r).ok())
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn project_root(plan: &DeploymentPlan) -> Option<&Path> {
        match plan.variant.build_source() {
            BuildSource::LocalSource { root } => Some(root.as_path()),
            BuildSource::Prebuilt { .. } => None,
        }
    }

    fn render_overview(output: &mut String, plan: &DeploymentPlan) -> std::fmt::Result {
        let variant = &plan.variant;
        writeln!(output, "# Collector Deployment Plan")?;
        writeln!(output)?;
        writeln!(
            output,
            "- **Compute target**: {} (run mode `{}`)",
            variant.compute_kind(),
            variant.run_mode()
        )?;
        writeln!(
            output,
            "- **Architecture**: {}",
            variant.build_settings().target_arch.function_architecture()
        )?;
        writeln!(
            output,
            "- **Network attached**: {}",
            if variant.network_attached() { "yes" } else { "no" }
        )?;
        writeln!(
            output,
            "- **Events collector**: {}",
            if variant.events_trigger() { "yes" } else { "no" }
        )?;
        writeln!(output, "- **Resources**: {}", plan.resource_count())?;
        writeln!(
            output,
            "- **Composed by**: {} {} at {} (`{}`)",
            plan.metadata.tool_name(),
            plan.metadata.tool_version(),
            plan.metadata.timestamp(),
            plan.metadata.composition_id()
        )?;
        writeln!(output)
    }

    fn render_parameter(output: &mut String, plan: &DeploymentPlan) -> std::fmt::Result {
        let Some(parameter) = &plan.parameter else {
            return Ok(());
        };
        writeln!(output, "## Custom Metrics Parameter")?;
        writeln!(output)?;
        writeln!(output, "- **Name**: `{}`", parameter.name())?;
        writeln!(
            output,
            "- **Tier**: {} ({} bytes)",
            parameter.tier().as_str(),
            parameter.value().len()
        )?;
        writeln!(output)
    }

    fn render_access(output: &mut String, plan: &DeploymentPlan) -> std::fmt::Result {
        let identity = &plan.identity;
        let principals: Vec<&str> = identity
            .principals()
            .iter()
            .map(|p| p.as_str())
            .collect();

        writeln!(output, "## Access")?;
        writeln!(output)?;
        writeln!(
            output,
            "Role `{}` assumable by {}.",
            identity.logical_id(),
            principals
                .iter()
                .map(|p| format!("`{}`", p))
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(output)?;
        output.push_str(ACCESS_TABLE_HEADER);
        output.push_str(ACCESS_TABLE_SEPARATOR);
        for statement in identity.scope().statements() {
            let resources = statement
                .resources()
                .iter()
                .map(|r| match r {
                    ResourcePattern::Any => "`*`".to_string(),
                    ResourcePattern::Arn(arn) => format!("`{}`", arn),
                })
                .collect::<Vec<_>>()
                .join("<br>");
            let condition = statement.condition().map_or_else(
                || "-".to_string(),
                |c| format!("{} `{}` = `{}`", c.operator, c.key, c.value),
            );
            writeln!(
                output,
                "| {} | {} | {} | {} |",
                Self::escape_markdown_table_cell(statement.sid()),
                Self::escape_markdown_table_cell(&statement.actions().join("<br>")),
                Self::escape_markdown_table_cell(&resources),
                Self::escape_markdown_table_cell(&condition)
            )?;
        }
        writeln!(output)?;
        for policy in identity.scope().managed_policies() {
            writeln!(output, "- Managed policy `{}`", policy.name)?;
        }
        writeln!(output)
    }

    fn network_cell(network: &NetworkAttachment) -> String {
        match network.placement() {
            None => "-".to_string(),
            Some(placement) => format!(
                "{} ({} subnet(s))",
                placement.vpc_id(),
                placement.subnet_ids().len()
            ),
        }
    }

    fn source_line(target: &ComputeTarget, root: Option<&Path>) -> String {
        match &target.source {
            ArtifactSource::LocalEntry { path } => {
                format!("built from `{}`", Self::display_path(path, root))
            }
            ArtifactSource::LocalImageBuild {
                context,
                dockerfile,
                platform,
            } => format!(
                "image built from `{}` with `{}` for {}",
                Self::display_path(context, root),
                dockerfile.display(),
                platform
            ),
            ArtifactSource::Bundle { uri } => format!("bundle `{}`", uri),
            ArtifactSource::Image { uri } => format!("image `{}`", uri),
        }
    }

    fn render_targets(output: &mut String, plan: &DeploymentPlan) -> std::fmt::Result {
        let root = Self::project_root(plan);

        writeln!(output, "## Compute Targets")?;
        writeln!(output)?;
        output.push_str(TARGET_TABLE_HEADER);
        output.push_str(TARGET_TABLE_SEPARATOR);
        for target in &plan.compute_targets {
            let (kind, memory) = match &target.spec {
                ComputeSpec::Function(f) => ("function", format!("{} MiB", f.memory_mib)),
                ComputeSpec::Service(s) => (
                    "service",
                    format!("{} MiB / {} CPU units", s.memory_mib, s.cpu_units),
                ),
            };
            let timeout = target
                .timeout()
                .map_or_else(|| "-".to_string(), |t| format!("{} s", t.as_secs()));
            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} |",
                target.logical_id,
                target.entry_point.name(),
                kind,
                memory,
                timeout,
                Self::network_cell(&target.network)
            )?;
        }
        writeln!(output)?;

        for target in &plan.compute_targets {
            writeln!(output, "### {}", target.logical_id)?;
            writeln!(output)?;
            writeln!(output, "Code: {}", Self::source_line(target, root))?;
            writeln!(output)?;
            for (name, value) in target.environment.iter() {
                match value {
                    EnvValue::Literal(literal) => writeln!(output, "- `{}` = `{}`", name, literal)?,
                    EnvValue::Parameter(parameter) => writeln!(
                        output,
                        "- `{}` → parameter `{}`",
                        name,
                        parameter.name()
                    )?,
                }
            }
            writeln!(output)?;
        }
        Ok(())
    }

    fn render_triggers(output: &mut String, plan: &DeploymentPlan) -> std::fmt::Result {
        writeln!(output, "## Triggers")?;
        writeln!(output)?;
        if plan.triggers.is_empty() {
            writeln!(
                output,
                "None. The collector service runs on its own internal schedule."
            )?;
            return Ok(());
        }
        for trigger in &plan.triggers {
            let description = match trigger.kind() {
                TriggerKind::Schedule { .. } => trigger
                    .kind()
                    .schedule_expression()
                    .unwrap_or_default(),
                TriggerKind::EventPattern { source, .. } => format!("events from `{}`", source),
            };
            writeln!(
                output,
                "- **{}**: {} → `{}`",
                trigger.logical_id(),
                description,
                trigger.target_id()
            )?;
        }
        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanFormatter for MarkdownFormatter {
    fn format(&self, plan: &DeploymentPlan) -> Result<String> {
        let mut output = String::new();
        Self::render_overview(&mut output, plan)?;
        Self::render_parameter(&mut output, plan)?;
        Self::render_access(&mut output, plan)?;
        Self::render_targets(&mut output, plan)?;
        Self::render_triggers(&mut output, plan)?;
        Ok(output)
    }
}
