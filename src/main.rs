mod cli;

use clap::Parser;
use cli::Args;
use collector_deploy::adapters::outbound::console::StderrProgressReporter;
use collector_deploy::adapters::outbound::filesystem::FileSystemReader;
use collector_deploy::application::dto::{ComposeRequest, OutputFormat};
use collector_deploy::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use collector_deploy::application::use_cases::ComposeDeploymentUseCase;
use collector_deploy::composition::domain::context::keys;
use collector_deploy::composition::domain::DeploymentContext;
use collector_deploy::config::{self, ConfigFile};
use collector_deploy::shared::error::{ComposeError, ExitCode};
use collector_deploy::shared::Result;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(ExitCode::for_error(&e).as_i32());
    }
}

/// Diagnostics go to stderr so they never mix with a template on stdout.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("collector_deploy=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    // Validate project directory
    let project_path = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let project_path = validate_project_path(&project_path)?;

    // Config file first, CLI context on top
    let config_file = match &args.config {
        Some(path) => Some(config::load_config_from_path(path)?),
        None => config::discover_config(&project_path)?,
    };
    let format = resolve_format(args.format, config_file.as_ref())?;
    let context = merge_context(config_file.as_ref(), &args);
    tracing::debug!(keys = context.len(), %format, "configuration merged");

    // Create adapters (Dependency Injection)
    let custom_metrics_reader = FileSystemReader::new();
    let progress_reporter = StderrProgressReporter::new();
    let use_case = ComposeDeploymentUseCase::new(custom_metrics_reader, progress_reporter);

    let response = use_case.execute(ComposeRequest::new(project_path, context))?;

    if let Some(count) = response.custom_metric_count {
        eprintln!("📊 Custom metrics file defines {} metric(s)", count);
    }

    eprintln!("{}", FormatterFactory::progress_message(format));
    let formatter = FormatterFactory::create(format);
    let formatted_output = formatter.format(&response.plan)?;

    let presenter = PresenterFactory::create(PresenterType::from_output(args.output));
    presenter.present(&formatted_output)?;

    Ok(())
}

/// `--format` wins over the config file; json is the default.
fn resolve_format(cli: Option<OutputFormat>, config_file: Option<&ConfigFile>) -> Result<OutputFormat> {
    if let Some(format) = cli {
        return Ok(format);
    }
    match config_file.and_then(|c| c.format.as_deref()) {
        Some(format) => format
            .parse()
            .map_err(|e: String| ComposeError::Validation { message: e }.into()),
        None => Ok(OutputFormat::default()),
    }
}

/// Builds the deployment context: config file values, then `--context`
/// entries, then `--target-arch`. Later sources win.
fn merge_context(config_file: Option<&ConfigFile>, args: &Args) -> DeploymentContext {
    let mut context = config_file
        .map(ConfigFile::to_context)
        .unwrap_or_default();

    for (key, value) in &args.context {
        context.set(key, value.clone());
    }
    if let Some(arch) = &args.target_arch {
        context.set(keys::TARGET_ARCH, arch.clone());
    }
    context
}

/// Returns the canonical project directory.
fn validate_project_path(path: &Path) -> Result<PathBuf> {
    let invalid = |reason: String| ComposeError::InvalidProjectPath {
        path: path.to_path_buf(),
        reason,
    };

    if !path.exists() {
        return Err(invalid("Directory does not exist".to_string()).into());
    }

    // Security check: Reject symbolic links for project paths
    let metadata = std::fs::symlink_metadata(path)
        .map_err(|e| invalid(format!("Failed to read path metadata: {}", e)))?;

    if metadata.is_symlink() {
        return Err(invalid(
            "Security: Project path is a symbolic link. For security reasons, symbolic links are not allowed.".to_string(),
        )
        .into());
    }

    if !path.is_dir() {
        return Err(invalid("Not a directory".to_string()).into());
    }

    let canonical_path = path
        .canonicalize()
        .map_err(|e| invalid(format!("Failed to canonicalize path: {}", e)))?;

    if !canonical_path.is_dir() {
        return Err(invalid("Resolved path is not a directory".to_string()).into());
    }

    Ok(canonical_path)
}
