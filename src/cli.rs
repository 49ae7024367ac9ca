use clap::Parser;
use collector_deploy::application::dto::OutputFormat;
use std::path::PathBuf;

/// Compose the database metrics collector deployment into one provisioning template
#[derive(Parser, Debug)]
#[command(name = "collector-deploy")]
#[command(version)]
#[command(
    about = "Compose the database metrics collector deployment into one provisioning template",
    long_about = None
)]
pub struct Args {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Config file (defaults to collector-deploy.config.yml in the project directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Context value overriding the config file, e.g. -c exporterType=cloudwatch
    /// Can be specified multiple times
    #[arg(short, long = "context", value_name = "KEY=VALUE", value_parser = parse_context_entry)]
    pub context: Vec<(String, String)>,

    /// Output format: json or markdown [default: json]
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Architecture of the build environment (x86_64 or arm64)
    #[arg(long, env = "COLLECTOR_TARGET_ARCH")]
    pub target_arch: Option<String>,

    /// Print debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Splits `KEY=VALUE` at the first `=`. Values may contain further `=`.
fn parse_context_entry(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid context entry: {}. Expected KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid context entry: {}. Key must not be empty", s));
    }
    Ok((key.to_string(), value.to_string()))
}
