use crate::composition::domain::context::{keys, DeploymentContext};
use crate::composition::domain::parameter::{ParameterName, PersistedParameter};
use crate::composition::domain::runtime_config::{self as env, RuntimeConfig};
use crate::composition::domain::variant::{ComputeKind, DeploymentVariant};
use crate::shared::error::ComposeError;
use crate::shared::Result;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Schedule the containerized collector uses when none is configured
pub const DEFAULT_CRON_SCHEDULE: &str = "@every 5m";

/// Metrics backend the collector exports to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExporterType {
    #[default]
    Prometheus,
    Cloudwatch,
}

impl FromStr for ExporterType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prometheus" => Ok(ExporterType::Prometheus),
            "cloudwatch" => Ok(ExporterType::Cloudwatch),
            _ => Err(format!(
                "Invalid exporter type: {}. Please specify 'prometheus' or 'cloudwatch'",
                s
            )),
        }
    }
}

impl fmt::Display for ExporterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExporterType::Prometheus => write!(f, "prometheus"),
            ExporterType::Cloudwatch => write!(f, "cloudwatch"),
        }
    }
}

/// Log level passed to the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!(
                "Invalid log level: {}. Please specify debug, info, warn or error",
                s
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(level)
    }
}

/// Custom metrics file contents captured by the reader port.
#[derive(Debug, Clone)]
pub struct CustomMetricsSource {
    pub path: PathBuf,
    pub contents: String,
}

/// Output of the configuration stage.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub parameter: Option<PersistedParameter>,
    pub runtime: RuntimeConfig,
    pub exporter: ExporterType,
    /// Number of `[[metric]]` tables, when the payload parses as TOML
    pub custom_metric_count: Option<usize>,
    pub warnings: Vec<String>,
}

/// ConfigResolver service for the first composition stage
///
/// Turns the custom metrics payload into a persisted parameter and shapes the
/// collector's runtime environment from external configuration. Every scalar
/// has a fallback default, except the remote-write URL which is optional.
pub struct ConfigResolver;

impl ConfigResolver {
    /// Resolves parameter and runtime configuration for `variant`.
    ///
    /// `custom_metrics` must be `Some` exactly when the variant names a
    /// custom metrics file; the reader port has already failed otherwise.
    pub fn resolve(
        variant: &DeploymentVariant,
        context: &DeploymentContext,
        custom_metrics: Option<CustomMetricsSource>,
    ) -> Result<ResolvedConfig> {
        let mut warnings = Vec::new();

        let (parameter, custom_metric_count) = match (variant.custom_metrics_file(), custom_metrics)
        {
            (None, None) => (None, None),
            (Some(_), Some(source)) => {
                let count = Self::count_metric_tables(&source, &mut warnings);
                (Some(Self::persist(context, source)?), count)
            }
            (Some(path), None) => {
                return Err(ComposeError::CustomMetricsFileNotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            (None, Some(source)) => {
                return Err(ComposeError::Validation {
                    message: format!(
                        "custom metrics from {} were supplied but the deployment does not use them",
                        source.path.display()
                    ),
                }
                .into());
            }
        };

        let exporter = context
            .parse::<ExporterType>(keys::EXPORTER_TYPE)?
            .unwrap_or_default();
        let log_level = context.parse::<LogLevel>(keys::LOG_LEVEL)?.unwrap_or_default();
        let prometheus_url = Self::prometheus_url(context)?;

        let mut runtime = RuntimeConfig::new();
        runtime.set_literal(env::RUN_MODE, variant.run_mode().as_env_value())?;
        runtime.set_literal(env::EXPORTER_TYPE, exporter.to_string())?;
        match prometheus_url {
            Some(url) => runtime.set_literal(env::PROMETHEUS_REMOTE_WRITE_URL, url)?,
            None if exporter == ExporterType::Prometheus => warnings.push(format!(
                "No {} configured; the prometheus exporter will have nowhere to write",
                keys::PROMETHEUS_URL
            )),
            None => {}
        }
        runtime.set_literal(env::LOG_LEVEL, log_level.to_string())?;

        let cron_schedule = context.get(keys::CRON_SCHEDULE);
        match variant.compute_kind() {
            ComputeKind::ContainerService => {
                let schedule = cron_schedule.unwrap_or(DEFAULT_CRON_SCHEDULE);
                Self::validate_cron_schedule(schedule)?;
                runtime.set_literal(env::CRON_SCHEDULE, schedule)?;
            }
            ComputeKind::Function if cron_schedule.is_some() => warnings.push(format!(
                "{} is ignored for lambda targets; the schedule trigger drives invocations",
                keys::CRON_SCHEDULE
            )),
            ComputeKind::Function => {}
        }

        if let Some(parameter) = &parameter {
            runtime.set_parameter(env::CUSTOM_METRICS_FILE, parameter)?;
        }

        tracing::debug!(
            variables = ?runtime.names(),
            parameter = parameter.as_ref().map(|p| p.name().to_string()),
            "resolved runtime configuration"
        );

        Ok(ResolvedConfig {
            parameter,
            runtime,
            exporter,
            custom_metric_count,
            warnings,
        })
    }

    /// Parameter name from `ssmParameterPath`, or the well-known default.
    pub fn parameter_name(context: &DeploymentContext) -> Result<ParameterName> {
        match context.get(keys::SSM_PARAMETER_PATH) {
            None => Ok(ParameterName::default_name()),
            Some(raw) => ParameterName::new(raw).map_err(|e| {
                ComposeError::configuration(keys::SSM_PARAMETER_PATH, e.to_string()).into()
            }),
        }
    }

    fn persist(
        context: &DeploymentContext,
        source: CustomMetricsSource,
    ) -> Result<PersistedParameter> {
        if source.contents.trim().is_empty() {
            return Err(ComposeError::configuration(
                keys::CUSTOM_METRICS_FILE,
                format!("{} is empty", source.path.display()),
            )
            .into());
        }

        let name = Self::parameter_name(context)?;
        PersistedParameter::new(name, source.contents).map_err(|e| {
            ComposeError::configuration(keys::CUSTOM_METRICS_FILE, e.to_string()).into()
        })
    }

    /// Counts `[[metric]]` tables. The payload stays opaque: a parse failure
    /// only adds a warning.
    fn count_metric_tables(source: &CustomMetricsSource, warnings: &mut Vec<String>) -> Option<usize> {
        match toml::from_str::<toml::Table>(&source.contents) {
            Ok(table) => Some(
                table
                    .get("metric")
                    .and_then(toml::Value::as_array)
                    .map_or(0, Vec::len),
            ),
            Err(e) => {
                warnings.push(format!(
                    "{} does not parse as TOML ({}); it is persisted unchanged",
                    source.path.display(),
                    e.message()
                ));
                None
            }
        }
    }

    fn prometheus_url(context: &DeploymentContext) -> Result<Option<String>> {
        let Some(raw) = context.get(keys::PROMETHEUS_URL) else {
            return Ok(None);
        };

        let host = raw
            .strip_prefix("https://")
            .or_else(|| raw.strip_prefix("http://"));
        match host {
            Some(rest) if !rest.is_empty() && !rest.starts_with('/') && !raw.contains(' ') => {
                Ok(Some(raw.to_string()))
            }
            _ => Err(ComposeError::configuration(
                keys::PROMETHEUS_URL,
                format!("'{}' is not an http(s) URL", raw),
            )
            .into()),
        }
    }

    /// Accepts `@every <duration>`, the `@hourly`-style shorthands, and
    /// five- or six-field cron expressions.
    fn validate_cron_schedule(schedule: &str) -> Result<()> {
        let valid = if let Some(interval) = schedule.strip_prefix("@every ") {
            let interval = interval.trim();
            !interval.is_empty()
                && interval.starts_with(|c: char| c.is_ascii_digit())
                && interval.ends_with(['s', 'm', 'h'])
        } else if schedule.starts_with('@') {
            matches!(
                schedule,
                "@yearly" | "@annually" | "@monthly" | "@weekly" | "@daily" | "@midnight" | "@hourly"
            )
        } else {
            matches!(schedule.split_whitespace().count(), 5 | 6)
        };

        if !valid {
            return Err(ComposeError::configuration(
                keys::CRON_SCHEDULE,
                format!("'{}' is not a cron expression or @every interval", schedule),
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::domain::runtime_config::EnvValue;
    use std::path::Path;

    fn function_variant(ctx: &DeploymentContext) -> DeploymentVariant {
        DeploymentVariant::from_context(ctx, Path::new("/srv")).unwrap()
    }

    fn source(contents: &str) -> CustomMetricsSource {
        CustomMetricsSource {
            path: PathBuf::from("/srv/custom-metrics.toml"),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn test_defaults_for_function() {
        let ctx = DeploymentContext::new();
        let resolved = ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).unwrap();

        assert!(resolved.parameter.is_none());
        assert_eq!(resolved.exporter, ExporterType::Prometheus);
        assert_eq!(resolved.runtime.literal(env::RUN_MODE), Some("LAMBDA"));
        assert_eq!(resolved.runtime.literal(env::EXPORTER_TYPE), Some("prometheus"));
        assert_eq!(resolved.runtime.literal(env::LOG_LEVEL), Some("info"));
        assert!(!resolved.runtime.contains(env::CRON_SCHEDULE));
        assert!(!resolved.runtime.contains(env::PROMETHEUS_REMOTE_WRITE_URL));
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn test_toggles_from_context() {
        let ctx = DeploymentContext::new()
            .with(keys::EXPORTER_TYPE, "cloudwatch")
            .with(keys::PROMETHEUS_URL, "https://aps.example.com/api/v1/remote_write")
            .with(keys::LOG_LEVEL, "DEBUG");
        let resolved = ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).unwrap();

        assert_eq!(resolved.exporter, ExporterType::Cloudwatch);
        assert_eq!(
            resolved.runtime.literal(env::PROMETHEUS_REMOTE_WRITE_URL),
            Some("https://aps.example.com/api/v1/remote_write")
        );
        assert_eq!(resolved.runtime.literal(env::LOG_LEVEL), Some("debug"));
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_invalid_exporter_is_configuration_error() {
        let ctx = DeploymentContext::new().with(keys::EXPORTER_TYPE, "datadog");
        let err = ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).unwrap_err();
        let compose_err = err.downcast_ref::<ComposeError>().unwrap();
        assert!(compose_err.is_configuration_error());
    }

    #[test]
    fn test_invalid_prometheus_url() {
        let ctx = DeploymentContext::new().with(keys::PROMETHEUS_URL, "ftp://metrics");
        assert!(ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).is_err());

        let ctx = DeploymentContext::new().with(keys::PROMETHEUS_URL, "https://");
        assert!(ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).is_err());
    }

    #[test]
    fn test_custom_metrics_persisted_under_default_name() {
        let ctx = DeploymentContext::new().with(keys::CUSTOM_METRICS_FILE, "custom-metrics.toml");
        let contents = "[[metric]]\ncontext = \"sessions\"\n\n[[metric]]\ncontext = \"locks\"\n";
        let resolved =
            ConfigResolver::resolve(&function_variant(&ctx), &ctx, Some(source(contents)))
                .unwrap();

        let parameter = resolved.parameter.expect("parameter");
        assert_eq!(parameter.name().as_str(), ParameterName::DEFAULT);
        assert_eq!(parameter.value(), contents);
        assert_eq!(resolved.custom_metric_count, Some(2));

        match resolved.runtime.get(env::CUSTOM_METRICS_FILE) {
            Some(EnvValue::Parameter(r)) => assert_eq!(r.name(), parameter.name()),
            other => panic!("expected parameter reference, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_metrics_parameter_path_override() {
        let ctx = DeploymentContext::new()
            .with(keys::CUSTOM_METRICS_FILE, "custom-metrics.toml")
            .with(keys::SSM_PARAMETER_PATH, "/prod/collector/metrics");
        let resolved =
            ConfigResolver::resolve(&function_variant(&ctx), &ctx, Some(source("[[metric]]")))
                .unwrap();
        assert_eq!(
            resolved.parameter.unwrap().name().as_str(),
            "/prod/collector/metrics"
        );
    }

    #[test]
    fn test_invalid_parameter_path() {
        let ctx = DeploymentContext::new()
            .with(keys::CUSTOM_METRICS_FILE, "custom-metrics.toml")
            .with(keys::SSM_PARAMETER_PATH, "no-leading-slash");
        let err =
            ConfigResolver::resolve(&function_variant(&ctx), &ctx, Some(source("[[metric]]")))
                .unwrap_err();
        assert!(err.to_string().contains("ssmParameterPath"));
    }

    #[test]
    fn test_missing_custom_metrics_contents_is_fatal() {
        let ctx = DeploymentContext::new().with(keys::CUSTOM_METRICS_FILE, "missing.toml");
        let err = ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComposeError>(),
            Some(ComposeError::CustomMetricsFileNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_custom_metrics_file() {
        let ctx = DeploymentContext::new().with(keys::CUSTOM_METRICS_FILE, "custom.toml");
        let err = ConfigResolver::resolve(&function_variant(&ctx), &ctx, Some(source("  \n")))
            .unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn test_non_toml_custom_metrics_only_warns() {
        let ctx = DeploymentContext::new()
            .with(keys::CUSTOM_METRICS_FILE, "custom.toml")
            .with(keys::PROMETHEUS_URL, "https://aps.example.com");
        let resolved =
            ConfigResolver::resolve(&function_variant(&ctx), &ctx, Some(source("[[metric")))
                .unwrap();
        assert!(resolved.parameter.is_some());
        assert_eq!(resolved.custom_metric_count, None);
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("does not parse as TOML"));
    }

    #[test]
    fn test_service_gets_cron_schedule() {
        let ctx = DeploymentContext::new()
            .with(keys::COMPUTE_TARGET, "fargate")
            .with(keys::VPC_ID, "vpc-1")
            .with(keys::SUBNET_IDS, "subnet-1");
        let resolved = ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).unwrap();
        assert_eq!(resolved.runtime.literal(env::RUN_MODE), Some("CRON"));
        assert_eq!(
            resolved.runtime.literal(env::CRON_SCHEDULE),
            Some(DEFAULT_CRON_SCHEDULE)
        );
    }

    #[test]
    fn test_invalid_cron_schedule() {
        let ctx = DeploymentContext::new()
            .with(keys::COMPUTE_TARGET, "fargate")
            .with(keys::VPC_ID, "vpc-1")
            .with(keys::SUBNET_IDS, "subnet-1")
            .with(keys::CRON_SCHEDULE, "every five minutes");
        assert!(ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).is_err());

        assert!(ConfigResolver::validate_cron_schedule("*/5 * * * *").is_ok());
        assert!(ConfigResolver::validate_cron_schedule("@every 90s").is_ok());
        assert!(ConfigResolver::validate_cron_schedule("@hourly").is_ok());
        assert!(ConfigResolver::validate_cron_schedule("@every").is_err());
    }

    #[test]
    fn test_cron_schedule_ignored_for_function() {
        let ctx = DeploymentContext::new()
            .with(keys::CRON_SCHEDULE, "@every 1m")
            .with(keys::PROMETHEUS_URL, "https://aps.example.com");
        let resolved = ConfigResolver::resolve(&function_variant(&ctx), &ctx, None).unwrap();
        assert!(!resolved.runtime.contains(env::CRON_SCHEDULE));
        assert!(resolved.warnings[0].contains("ignored"));
    }
}
