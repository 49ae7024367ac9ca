use crate::composition::domain::context::{keys, DeploymentContext};
use crate::shared::error::ComposeError;
use crate::shared::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Kind of compute target the collector is deployed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeKind {
    /// Function-as-a-service, invoked in short schedule-triggered bursts
    Function,
    /// Long-running containerized service with its own internal schedule
    ContainerService,
}

impl ComputeKind {
    /// Run mode the collector binary is started in for this target kind.
    pub fn run_mode(self) -> RunMode {
        match self {
            ComputeKind::Function => RunMode::Lambda,
            ComputeKind::ContainerService => RunMode::Cron,
        }
    }

    /// Chooses the compute kind from an explicit target and/or a run mode.
    ///
    /// An explicit target wins; a run mode alone selects the kind that runs
    /// in that mode; with neither the function target is used. An explicit
    /// target that contradicts the run mode is rejected.
    pub fn select(explicit: Option<ComputeKind>, run_mode: Option<RunMode>) -> Result<Self> {
        match (explicit, run_mode) {
            (Some(kind), Some(mode)) if kind.run_mode() != mode => {
                Err(ComposeError::configuration(
                    keys::RUN_MODE,
                    format!("run mode {} cannot be used with a {} target", mode, kind),
                )
                .into())
            }
            (Some(kind), _) => Ok(kind),
            (None, Some(RunMode::Cron)) => Ok(ComputeKind::ContainerService),
            (None, Some(RunMode::Lambda)) | (None, None) => Ok(ComputeKind::Function),
        }
    }
}

impl FromStr for ComputeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lambda" | "function" => Ok(ComputeKind::Function),
            "fargate" | "ecs" | "service" => Ok(ComputeKind::ContainerService),
            _ => Err(format!(
                "Invalid compute target: {}. Please specify 'lambda' or 'fargate'",
                s
            )),
        }
    }
}

impl fmt::Display for ComputeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeKind::Function => write!(f, "lambda"),
            ComputeKind::ContainerService => write!(f, "fargate"),
        }
    }
}

/// Run mode passed to the collector through `RUN_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Lambda,
    Cron,
}

impl RunMode {
    pub fn as_env_value(self) -> &'static str {
        match self {
            RunMode::Lambda => "LAMBDA",
            RunMode::Cron => "CRON",
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LAMBDA" => Ok(RunMode::Lambda),
            "CRON" => Ok(RunMode::Cron),
            _ => Err(format!(
                "Invalid run mode: {}. Please specify 'LAMBDA' or 'CRON'",
                s
            )),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_env_value())
    }
}

/// CPU architecture the collector is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetArch {
    #[default]
    Arm64,
    X86_64,
}

impl TargetArch {
    /// Architecture name as the function runtime spells it
    pub fn function_architecture(self) -> &'static str {
        match self {
            TargetArch::Arm64 => "arm64",
            TargetArch::X86_64 => "x86_64",
        }
    }

    /// Container platform string for image builds
    pub fn container_platform(self) -> &'static str {
        match self {
            TargetArch::Arm64 => "linux/arm64",
            TargetArch::X86_64 => "linux/amd64",
        }
    }

    /// CPU architecture as the container task definition spells it
    pub fn task_cpu_architecture(self) -> &'static str {
        match self {
            TargetArch::Arm64 => "ARM64",
            TargetArch::X86_64 => "X86_64",
        }
    }
}

impl FromStr for TargetArch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arm64" | "aarch64" => Ok(TargetArch::Arm64),
            "x86_64" | "amd64" | "x64" => Ok(TargetArch::X86_64),
            _ => Err(format!(
                "Invalid target architecture: {}. Please specify 'arm64' or 'x86_64'",
                s
            )),
        }
    }
}

/// Build environment settings, resolved once at composition start.
///
/// The collector is always built as a static binary for Linux; only the
/// architecture varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildSettings {
    pub target_arch: TargetArch,
}

impl BuildSettings {
    pub const TARGET_OS: &'static str = "linux";
    pub const CGO_ENABLED: bool = false;

    pub fn new(target_arch: TargetArch) -> Self {
        Self { target_arch }
    }
}

/// Where the deployable artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSource {
    /// Built from the collector sources under `root` at deploy time
    LocalSource { root: PathBuf },
    /// Already published: an `s3://` bundle for functions or an image
    /// reference for containerized services. The events collector ships as
    /// its own bundle.
    Prebuilt {
        artifact_uri: String,
        events_artifact_uri: Option<String>,
    },
}

impl BuildSource {
    fn validate_for(&self, kind: ComputeKind) -> Result<()> {
        let BuildSource::Prebuilt {
            artifact_uri,
            events_artifact_uri,
        } = self
        else {
            return Ok(());
        };

        if let Some(events_uri) = events_artifact_uri {
            if !is_bundle_uri(events_uri) {
                return Err(ComposeError::configuration(
                    keys::EVENTS_ARTIFACT_URI,
                    format!("'{}' is not an s3://bucket/key bundle location", events_uri),
                )
                .into());
            }
        }

        let valid = match kind {
            ComputeKind::Function => is_bundle_uri(artifact_uri),
            ComputeKind::ContainerService => {
                !artifact_uri.contains(char::is_whitespace)
                    && !artifact_uri.contains("://")
                    && (artifact_uri.contains(':') || artifact_uri.contains('@'))
            }
        };

        if !valid {
            let expected = match kind {
                ComputeKind::Function => "an s3://bucket/key bundle location",
                ComputeKind::ContainerService => "an image reference such as repo/name:tag",
            };
            return Err(ComposeError::configuration(
                keys::ARTIFACT_URI,
                format!("'{}' is not {}", artifact_uri, expected),
            )
            .into());
        }
        Ok(())
    }
}

fn is_bundle_uri(uri: &str) -> bool {
    uri.strip_prefix("s3://")
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
}

/// Optional features toggled per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    pub network_attached: bool,
    pub custom_metrics_file: Option<PathBuf>,
    pub events_trigger: bool,
}

/// Fully resolved deployment shape. Every later decision keys off this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentVariant {
    compute_kind: ComputeKind,
    build_source: BuildSource,
    flags: FeatureFlags,
    build_settings: BuildSettings,
}

impl DeploymentVariant {
    /// Creates a variant, rejecting shapes that cannot be deployed.
    ///
    /// # Errors
    /// - Containerized services without network attachment (tasks always
    ///   run inside subnets)
    /// - Prebuilt artifact references that do not fit the compute kind
    /// - An events trigger on a prebuilt build without an events bundle
    pub fn new(
        compute_kind: ComputeKind,
        build_source: BuildSource,
        flags: FeatureFlags,
        build_settings: BuildSettings,
    ) -> Result<Self> {
        if compute_kind == ComputeKind::ContainerService && !flags.network_attached {
            return Err(ComposeError::configuration(
                keys::SUBNET_IDS,
                "a fargate target always runs inside subnets; supply vpcId and subnetIds",
            )
            .into());
        }

        build_source.validate_for(compute_kind)?;

        if let BuildSource::Prebuilt {
            events_artifact_uri: None,
            ..
        } = &build_source
        {
            if flags.events_trigger {
                return Err(ComposeError::configuration(
                    keys::EVENTS_ARTIFACT_URI,
                    "the events collector needs its own bundle when the build source is prebuilt",
                )
                .into());
            }
        }

        Ok(Self {
            compute_kind,
            build_source,
            flags,
            build_settings,
        })
    }

    /// Resolves the variant from external configuration.
    ///
    /// Relative paths (the custom metrics file, the local source tree) are
    /// resolved against `base_dir`.
    pub fn from_context(context: &DeploymentContext, base_dir: &Path) -> Result<Self> {
        let explicit_kind = context.parse::<ComputeKind>(keys::COMPUTE_TARGET)?;
        let run_mode = context.parse::<RunMode>(keys::RUN_MODE)?;
        let compute_kind = ComputeKind::select(explicit_kind, run_mode)?;

        let events_artifact_uri = context.get(keys::EVENTS_ARTIFACT_URI).map(str::to_string);
        let build_source = match (context.get(keys::BUILD_SOURCE), context.get(keys::ARTIFACT_URI)) {
            (Some(s), _) if s.eq_ignore_ascii_case("local") => BuildSource::LocalSource {
                root: base_dir.to_path_buf(),
            },
            (Some(s), Some(uri)) if s.eq_ignore_ascii_case("prebuilt") => BuildSource::Prebuilt {
                artifact_uri: uri.to_string(),
                events_artifact_uri,
            },
            (Some(s), None) if s.eq_ignore_ascii_case("prebuilt") => {
                return Err(ComposeError::configuration(
                    keys::ARTIFACT_URI,
                    "a prebuilt build source needs an artifact location",
                )
                .into());
            }
            (Some(other), _) => {
                return Err(ComposeError::configuration(
                    keys::BUILD_SOURCE,
                    format!("'{}' is not one of: local, prebuilt", other),
                )
                .into());
            }
            (None, Some(uri)) => BuildSource::Prebuilt {
                artifact_uri: uri.to_string(),
                events_artifact_uri,
            },
            (None, None) => BuildSource::LocalSource {
                root: base_dir.to_path_buf(),
            },
        };

        let network_implied =
            context.get(keys::VPC_ID).is_some() || context.get(keys::SUBNET_IDS).is_some();
        let network_attached = context
            .get_bool(keys::NETWORK_ATTACHED)?
            .unwrap_or(network_implied);

        let custom_metrics_file = context
            .get(keys::CUSTOM_METRICS_FILE)
            .map(|p| base_dir.join(p));

        let flags = FeatureFlags {
            network_attached,
            custom_metrics_file,
            events_trigger: context.get_bool(keys::EVENTS_TRIGGER)?.unwrap_or(false),
        };

        let target_arch = context
            .parse::<TargetArch>(keys::TARGET_ARCH)?
            .unwrap_or_default();

        Self::new(compute_kind, build_source, flags, BuildSettings::new(target_arch))
    }

    pub fn compute_kind(&self) -> ComputeKind {
        self.compute_kind
    }

    pub fn build_source(&self) -> &BuildSource {
        &self.build_source
    }

    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    pub fn build_settings(&self) -> BuildSettings {
        self.build_settings
    }

    pub fn run_mode(&self) -> RunMode {
        self.compute_kind.run_mode()
    }

    pub fn network_attached(&self) -> bool {
        self.flags.network_attached
    }

    pub fn custom_metrics_file(&self) -> Option<&Path> {
        self.flags.custom_metrics_file.as_deref()
    }

    pub fn events_trigger(&self) -> bool {
        self.flags.events_trigger
    }
}
