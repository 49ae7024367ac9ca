use crate::composition::domain::network::NetworkAttachment;
use crate::composition::domain::runtime_config::RuntimeConfig;
use crate::composition::domain::variant::{ComputeKind, TargetArch};
use std::path::PathBuf;
use std::time::Duration;

/// Named executable entry point inside the collector sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// Primary database collector (`collector/cmd/collector`)
    Collector,
    /// Database events collector (`collector/cmd/events-collector`)
    EventsCollector,
}

impl EntryPoint {
    pub fn name(self) -> &'static str {
        match self {
            EntryPoint::Collector => "collector",
            EntryPoint::EventsCollector => "events-collector",
        }
    }

    /// Source directory of the entry point, relative to the project root
    pub fn source_dir(self) -> PathBuf {
        PathBuf::from("collector").join("cmd").join(self.name())
    }
}

/// Where a compute target's code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Function code compiled from a local source directory
    LocalEntry { path: PathBuf },
    /// Container image built from a local context directory
    LocalImageBuild {
        context: PathBuf,
        dockerfile: PathBuf,
        platform: &'static str,
    },
    /// Prebuilt function bundle (`s3://bucket/key`)
    Bundle { uri: String },
    /// Prebuilt container image reference
    Image { uri: String },
}

impl ArtifactSource {
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ArtifactSource::LocalEntry { .. } | ArtifactSource::LocalImageBuild { .. }
        )
    }

    /// Splits a bundle URI into bucket and key.
    pub fn bundle_location(&self) -> Option<(&str, &str)> {
        match self {
            ArtifactSource::Bundle { uri } => uri.strip_prefix("s3://")?.split_once('/'),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub runtime: &'static str,
    pub handler: &'static str,
    pub architecture: TargetArch,
    pub memory_mib: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub cpu_units: u32,
    pub memory_mib: u32,
    pub desired_count: u32,
    pub architecture: TargetArch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeSpec {
    Function(FunctionSpec),
    Service(ServiceSpec),
}

/// One deployed unit of collector logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeTarget {
    pub logical_id: String,
    pub entry_point: EntryPoint,
    pub role_id: String,
    pub source: ArtifactSource,
    pub environment: RuntimeConfig,
    pub network: NetworkAttachment,
    pub spec: ComputeSpec,
}

impl ComputeTarget {
    pub fn kind(&self) -> ComputeKind {
        match self.spec {
            ComputeSpec::Function(_) => ComputeKind::Function,
            ComputeSpec::Service(_) => ComputeKind::ContainerService,
        }
    }

    pub fn memory_mib(&self) -> u32 {
        match &self.spec {
            ComputeSpec::Function(f) => f.memory_mib,
            ComputeSpec::Service(s) => s.memory_mib,
        }
    }

    /// Invocation timeout; `None` for services, which run continuously.
    pub fn timeout(&self) -> Option<Duration> {
        match &self.spec {
            ComputeSpec::Function(f) => Some(f.timeout),
            ComputeSpec::Service(_) => None,
        }
    }
}
