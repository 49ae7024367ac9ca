use crate::composition::domain::access::{AccessIdentity, ServicePrincipal};
use crate::composition::domain::compute::{ArtifactSource, ComputeSpec, ComputeTarget, EntryPoint};
use crate::composition::domain::network::NetworkAttachment;
use crate::composition::domain::runtime_config::{self as env, RuntimeConfig};
use crate::composition::domain::trigger::{TriggerKind, TriggerSpec};
use crate::composition::domain::variant::{BuildSource, ComputeKind, DeploymentVariant};
use crate::composition::policies::ResourceSizing;
use crate::shared::error::ComposeError;
use crate::shared::Result;
use std::path::PathBuf;

pub const COLLECTOR_FUNCTION_ID: &str = "CollectorFunction";
pub const COLLECTOR_SERVICE_ID: &str = "CollectorService";
pub const EVENTS_COLLECTOR_FUNCTION_ID: &str = "EventsCollectorFunction";
pub const SCHEDULE_TRIGGER_ID: &str = "CollectorSchedule";
pub const EVENTS_TRIGGER_ID: &str = "DatabaseEventsRule";

/// Interval of the primary collector schedule
pub const SCHEDULE_RATE_MINUTES: u32 = 5;

/// Event source the events collector subscribes to
pub const DATABASE_EVENT_SOURCE: &str = "aws.rds";

/// Container build context and Dockerfile, relative to the project root
pub const CONTAINER_BUILD_CONTEXT: &str = "collector";
pub const CONTAINER_DOCKERFILE: &str = "build/Dockerfile";

/// Variables forwarded to the events collector
pub const EVENTS_COLLECTOR_VARIABLES: [&str; 3] =
    [env::EXPORTER_TYPE, env::PROMETHEUS_REMOTE_WRITE_URL, env::LOG_LEVEL];

/// TriggerBinder service for the last two composition stages
///
/// Creates compute targets from the sealed identity, runtime configuration
/// and network attachment, then binds each trigger to the target it invokes.
pub struct TriggerBinder;

impl TriggerBinder {
    /// Creates the primary collector and, when enabled, the events collector.
    ///
    /// # Errors
    /// An attached network with an identity that cannot manage network
    /// interfaces is rejected before any target is built. So is a target
    /// whose service the identity does not trust.
    pub fn create_targets(
        variant: &DeploymentVariant,
        identity: &AccessIdentity,
        runtime: &RuntimeConfig,
        network: &NetworkAttachment,
    ) -> Result<Vec<ComputeTarget>> {
        if network.is_attached() && !identity.scope().grants("ec2:CreateNetworkInterface") {
            return Err(ComposeError::Validation {
                message: format!(
                    "role '{}' cannot manage network interfaces but the collector is network attached",
                    identity.logical_id()
                ),
            }
            .into());
        }

        let build = variant.build_settings();
        let primary = match variant.compute_kind() {
            ComputeKind::Function => ComputeTarget {
                logical_id: COLLECTOR_FUNCTION_ID.to_string(),
                entry_point: EntryPoint::Collector,
                role_id: identity.logical_id().to_string(),
                source: Self::function_source(variant.build_source(), EntryPoint::Collector)?,
                environment: runtime.clone(),
                network: network.clone(),
                spec: ComputeSpec::Function(ResourceSizing::function(EntryPoint::Collector, build)),
            },
            ComputeKind::ContainerService => ComputeTarget {
                logical_id: COLLECTOR_SERVICE_ID.to_string(),
                entry_point: EntryPoint::Collector,
                role_id: identity.logical_id().to_string(),
                source: Self::image_source(variant),
                environment: runtime.clone(),
                network: network.clone(),
                spec: ComputeSpec::Service(ResourceSizing::service(build)),
            },
        };

        let mut targets = vec![primary];

        if variant.events_trigger() {
            targets.push(ComputeTarget {
                logical_id: EVENTS_COLLECTOR_FUNCTION_ID.to_string(),
                entry_point: EntryPoint::EventsCollector,
                role_id: identity.logical_id().to_string(),
                source: Self::function_source(variant.build_source(), EntryPoint::EventsCollector)?,
                environment: runtime.subset(&EVENTS_COLLECTOR_VARIABLES),
                network: NetworkAttachment::Detached,
                spec: ComputeSpec::Function(ResourceSizing::function(
                    EntryPoint::EventsCollector,
                    build,
                )),
            });
        }

        if let Some(untrusted) = targets
            .iter()
            .find(|t| !identity.trusts(ServicePrincipal::for_compute(t.kind())))
        {
            return Err(ComposeError::Validation {
                message: format!(
                    "role '{}' does not trust {} which runs '{}'",
                    identity.logical_id(),
                    ServicePrincipal::for_compute(untrusted.kind()).as_str(),
                    untrusted.logical_id
                ),
            }
            .into());
        }

        tracing::debug!(
            targets = ?targets.iter().map(|t| t.logical_id.as_str()).collect::<Vec<_>>(),
            "created compute targets"
        );

        Ok(targets)
    }

    /// Binds the schedule to a function primary and the database event
    /// pattern to the events collector. Services schedule themselves.
    pub fn bind_triggers(targets: &[ComputeTarget]) -> Result<Vec<TriggerSpec>> {
        let mut triggers = Vec::new();

        for target in targets {
            match (target.entry_point, target.kind()) {
                (EntryPoint::Collector, ComputeKind::Function) => {
                    triggers.push(TriggerSpec::bind(
                        SCHEDULE_TRIGGER_ID,
                        TriggerKind::every_minutes(SCHEDULE_RATE_MINUTES),
                        target,
                    )?);
                }
                (EntryPoint::Collector, ComputeKind::ContainerService) => {}
                (EntryPoint::EventsCollector, _) => {
                    triggers.push(TriggerSpec::bind(
                        EVENTS_TRIGGER_ID,
                        TriggerKind::events_from(DATABASE_EVENT_SOURCE),
                        target,
                    )?);
                }
            }
        }

        Ok(triggers)
    }

    fn function_source(source: &BuildSource, entry_point: EntryPoint) -> Result<ArtifactSource> {
        match (source, entry_point) {
            (BuildSource::LocalSource { root }, _) => Ok(ArtifactSource::LocalEntry {
                path: root.join(entry_point.source_dir()),
            }),
            (BuildSource::Prebuilt { artifact_uri, .. }, EntryPoint::Collector) => {
                Ok(ArtifactSource::Bundle {
                    uri: artifact_uri.clone(),
                })
            }
            (
                BuildSource::Prebuilt {
                    events_artifact_uri: Some(uri),
                    ..
                },
                EntryPoint::EventsCollector,
            ) => Ok(ArtifactSource::Bundle { uri: uri.clone() }),
            (BuildSource::Prebuilt { .. }, EntryPoint::EventsCollector) => {
                Err(ComposeError::Validation {
                    message: "the events collector has no prebuilt bundle".to_string(),
                }
                .into())
            }
        }
    }

    fn image_source(variant: &DeploymentVariant) -> ArtifactSource {
        match variant.build_source() {
            BuildSource::LocalSource { root } => ArtifactSource::LocalImageBuild {
                context: root.join(CONTAINER_BUILD_CONTEXT),
                dockerfile: PathBuf::from(CONTAINER_DOCKERFILE),
                platform: variant.build_settings().target_arch.container_platform(),
            },
            BuildSource::Prebuilt { artifact_uri, .. } => ArtifactSource::Image {
                uri: artifact_uri.clone(),
            },
        }
    }
}
