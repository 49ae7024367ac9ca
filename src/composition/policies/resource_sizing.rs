use crate::composition::domain::compute::{EntryPoint, FunctionSpec, ServiceSpec};
use crate::composition::domain::variant::BuildSettings;
use std::time::Duration;

/// Custom runtime used for the compiled collector binaries
pub const FUNCTION_RUNTIME: &str = "provided.al2023";

/// Handler name expected by custom runtimes
pub const FUNCTION_HANDLER: &str = "bootstrap";

/// Hard ceilings of the function platform. Workloads that need more run as
/// a containerized service.
pub const FUNCTION_MAX_MEMORY_MIB: u32 = 10_240;
pub const FUNCTION_MAX_TIMEOUT: Duration = Duration::from_secs(900);

/// ResourceSizing policy for compute target defaults
///
/// Sizing is the only place, besides trigger binding, where the target kinds
/// differ:
/// - primary collector function: 512 MiB, 60 s
/// - events collector function: 1024 MiB, 300 s
/// - collector service: 1 vCPU (1024 units), 2048 MiB, one task
pub struct ResourceSizing;

impl ResourceSizing {
    /// Function sizing for the given entry point
    pub fn function(entry_point: EntryPoint, build: BuildSettings) -> FunctionSpec {
        let (memory_mib, timeout_secs) = match entry_point {
            EntryPoint::Collector => (512, 60),
            EntryPoint::EventsCollector => (1024, 300),
        };

        FunctionSpec {
            runtime: FUNCTION_RUNTIME,
            handler: FUNCTION_HANDLER,
            architecture: build.target_arch,
            memory_mib,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Service sizing for the long-running collector
    pub fn service(build: BuildSettings) -> ServiceSpec {
        ServiceSpec {
            cpu_units: 1024,
            memory_mib: 2048,
            desired_count: 1,
            architecture: build.target_arch,
        }
    }

    /// Whether a function sized this way fits inside the platform ceilings
    pub fn fits_function_platform(spec: &FunctionSpec) -> bool {
        spec.memory_mib <= FUNCTION_MAX_MEMORY_MIB && spec.timeout <= FUNCTION_MAX_TIMEOUT
    }
}
