mod access_policy_builder;
mod config_resolver;
mod network_attacher;
mod plan_generator;
mod trigger_binder;

pub use access_policy_builder::{
    AccessPolicyBuilder, CLOUDWATCH_POLICY, NETWORK_INTERFACE_ACTIONS, OPT_IN_TAG_CONDITION_KEY,
    OPT_IN_TAG_VALUE, PROMETHEUS_REMOTE_WRITE_POLICY, ROLE_LOGICAL_ID,
};
pub use config_resolver::{
    ConfigResolver, CustomMetricsSource, ExporterType, LogLevel, ResolvedConfig,
    DEFAULT_CRON_SCHEDULE,
};
pub use network_attacher::{NetworkAttacher, NetworkResolution};
pub use plan_generator::PlanGenerator;
pub use trigger_binder::{
    TriggerBinder, COLLECTOR_FUNCTION_ID, COLLECTOR_SERVICE_ID, DATABASE_EVENT_SOURCE,
    EVENTS_COLLECTOR_FUNCTION_ID, EVENTS_TRIGGER_ID, SCHEDULE_TRIGGER_ID,
};
