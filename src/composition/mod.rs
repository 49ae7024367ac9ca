/// Composition core - the domain model and the services that assemble a deployment
///
/// Nothing in this module performs I/O; file contents arrive through the
/// `CustomMetricsReader` port at the application layer.
pub mod domain;
pub mod policies;
pub mod services;
