/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define what the composition use case needs from the outside
/// world: file contents, progress output, rendering and delivery.
pub mod custom_metrics_reader;
pub mod formatter;
pub mod output_presenter;
pub mod progress_reporter;

pub use custom_metrics_reader::CustomMetricsReader;
pub use formatter::PlanFormatter;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
