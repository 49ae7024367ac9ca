/// Mock implementations for testing
mod mock_custom_metrics_reader;
mod mock_progress_reporter;

pub use mock_custom_metrics_reader::MockCustomMetricsReader;
pub use mock_progress_reporter::MockProgressReporter;
