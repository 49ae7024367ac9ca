use crate::shared::Result;
use std::path::Path;

/// CustomMetricsReader port for loading the custom metrics definition
///
/// The contents become a persisted parameter verbatim, so the reader only
/// checks that the file is safe to read and returns it unchanged.
pub trait CustomMetricsReader {
    /// Reads the whole custom metrics file
    ///
    /// # Arguments
    /// * `path` - Absolute path of the file named by the deployment
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file does not exist (`CustomMetricsFileNotFound`)
    /// - The path is a symlink or not a regular file
    /// - The file exceeds the input size limit or cannot be read
    fn read_custom_metrics(&self, path: &Path) -> Result<String>;
}
