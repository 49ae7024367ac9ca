use crate::shared::Result;

/// OutputPresenter port for delivering the rendered plan
///
/// Abstracts the destination (stdout or a file).
pub trait OutputPresenter {
    /// Writes `content` to the destination
    ///
    /// # Errors
    /// Returns an error if the destination cannot be written, for example
    /// because the parent directory does not exist
    fn present(&self, content: &str) -> Result<()>;
}
