/// Shared kernel - error types, file safety checks and the crate-wide Result alias
pub mod error;
pub mod security;

/// Result with `anyhow::Error`, used by every layer of the crate.
///
/// Domain failures are raised as [`error::ComposeError`] and converted on the
/// way up so callers can still downcast them.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
