use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::composition::domain::CompositionStage;

/// Exit codes for the CLI application.
///
/// These codes allow CI pipelines to tell a rejected deployment
/// configuration apart from an environment problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - the plan was composed and written
    Success = 0,
    /// Composition was aborted (configuration or ordering error)
    CompositionFailed = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (file I/O, output error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Picks the exit code for an error surfaced by `run()`.
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ComposeError>() {
            Some(e) if e.aborts_composition() => ExitCode::CompositionFailed,
            Some(ComposeError::InvalidProjectPath { .. }) => ExitCode::InvalidArguments,
            _ => ExitCode::ApplicationError,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::CompositionFailed => write!(f, "Composition Failed (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Errors raised while composing a deployment.
///
/// Failures realizing resources against the cloud platform are not
/// represented here; they belong to the provisioning framework that
/// applies the rendered template.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Invalid configuration for '{key}': {reason}\n\n💡 Hint: Check the value in the config file or pass --context {key}=<value>")]
    Configuration { key: String, reason: String },

    #[error("Custom metrics file not found: {path}\n\n💡 Hint: The file is persisted as a parameter and the role is scoped to it, so it must exist before composing")]
    CustomMetricsFileNotFound { path: PathBuf },

    #[error("Composition step out of order: expected {expected}, got {found}")]
    DependencyOrdering {
        expected: CompositionStage,
        found: CompositionStage,
    },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid project path: {path}\nReason: {reason}\n\n💡 Hint: Pass the directory holding the collector sources with --path")]
    InvalidProjectPath { path: PathBuf, reason: String },

    /// Validation error for value objects
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

impl ComposeError {
    pub fn configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ComposeError::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// True for the configuration family (bad or missing inputs).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ComposeError::Configuration { .. }
                | ComposeError::CustomMetricsFileNotFound { .. }
                | ComposeError::Validation { .. }
        )
    }

    /// True when the error aborts the composition pass itself, as opposed to
    /// failing while reading inputs or writing the rendered plan.
    pub fn aborts_composition(&self) -> bool {
        self.is_configuration_error() || matches!(self, ComposeError::DependencyOrdering { .. })
    }
}
