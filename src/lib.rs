//! collector-deploy - deployment composer for the database metrics collector
//!
//! This library resolves configuration, a least-privilege access identity,
//! network placement, compute targets and triggers into one deployment plan,
//! following hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`composition`): Pure composition logic and domain models
//! - **Application Layer** (`application`): Use cases and application services
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use collector_deploy::prelude::*;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<()> {
//! // Create adapters
//! let custom_metrics_reader = FileSystemReader::new();
//! let progress_reporter = StderrProgressReporter::new();
//!
//! // Create use case
//! let use_case = ComposeDeploymentUseCase::new(custom_metrics_reader, progress_reporter);
//!
//! // Execute
//! let context = DeploymentContext::new()
//!     .with("exporterType", "cloudwatch")
//!     .with("vpcId", "vpc-0abc")
//!     .with("subnetIds", "subnet-1,subnet-2");
//! let response = use_case.execute(ComposeRequest::new(PathBuf::from("."), context))?;
//!
//! // Format output
//! let formatter = CloudFormationFormatter::new();
//! println!("{}", formatter.format(&response.plan)?);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod composition;
pub mod config;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{CloudFormationFormatter, MarkdownFormatter};
    pub use crate::application::dto::{ComposeRequest, ComposeResponse, OutputFormat};
    pub use crate::application::use_cases::ComposeDeploymentUseCase;
    pub use crate::composition::domain::{
        AccessIdentity, ComputeKind, ComputeSpec, ComputeTarget, CompositionStage,
        DeploymentContext, DeploymentPlan, DeploymentVariant, NetworkAttachment, ResourcePattern,
        ServicePrincipal, TriggerKind, TriggerSpec,
    };
    pub use crate::composition::services::{
        AccessPolicyBuilder, ConfigResolver, NetworkAttacher, TriggerBinder,
    };
    pub use crate::ports::outbound::{
        CustomMetricsReader, OutputPresenter, PlanFormatter, ProgressReporter,
    };
    pub use crate::shared::error::{ComposeError, ExitCode};
    pub use crate::shared::Result;
}
