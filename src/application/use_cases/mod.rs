/// Use cases module containing application business logic orchestration
mod compose_deployment;

pub use compose_deployment::ComposeDeploymentUseCase;
