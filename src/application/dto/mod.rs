/// Data Transfer Objects for application layer
///
/// The CLI builds a [`ComposeRequest`]; the use case answers with a
/// [`ComposeResponse`] that formatters render.
mod compose_request;
mod compose_response;
mod output_format;

pub use compose_request::ComposeRequest;
pub use compose_response::ComposeResponse;
pub use output_format::OutputFormat;
