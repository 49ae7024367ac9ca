mod resource_sizing;

pub use resource_sizing::{ResourceSizing, FUNCTION_HANDLER, FUNCTION_RUNTIME};
