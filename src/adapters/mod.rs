/// Adapters layer - Infrastructure implementations
///
/// Concrete implementations of the outbound ports: filesystem access,
/// stderr progress output and plan rendering.
pub mod outbound;
