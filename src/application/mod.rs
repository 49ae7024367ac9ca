/// Application layer - the composition use case, its DTOs and factories
///
/// Orchestrates the composition services in stage order and reaches the
/// outside world only through the outbound ports.
pub mod dto;
pub mod factories;
pub mod use_cases;
