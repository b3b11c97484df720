// Domain layer - Pure business logic
// No dependencies on infrastructure or application layers

pub mod events;
pub mod ledger;
pub mod reward;
pub mod shared;
pub mod streak;

// Re-exports for convenience
pub use events::DomainEvent;
pub use shared::{DomainError, RuleId, TaskId, UserId};
