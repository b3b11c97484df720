use std::any::Any;

use crate::shared::UserId;

pub mod event_bus;
pub mod streak_events;

pub use event_bus::{typed_handler, DynamicEventHandler, EventBus, EventHandler};

/// Something that happened to one user's streak, ledger or rewards.
pub trait DomainEvent: Send + Sync + Any {
    fn as_any(&self) -> &(dyn Any + Send + Sync);

    /// Routing key for event buses (the full type path).
    fn event_type_name(&self) -> &'static str;

    /// The user the event concerns.
    fn user_id(&self) -> &UserId;

    /// Unqualified type name, for log lines.
    fn short_name(&self) -> &'static str {
        let full = self.event_type_name();
        full.rsplit("::").next().unwrap_or(full)
    }
}
