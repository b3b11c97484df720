use async_trait::async_trait;
use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

use super::DomainEvent;
use crate::shared::DomainError;

/// Publishes events after the state they describe has been committed.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError>;
}

/// Reacts to one concrete event type.
#[async_trait]
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    async fn handle(&self, event: &E) -> Result<(), DomainError>;
}

/// Type-erased handler as stored by a bus, keyed by
/// [`event_type_name`](Self::event_type_name).
#[async_trait]
pub trait DynamicEventHandler: Send + Sync {
    async fn handle_dynamic(&self, event: &(dyn Any + Send + Sync)) -> Result<(), DomainError>;

    fn event_type_name(&self) -> &'static str;
}

/// Erase a typed handler so a bus can route `E` to it.
pub fn typed_handler<E, H>(handler: H) -> Arc<dyn DynamicEventHandler>
where
    E: DomainEvent + 'static,
    H: EventHandler<E> + 'static,
{
    Arc::new(Typed {
        handler,
        _event: PhantomData::<fn(E)>,
    })
}

struct Typed<E, H> {
    handler: H,
    _event: PhantomData<fn(E)>,
}

#[async_trait]
impl<E, H> DynamicEventHandler for Typed<E, H>
where
    E: DomainEvent + 'static,
    H: EventHandler<E> + 'static,
{
    async fn handle_dynamic(&self, event: &(dyn Any + Send + Sync)) -> Result<(), DomainError> {
        let event = event.downcast_ref::<E>().ok_or_else(|| {
            DomainError::DataIntegrity(format!("{} routed to the wrong handler", type_name::<E>()))
        })?;
        self.handler.handle(event).await
    }

    fn event_type_name(&self) -> &'static str {
        type_name::<E>()
    }
}
