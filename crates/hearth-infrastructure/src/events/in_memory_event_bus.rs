use async_trait::async_trait;
use hearth_domain::events::{typed_handler, DomainEvent, DynamicEventHandler, EventBus, EventHandler};
use hearth_domain::shared::DomainError;
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Dispatches events to subscribed handlers in-process, one after another,
/// on the publisher's task.
pub struct InMemoryEventBus {
    handlers: Arc<RwLock<HashMap<&'static str, Vec<Arc<dyn DynamicEventHandler>>>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Route every published `E` to `handler`.
    pub async fn subscribe<E, H>(&self, handler: H)
    where
        E: DomainEvent + 'static,
        H: EventHandler<E> + 'static,
    {
        let handler = typed_handler::<E, H>(handler);
        let event_type_name = handler.event_type_name();

        self.handlers
            .write()
            .await
            .entry(event_type_name)
            .or_default()
            .push(handler);

        info!("Subscribed handler for event type: {}", event_type_name);
    }

    pub async fn handler_count<E: DomainEvent + 'static>(&self) -> usize {
        let handlers = self.handlers.read().await;
        handlers
            .get(std::any::type_name::<E>())
            .map_or(0, |h| h.len())
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        let event_type_name = event.event_type_name();

        // Snapshot the list so handlers may publish or subscribe themselves.
        let subscribed = {
            let handlers = self.handlers.read().await;
            handlers.get(event_type_name).cloned().unwrap_or_default()
        };

        if subscribed.is_empty() {
            debug!("No handlers for {} of {}", event.short_name(), event.user_id());
            return Ok(());
        }

        debug!(
            "Publishing {} of {} to {} handler(s)",
            event.short_name(),
            event.user_id(),
            subscribed.len()
        );

        for handler in subscribed {
            // Handler failures are logged and do not stop the others.
            if let Err(e) = handler.handle_dynamic(event.as_any()).await {
                error!(
                    "Handler failed to process {} of {}: {}",
                    event.short_name(),
                    event.user_id(),
                    e.format_with_code()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hearth_domain::events::streak_events::{StreakRecalculated, TaskCompleted};
    use hearth_domain::shared::{TaskId, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler<TaskCompleted> for CountingHandler {
        async fn handle(&self, _event: &TaskCompleted) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::Infrastructure("boom".to_string()));
            }
            Ok(())
        }
    }

    fn task_completed() -> Box<TaskCompleted> {
        Box::new(TaskCompleted {
            user_id: UserId::new(),
            task_id: TaskId::new(),
            completed_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_event_bus_publishes_to_handlers() {
        let bus = InMemoryEventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        bus.subscribe::<TaskCompleted, _>(CountingHandler {
            calls: calls.clone(),
            fail: false,
        })
        .await;

        bus.publish(task_completed()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.handler_count::<TaskCompleted>().await, 1);
        assert_eq!(bus.handler_count::<StreakRecalculated>().await, 0);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_others() {
        let bus = InMemoryEventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for fail in [true, false] {
            bus.subscribe::<TaskCompleted, _>(CountingHandler {
                calls: calls.clone(),
                fail,
            })
            .await;
        }

        assert!(bus.publish(task_completed()).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unsubscribed_event_is_ignored() {
        let bus = InMemoryEventBus::new();
        let event = Box::new(StreakRecalculated {
            user_id: UserId::new(),
            previous_streak_days: 0,
            streak_days: 1,
            last_streak_date: None,
            consecutive_missed_days: 0,
            pruned_dates: 0,
            occurred_at: Utc::now(),
        });

        assert!(bus.publish(event).await.is_ok());
    }
}
