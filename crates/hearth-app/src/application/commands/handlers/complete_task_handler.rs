use async_trait::async_trait;
use hearth_domain::events::streak_events::TaskCompleted;
use hearth_domain::events::EventBus;
use hearth_domain::ledger::DayCategory;
use hearth_domain::shared::{DomainError, ReferenceClock, TaskId};
use log::{info, warn};
use std::sync::Arc;

use super::ledger_handlers::MarkDayCommandHandler;
use super::shared::parse_user_id;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::streak_commands::{CompleteTaskCommand, MarkDayCommand};
use crate::application::dtos::StreakStateDto;

/// Complete task command handler
///
/// Marks the completion's reference day as a streak day, then announces
/// the completion. A failed mark fails the command and nothing is
/// published.
pub struct CompleteTaskCommandHandler {
    mark_day: Arc<MarkDayCommandHandler>,
    clock: Arc<dyn ReferenceClock>,
    event_bus: Arc<dyn EventBus>,
}

impl CompleteTaskCommandHandler {
    pub fn new(
        mark_day: Arc<MarkDayCommandHandler>,
        clock: Arc<dyn ReferenceClock>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            mark_day,
            clock,
            event_bus,
        }
    }
}

#[async_trait]
impl CommandHandler<CompleteTaskCommand> for CompleteTaskCommandHandler {
    type Result = StreakStateDto;

    async fn handle(&self, cmd: CompleteTaskCommand) -> Result<Self::Result, DomainError> {
        let user_id = parse_user_id(&cmd.user_id)?;
        let task_id = cmd.task_id.trim();
        if task_id.is_empty() {
            return Err(DomainError::InvalidInput("Task id must not be empty".to_string()));
        }

        // The civil day of the completion instant, not of processing.
        let day = self.clock.day_of(cmd.completed_at);
        let today = self.clock.today();
        if day > today {
            return Err(DomainError::InvalidDate(format!(
                "Task completion on {} is in the future (today is {})",
                day, today
            )));
        }

        info!(
            "Handling CompleteTaskCommand: task {} by {} at {}, marking {}",
            task_id, user_id, cmd.completed_at, day
        );

        let state = self
            .mark_day
            .handle(MarkDayCommand {
                user_id: user_id.to_string(),
                date: day,
                category: DayCategory::Streak,
            })
            .await?;

        let event = TaskCompleted {
            user_id: user_id.clone(),
            task_id: TaskId::from_string(task_id),
            completed_at: cmd.completed_at,
        };
        if let Err(e) = self.event_bus.publish(Box::new(event)).await {
            warn!("Failed to publish TaskCompleted for {}: {}", user_id, e);
        }

        Ok(state)
    }
}
