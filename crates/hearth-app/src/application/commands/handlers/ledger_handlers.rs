use async_trait::async_trait;
use hearth_domain::events::EventBus;
use hearth_domain::ledger::DateLedgerEntry;
use hearth_domain::shared::{DomainError, ReferenceClock, UnitOfWork};
use log::info;
use std::sync::Arc;

use super::shared::{apply_ledger_change, parse_user_id, publish_recalculated, LedgerChange};
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::streak_commands::{MarkDayCommand, UnmarkDayCommand};
use crate::application::dtos::StreakStateDto;
use crate::application::services::ConsistencyMaintainer;

/// Mark day command handler
pub struct MarkDayCommandHandler {
    uow: Arc<dyn UnitOfWork>,
    maintainer: Arc<ConsistencyMaintainer>,
    clock: Arc<dyn ReferenceClock>,
    event_bus: Arc<dyn EventBus>,
}

impl MarkDayCommandHandler {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        maintainer: Arc<ConsistencyMaintainer>,
        clock: Arc<dyn ReferenceClock>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            uow,
            maintainer,
            clock,
            event_bus,
        }
    }
}

#[async_trait]
impl CommandHandler<MarkDayCommand> for MarkDayCommandHandler {
    type Result = StreakStateDto;

    async fn handle(&self, cmd: MarkDayCommand) -> Result<Self::Result, DomainError> {
        let user_id = parse_user_id(&cmd.user_id)?;
        let today = self.clock.today();

        info!(
            "Handling MarkDayCommand: {} {} as {}",
            user_id, cmd.date, cmd.category
        );

        let entry = DateLedgerEntry::new(user_id.clone(), cmd.date, cmd.category, today)?;
        let outcome = apply_ledger_change(
            self.uow.as_ref(),
            &self.maintainer,
            &user_id,
            &LedgerChange::Mark(entry),
            today,
        )
        .await?;

        publish_recalculated(self.event_bus.as_ref(), &user_id, &outcome).await;

        Ok(StreakStateDto::from_state(&user_id, &outcome.state, today))
    }
}

/// Unmark day command handler
pub struct UnmarkDayCommandHandler {
    uow: Arc<dyn UnitOfWork>,
    maintainer: Arc<ConsistencyMaintainer>,
    clock: Arc<dyn ReferenceClock>,
    event_bus: Arc<dyn EventBus>,
}

impl UnmarkDayCommandHandler {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        maintainer: Arc<ConsistencyMaintainer>,
        clock: Arc<dyn ReferenceClock>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            uow,
            maintainer,
            clock,
            event_bus,
        }
    }
}

#[async_trait]
impl CommandHandler<UnmarkDayCommand> for UnmarkDayCommandHandler {
    type Result = StreakStateDto;

    async fn handle(&self, cmd: UnmarkDayCommand) -> Result<Self::Result, DomainError> {
        let user_id = parse_user_id(&cmd.user_id)?;
        let today = self.clock.today();

        info!(
            "Handling UnmarkDayCommand: {} {} ({})",
            user_id, cmd.date, cmd.category
        );

        // Removing a day that was never marked is a no-op, but the
        // reconcile still runs so the returned state is current.
        let outcome = apply_ledger_change(
            self.uow.as_ref(),
            &self.maintainer,
            &user_id,
            &LedgerChange::Unmark {
                date: cmd.date,
                category: cmd.category,
            },
            today,
        )
        .await?;

        publish_recalculated(self.event_bus.as_ref(), &user_id, &outcome).await;

        Ok(StreakStateDto::from_state(&user_id, &outcome.state, today))
    }
}
