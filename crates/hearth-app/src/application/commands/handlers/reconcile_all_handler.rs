use async_trait::async_trait;
use hearth_domain::events::EventBus;
use hearth_domain::ledger::DateLedger;
use hearth_domain::shared::{DomainError, ReferenceClock, TransactionContext, UnitOfWork};
use log::{error, info};
use std::sync::Arc;

use super::shared::publish_recalculated;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::streak_commands::ReconcileAllCommand;
use crate::application::dtos::ReconcileAllResultDto;
use crate::application::services::ConsistencyMaintainer;

/// Reconcile-all command handler
///
/// Day rollover job: advances missed-day counts and resets for users who
/// have not touched the app. One user's failure does not stop the batch.
pub struct ReconcileAllCommandHandler {
    uow: Arc<dyn UnitOfWork>,
    maintainer: Arc<ConsistencyMaintainer>,
    clock: Arc<dyn ReferenceClock>,
    event_bus: Arc<dyn EventBus>,
}

impl ReconcileAllCommandHandler {
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
impl CommandHandler<ReconcileAllCommand> for ReconcileAllCommandHandler {
    type Result = ReconcileAllResultDto;

    async fn handle(&self, _cmd: ReconcileAllCommand) -> Result<Self::Result, DomainError> {
        let today = self.clock.today();

        let users = {
            let mut tx = self.uow.begin().await?;
            let users = tx.known_users().await?;
            tx.rollback().await?;
            users
        };

        info!("Reconciling {} users for {}", users.len(), today);

        let mut result = ReconcileAllResultDto {
            users: users.len(),
            ..Default::default()
        };

        for user_id in &users {
            match self
                .maintainer
                .reconcile_committed(self.uow.as_ref(), user_id, today)
                .await
            {
                Ok(outcome) => {
                    if outcome.changed {
                        result.changed += 1;
                    }
                    result.pruned_dates += outcome.pruned;
                    publish_recalculated(self.event_bus.as_ref(), user_id, &outcome).await;
                }
                Err(e) => {
                    error!("Failed to reconcile {}: {}", user_id, e.format_with_code());
                    result.failed.push(user_id.to_string());
                }
            }
        }

        info!(
            "Reconcile finished: {} users, {} changed, {} pruned, {} failed",
            result.users,
            result.changed,
            result.pruned_dates,
            result.failed.len()
        );

        Ok(result)
    }
}
