use async_trait::async_trait;
use hearth_domain::shared::{DomainError, ReferenceClock, TransactionContext, UnitOfWork, UserId};
use hearth_domain::streak::StreakCounterStore;
use log::info;
use std::sync::Arc;

use super::shared::parse_user_id;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::streak_commands::{RegisterUserCommand, RegisterUserResult};
use crate::application::services::ConsistencyMaintainer;

/// Register user command handler
///
/// Creates the cached counter row so every registered user has one before
/// any day is marked. Registering twice keeps the existing counter.
pub struct RegisterUserCommandHandler {
    uow: Arc<dyn UnitOfWork>,
    maintainer: Arc<ConsistencyMaintainer>,
    clock: Arc<dyn ReferenceClock>,
}

impl RegisterUserCommandHandler {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        maintainer: Arc<ConsistencyMaintainer>,
        clock: Arc<dyn ReferenceClock>,
    ) -> Self {
        Self {
            uow,
            maintainer,
            clock,
        }
    }
}

#[async_trait]
impl CommandHandler<RegisterUserCommand> for RegisterUserCommandHandler {
    type Result = RegisterUserResult;

    async fn handle(&self, cmd: RegisterUserCommand) -> Result<Self::Result, DomainError> {
        let user_id = match cmd.user_id.as_deref() {
            Some(raw) => parse_user_id(raw)?,
            None => UserId::new(),
        };

        let mut tx = self.uow.begin().await?;
        if tx.load_counter(&user_id).await?.is_some() {
            tx.rollback().await?;
            info!("User {} already registered", user_id);
            return Ok(RegisterUserResult {
                user_id: user_id.to_string(),
                created: false,
            });
        }

        // Reconcile writes the missing counter; ledger rows may already
        // exist when history was imported before registration.
        self.maintainer
            .reconcile(tx.as_mut(), &user_id, self.clock.today())
            .await?;
        tx.commit().await?;

        info!("Registered user {}", user_id);

        Ok(RegisterUserResult {
            user_id: user_id.to_string(),
            created: true,
        })
    }
}
