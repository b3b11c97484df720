use chrono::{DateTime, NaiveDate, Utc};
use hearth_domain::events::{DomainEvent, EventHandler};
use hearth_domain::ledger::DayCategory;
use hearth_domain::reward::{DateRewardRule, RewardCycleRule, RewardSource};
use hearth_domain::shared::{RuleId, UserId};
use hearth_infrastructure::persistence::repositories::SqliteRewardCatalog;
use log::info;

use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::*;
use crate::application::dtos::{
    ClaimRecordDto, ClaimResultDto, ClaimableRewardDto, ReconcileAllResultDto, StreakCalendarDto,
    StreakStateDto, WalletDto,
};
use crate::presentation::error::CommandError;
use crate::presentation::state::{CommandHandlers, Queries, Runtime};

/// Entry point of the streak calendar engine.
///
/// Built by [`EngineBuilder`](crate::presentation::bootstrap::EngineBuilder).
pub struct StreakEngine {
    pub(crate) runtime: Runtime,
    pub(crate) command_handlers: CommandHandlers,
    pub(crate) queries: Queries,
}

fn user(user_id: &str) -> Result<UserId, CommandError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(CommandError::validation("User id must not be empty"));
    }
    Ok(UserId::from_string(trimmed))
}

impl StreakEngine {
    /// Today in the reference timezone.
    pub fn today(&self) -> NaiveDate {
        self.runtime.clock.today()
    }

    pub async fn mark_day(
        &self,
        user_id: &str,
        date: NaiveDate,
        category: DayCategory,
    ) -> Result<StreakStateDto, CommandError> {
        let command = MarkDayCommand {
            user_id: user_id.to_string(),
            date,
            category,
        };
        Ok(self.command_handlers.mark_day.handle(command).await?)
    }

    pub async fn unmark_day(
        &self,
        user_id: &str,
        date: NaiveDate,
        category: DayCategory,
    ) -> Result<StreakStateDto, CommandError> {
        let command = UnmarkDayCommand {
            user_id: user_id.to_string(),
            date,
            category,
        };
        Ok(self.command_handlers.unmark_day.handle(command).await?)
    }

    pub async fn get_streak_state(&self, user_id: &str) -> Result<StreakStateDto, CommandError> {
        Ok(self.queries.streak.get_streak_state(&user(user_id)?).await?)
    }

    pub async fn list_claimable_rewards(
        &self,
        user_id: &str,
    ) -> Result<Vec<ClaimableRewardDto>, CommandError> {
        Ok(self
            .queries
            .streak
            .list_claimable_rewards(&user(user_id)?)
            .await?)
    }

    pub async fn claim_reward(
        &self,
        user_id: &str,
        source: RewardSource,
        source_key: &str,
    ) -> Result<ClaimResultDto, CommandError> {
        let command = ClaimRewardCommand {
            user_id: user_id.to_string(),
            source,
            source_key: source_key.to_string(),
        };
        Ok(self.command_handlers.claim_reward.handle(command).await?)
    }

    /// Register a user, generating an id when none is given. Returns the id.
    pub async fn register_user(&self, user_id: Option<&str>) -> Result<String, CommandError> {
        let command = RegisterUserCommand {
            user_id: user_id.map(str::to_string),
        };
        let result = self.command_handlers.register_user.handle(command).await?;
        Ok(result.user_id)
    }

    pub async fn get_calendar(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<StreakCalendarDto, CommandError> {
        Ok(self
            .queries
            .streak
            .get_calendar(&user(user_id)?, year, month)
            .await?)
    }

    pub async fn reconcile_all(&self) -> Result<ReconcileAllResultDto, CommandError> {
        Ok(self
            .command_handlers
            .reconcile_all
            .handle(ReconcileAllCommand)
            .await?)
    }

    pub async fn complete_task(
        &self,
        user_id: &str,
        task_id: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<StreakStateDto, CommandError> {
        let command = CompleteTaskCommand {
            user_id: user_id.to_string(),
            task_id: task_id.to_string(),
            completed_at,
        };
        Ok(self.command_handlers.complete_task.handle(command).await?)
    }

    pub async fn list_claims(&self, user_id: &str) -> Result<Vec<ClaimRecordDto>, CommandError> {
        Ok(self.queries.streak.list_claims(&user(user_id)?).await?)
    }

    pub async fn get_wallet(&self, user_id: &str) -> Result<WalletDto, CommandError> {
        Ok(self.queries.streak.get_wallet(&user(user_id)?).await?)
    }

    pub async fn save_cycle_rule(&self, rule: &RewardCycleRule) -> Result<(), CommandError> {
        self.rule_store()?.save_cycle_rule(rule).await?;
        info!("Saved cycle rule {} ({} days)", rule.id(), rule.cycle_days());
        Ok(())
    }

    pub async fn save_date_rule(&self, rule: &DateRewardRule) -> Result<(), CommandError> {
        self.rule_store()?.save_date_rule(rule).await?;
        info!("Saved date rule {} ({})", rule.id(), rule.calendar_date());
        Ok(())
    }

    /// Delete a rule of either kind. Existing claims are kept.
    pub async fn delete_rule(&self, rule_id: &str) -> Result<bool, CommandError> {
        let deleted = self
            .rule_store()?
            .delete_rule(&RuleId::from_string(rule_id))
            .await?;
        info!("Delete rule {}: {}", rule_id, deleted);
        Ok(deleted)
    }

    /// Receive every committed `E` (streak changes, claims, completed
    /// tasks). Handler failures are logged and never fail the command that
    /// published the event.
    pub async fn subscribe<E, H>(&self, handler: H)
    where
        E: DomainEvent + 'static,
        H: EventHandler<E> + 'static,
    {
        self.runtime.event_bus.subscribe::<E, H>(handler).await;
    }

    pub async fn shutdown(&self) {
        self.runtime.db.close().await;
    }

    fn rule_store(&self) -> Result<&SqliteRewardCatalog, CommandError> {
        self.runtime.rule_store.as_deref().ok_or_else(|| {
            CommandError::validation("Reward rules are managed outside this engine")
        })
    }
}
