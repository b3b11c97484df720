use chrono::{DateTime, NaiveDate, Utc};
use hearth_domain::ledger::DayCategory;
use hearth_domain::reward::RewardSource;

use crate::application::commands::command_handler::Command;

/// Record a day in the user's ledger
#[derive(Debug, Clone)]
pub struct MarkDayCommand {
    pub user_id: String,
    pub date: NaiveDate,
    pub category: DayCategory,
}

impl Command for MarkDayCommand {}

/// Remove a day from the user's ledger
#[derive(Debug, Clone)]
pub struct UnmarkDayCommand {
    pub user_id: String,
    pub date: NaiveDate,
    pub category: DayCategory,
}

impl Command for UnmarkDayCommand {}

/// Claim one reward surfaced by the claimable list
#[derive(Debug, Clone)]
pub struct ClaimRewardCommand {
    pub user_id: String,
    pub source: RewardSource,
    pub source_key: String,
}

impl Command for ClaimRewardCommand {}

/// Create the streak counter of a new user
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    /// Generated when absent
    pub user_id: Option<String>,
}

impl Command for RegisterUserCommand {}

#[derive(Debug, Clone)]
pub struct RegisterUserResult {
    pub user_id: String,
    pub created: bool,
}

/// Re-run reconciliation for every known user
#[derive(Debug, Clone, Default)]
pub struct ReconcileAllCommand;

impl Command for ReconcileAllCommand {}

/// Announce a finished task; its day becomes a streak day
#[derive(Debug, Clone)]
pub struct CompleteTaskCommand {
    pub user_id: String,
    pub task_id: String,
    pub completed_at: DateTime<Utc>,
}

impl Command for CompleteTaskCommand {}
