use chrono::NaiveDate;
use hearth_domain::ledger::DayCategory;
use hearth_domain::shared::UserId;
use hearth_domain::streak::StreakState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStateDto {
    pub user_id: String,
    pub streak_days: u32,
    pub last_streak_date: Option<NaiveDate>,
    pub consecutive_missed_days: u32,
    pub is_streak_today: bool,
}

impl StreakStateDto {
    pub fn from_state(user_id: &UserId, state: &StreakState, today: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            streak_days: state.streak_days,
            last_streak_date: state.last_streak_date,
            consecutive_missed_days: state.consecutive_missed_days,
            is_streak_today: state.is_streak_on(today),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDayDto {
    pub date: NaiveDate,
    pub category: Option<DayCategory>,
    pub is_today: bool,
    pub is_future: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStatsDto {
    pub total_days: u32,
    pub streak_days: u32,
    pub missed_days: u32,
    pub frozen_days: u32,
    /// Streak days over elapsed days of the month, 0.0 - 100.0
    pub streak_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakCalendarDto {
    pub user_id: String,
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDayDto>,
    pub month_stats: MonthStatsDto,
    pub state: StreakStateDto,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileAllResultDto {
    pub users: usize,
    pub changed: usize,
    pub pruned_dates: u64,
    pub failed: Vec<String>,
}
