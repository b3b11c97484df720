mod reward_dto;
mod streak_dto;

pub use reward_dto::{ClaimRecordDto, ClaimResultDto, ClaimableRewardDto, WalletDto};
pub use streak_dto::{
    CalendarDayDto, MonthStatsDto, ReconcileAllResultDto, StreakCalendarDto, StreakStateDto,
};
