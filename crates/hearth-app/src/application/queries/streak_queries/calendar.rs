use chrono::{Datelike, NaiveDate};
use hearth_domain::ledger::{DayCategory, LedgerSnapshot};
use hearth_domain::shared::{DomainError, UserId};
use log::info;

use crate::application::dtos::{CalendarDayDto, MonthStatsDto, StreakCalendarDto, StreakStateDto};

/// First and last day of a month.
pub(super) fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), DomainError> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::Validation(format!("Invalid month: {}", month)));
    }

    let first_day = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::Validation(format!("Invalid year: {}", year)))?;
    let first_day_next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last_day = first_day_next_month
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| DomainError::Validation(format!("Invalid year: {}", year)))?;

    Ok((first_day, last_day))
}

/// Lay a ledger snapshot out as one month of calendar cells.
pub(super) fn build_calendar(
    user_id: &UserId,
    year: i32,
    month: u32,
    snapshot: &LedgerSnapshot,
    state: StreakStateDto,
    today: NaiveDate,
) -> Result<StreakCalendarDto, DomainError> {
    let (first_day, last_day) = month_bounds(year, month)?;

    let mut days = Vec::with_capacity(last_day.day() as usize);
    let mut streak_days = 0u32;
    let mut missed_days = 0u32;
    let mut frozen_days = 0u32;
    let mut elapsed_days = 0u32;

    for date in first_day.iter_days().take_while(|d| *d <= last_day) {
        let category = snapshot.category_of(date);
        match category {
            Some(DayCategory::Streak) => streak_days += 1,
            Some(DayCategory::Missed) => missed_days += 1,
            Some(DayCategory::Frozen) => frozen_days += 1,
            None => {}
        }
        if date <= today {
            elapsed_days += 1;
        }

        days.push(CalendarDayDto {
            date,
            category,
            is_today: date == today,
            is_future: date > today,
        });
    }

    let streak_rate = if elapsed_days > 0 {
        (streak_days as f64 / elapsed_days as f64) * 100.0
    } else {
        0.0
    };

    let dto = StreakCalendarDto {
        user_id: user_id.to_string(),
        year,
        month,
        days,
        month_stats: MonthStatsDto {
            total_days: last_day.day(),
            streak_days,
            missed_days,
            frozen_days,
            streak_rate,
        },
        state,
    };

    info!(
        "Calendar {:04}-{:02} for {}: streak={} missed={} frozen={} rate={:.2}%",
        year,
        month,
        user_id,
        dto.month_stats.streak_days,
        dto.month_stats.missed_days,
        dto.month_stats.frozen_days,
        dto.month_stats.streak_rate
    );

    Ok(dto)
}
