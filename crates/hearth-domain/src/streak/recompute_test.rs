#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::ledger::{DayCategory, LedgerSnapshot};
    use chrono::{Duration, NaiveDate};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(entries: &[(NaiveDate, DayCategory)]) -> LedgerSnapshot {
        LedgerSnapshot::from_entries(entries.iter().copied())
    }

    #[test]
    fn test_empty_ledger() {
        let result = recompute(&LedgerSnapshot::default(), day(2024, 1, 10), &StreakPolicy::default());

        assert_eq!(result.state, StreakState::default());
        assert_eq!(result.run_start, None);
        assert_eq!(result.keep_from, None);
        assert!(!result.reset);
    }

    #[test]
    fn test_freeze_bridges_gap() {
        let d = day(2024, 6, 20);
        let ledger = snapshot(&[
            (d - Duration::days(4), DayCategory::Streak),
            (d - Duration::days(3), DayCategory::Streak),
            (d - Duration::days(2), DayCategory::Frozen),
            (d - Duration::days(1), DayCategory::Streak),
            (d, DayCategory::Streak),
        ]);

        let result = recompute(&ledger, d, &StreakPolicy::default());

        assert_eq!(result.state.streak_days, 5);
        assert_eq!(result.state.last_streak_date, Some(d));
        assert_eq!(result.run_start, Some(d - Duration::days(4)));
    }

    #[test]
    fn test_missed_day_breaks_run() {
        let d = day(2024, 6, 20);
        let ledger = snapshot(&[
            (d - Duration::days(4), DayCategory::Streak),
            (d - Duration::days(3), DayCategory::Streak),
            (d - Duration::days(2), DayCategory::Missed),
            (d - Duration::days(1), DayCategory::Streak),
            (d, DayCategory::Streak),
        ]);

        let result = recompute(&ledger, d, &StreakPolicy::default());

        assert_eq!(result.state.streak_days, 2);
        assert_eq!(result.keep_from, Some(d - Duration::days(1)));
        assert_eq!(result.stale_streak_dates(&ledger), 2);
    }

    #[test]
    fn test_unrecorded_day_breaks_run() {
        let d = day(2024, 6, 20);
        let ledger = snapshot(&[
            (d - Duration::days(3), DayCategory::Streak),
            (d - Duration::days(1), DayCategory::Streak),
            (d, DayCategory::Streak),
        ]);

        let result = recompute(&ledger, d, &StreakPolicy::default());
        assert_eq!(result.state.streak_days, 2);
    }

    #[test]
    fn test_mixed_gap_only_counts_trailing_segment() {
        // streak, frozen, missed, frozen, streak: the missed day splits the gap
        let d = day(2024, 6, 20);
        let ledger = snapshot(&[
            (d - Duration::days(4), DayCategory::Streak),
            (d - Duration::days(3), DayCategory::Frozen),
            (d - Duration::days(2), DayCategory::Missed),
            (d - Duration::days(1), DayCategory::Frozen),
            (d, DayCategory::Streak),
        ]);

        let result = recompute(&ledger, d, &StreakPolicy::default());

        assert_eq!(result.state.streak_days, 2);
        assert_eq!(result.run_start, Some(d - Duration::days(1)));
    }

    #[test]
    fn test_frozen_cap_limits_bridging() {
        let d = day(2024, 6, 20);
        let ledger = snapshot(&[
            (d - Duration::days(3), DayCategory::Streak),
            (d - Duration::days(2), DayCategory::Frozen),
            (d - Duration::days(1), DayCategory::Frozen),
            (d, DayCategory::Streak),
        ]);

        let uncapped = recompute(&ledger, d, &StreakPolicy::default());
        assert_eq!(uncapped.state.streak_days, 4);

        let capped_policy = StreakPolicy::new(3, Some(1)).unwrap();
        let capped = recompute(&ledger, d, &capped_policy);
        assert_eq!(capped.state.streak_days, 2);
    }

    #[test]
    fn test_consecutive_missed_skips_frozen_days() {
        let last = day(2024, 6, 10);
        let today = day(2024, 6, 14);
        let ledger = snapshot(&[
            (last, DayCategory::Streak),
            (day(2024, 6, 11), DayCategory::Missed),
            (day(2024, 6, 12), DayCategory::Frozen),
            // 13th unrecorded, 14th is today and not counted
        ]);

        let result = recompute(&ledger, today, &StreakPolicy::default());

        assert_eq!(result.state.consecutive_missed_days, 2);
        assert_eq!(result.state.streak_days, 1);
        assert!(!result.reset);
    }

    #[test]
    fn test_no_missed_days_when_last_streak_is_yesterday_or_today() {
        let today = day(2024, 6, 14);
        for last in [today, day(2024, 6, 13)] {
            let ledger = snapshot(&[(last, DayCategory::Streak)]);
            let result = recompute(&ledger, today, &StreakPolicy::default());
            assert_eq!(result.state.consecutive_missed_days, 0);
        }
    }

    #[test]
    fn test_reset_threshold_breaks_run() {
        let last = day(2024, 6, 10);
        let today = day(2024, 6, 14); // 11, 12, 13 unrecorded
        let ledger = snapshot(&[
            (day(2024, 6, 8), DayCategory::Streak),
            (day(2024, 6, 9), DayCategory::Streak),
            (last, DayCategory::Streak),
        ]);

        let result = recompute(&ledger, today, &StreakPolicy::default());

        assert!(result.reset);
        assert_eq!(result.state.streak_days, 0);
        assert_eq!(result.state.consecutive_missed_days, 3);
        assert_eq!(result.state.last_streak_date, Some(last));
        assert_eq!(result.keep_from, Some(last));
        assert_eq!(result.stale_streak_dates(&ledger), 2);
    }

    #[test]
    fn test_frozen_days_postpone_reset() {
        let last = day(2024, 6, 10);
        let today = day(2024, 6, 14);
        let ledger = snapshot(&[
            (day(2024, 6, 9), DayCategory::Streak),
            (last, DayCategory::Streak),
            (day(2024, 6, 12), DayCategory::Frozen),
        ]);

        let result = recompute(&ledger, today, &StreakPolicy::default());

        assert!(!result.reset);
        assert_eq!(result.state.consecutive_missed_days, 2);
        assert_eq!(result.state.streak_days, 2);
    }

    #[test]
    fn test_pruning_count_after_break() {
        let today = day(2024, 3, 20);
        let mut entries: Vec<(NaiveDate, DayCategory)> = (0..8)
            .map(|i| (day(2024, 3, 1) + Duration::days(i), DayCategory::Streak))
            .collect();
        entries.push((day(2024, 3, 19), DayCategory::Streak));
        entries.push((today, DayCategory::Streak));
        let ledger = snapshot(&entries);
        assert_eq!(ledger.streak.len(), 10);

        let result = recompute(&ledger, today, &StreakPolicy::default());

        assert_eq!(result.state.streak_days, 2);
        assert_eq!(result.stale_streak_dates(&ledger), 8);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let d = day(2024, 1, 5);
        let ledger = snapshot(&[
            (day(2024, 1, 1), DayCategory::Streak),
            (day(2024, 1, 2), DayCategory::Streak),
            (day(2024, 1, 3), DayCategory::Frozen),
            (day(2024, 1, 4), DayCategory::Streak),
            (d, DayCategory::Streak),
        ]);

        let first = recompute(&ledger, d, &StreakPolicy::default());
        let second = recompute(&ledger, d, &StreakPolicy::default());
        assert_eq!(first, second);
    }
}
