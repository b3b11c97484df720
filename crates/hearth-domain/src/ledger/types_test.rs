#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::shared::{DomainError, UserId};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_streak_today_is_allowed() {
        let today = day(2024, 3, 10);
        let entry = DateLedgerEntry::new(UserId::new(), today, DayCategory::Streak, today);
        assert!(entry.is_ok());
    }

    #[test]
    fn test_missed_or_frozen_today_is_rejected() {
        let today = day(2024, 3, 10);

        for category in [DayCategory::Missed, DayCategory::Frozen] {
            let result = DateLedgerEntry::new(UserId::new(), today, category, today);
            match result {
                Err(DomainError::InvalidDate(msg)) => assert!(msg.contains("in progress")),
                other => panic!("Expected InvalidDate for {category}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_yesterday_can_be_missed_or_frozen() {
        let today = day(2024, 3, 10);
        let yesterday = day(2024, 3, 9);

        for category in DayCategory::ALL {
            assert!(DateLedgerEntry::new(UserId::new(), yesterday, category, today).is_ok());
        }
    }

    #[test]
    fn test_future_dates_are_rejected() {
        let today = day(2024, 3, 10);
        let tomorrow = day(2024, 3, 11);

        let result = DateLedgerEntry::new(UserId::new(), tomorrow, DayCategory::Streak, today);
        assert!(matches!(result, Err(DomainError::InvalidDate(_))));
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in DayCategory::ALL {
            let parsed: DayCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert!("holiday".parse::<DayCategory>().is_err());
    }

    #[test]
    fn test_snapshot_keeps_sets_disjoint() {
        let d = day(2024, 3, 5);
        let mut snapshot = LedgerSnapshot::default();

        snapshot.insert(d, DayCategory::Missed);
        snapshot.insert(d, DayCategory::Frozen);

        assert_eq!(snapshot.category_of(d), Some(DayCategory::Frozen));
        assert!(snapshot.missed.is_empty());
        assert_eq!(snapshot.frozen.len(), 1);
    }

    #[test]
    fn test_snapshot_from_entries() {
        let snapshot = LedgerSnapshot::from_entries([
            (day(2024, 3, 1), DayCategory::Streak),
            (day(2024, 3, 2), DayCategory::Frozen),
            (day(2024, 3, 3), DayCategory::Missed),
        ]);

        assert_eq!(snapshot.category_of(day(2024, 3, 1)), Some(DayCategory::Streak));
        assert_eq!(snapshot.category_of(day(2024, 3, 2)), Some(DayCategory::Frozen));
        assert_eq!(snapshot.category_of(day(2024, 3, 3)), Some(DayCategory::Missed));
        assert_eq!(snapshot.category_of(day(2024, 3, 4)), None);
        assert!(!snapshot.is_empty());
    }
}
