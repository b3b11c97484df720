use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Source of "today" in the application's reference timezone.
///
/// Every component asks this for civil days; nothing else in the engine
/// converts instants to dates on its own.
pub trait ReferenceClock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Civil day of `instant` in the reference timezone.
    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate;
}

/// Clock pinned to a single day. Used for replays and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
    offset: FixedOffset,
}

impl FixedClock {
    /// Pinned clock whose reference timezone is UTC.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(today: NaiveDate, offset: FixedOffset) -> Self {
        Self { today, offset }
    }
}

impl ReferenceClock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_of_uses_offset() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let plus_eight = FixedOffset::east_opt(8 * 3600).unwrap();
        let clock = FixedClock::with_offset(today, plus_eight);

        // 20:00 UTC on Jan 31 is already Feb 1 at UTC+8
        let instant = Utc.with_ymd_and_hms(2024, 1, 31, 20, 0, 0).unwrap();
        assert_eq!(clock.day_of(instant), today);
        assert_eq!(FixedClock::new(today).day_of(instant), today.pred_opt().unwrap());
    }
}
