use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use hearth_domain::shared::{DomainError, ReferenceClock};

/// Wall clock in a fixed civil offset from UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetClock {
    offset: FixedOffset,
}

impl FixedOffsetClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build from an offset in minutes east of UTC (e.g. `480` for UTC+8).
    pub fn from_minutes(minutes: i32) -> Result<Self, DomainError> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                DomainError::Validation(format!("UTC offset out of range: {} minutes", minutes))
            })?;
        Ok(Self::new(offset))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl ReferenceClock for FixedOffsetClock {
    fn today(&self) -> NaiveDate {
        self.day_of(Utc::now())
    }

    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}
