use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::shared::{DomainError, UserId};

/// Classification of one calendar day in a user's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCategory {
    Streak,
    Missed,
    Frozen,
}

impl DayCategory {
    pub const ALL: [DayCategory; 3] = [DayCategory::Streak, DayCategory::Missed, DayCategory::Frozen];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayCategory::Streak => "streak",
            DayCategory::Missed => "missed",
            DayCategory::Frozen => "frozen",
        }
    }

    /// Missed and frozen describe a day after the fact.
    pub fn is_retrospective(&self) -> bool {
        matches!(self, DayCategory::Missed | DayCategory::Frozen)
    }
}

impl fmt::Display for DayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "streak" => Ok(DayCategory::Streak),
            "missed" => Ok(DayCategory::Missed),
            "frozen" => Ok(DayCategory::Frozen),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown day category: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateLedgerEntry {
    user_id: UserId,
    date: NaiveDate,
    category: DayCategory,
}

impl DateLedgerEntry {
    /// Build an entry that is about to be written.
    ///
    /// `today` is the current reference-timezone day. Future days cannot be
    /// recorded at all, and today cannot be declared missed or frozen while
    /// it is still in progress.
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        category: DayCategory,
        today: NaiveDate,
    ) -> Result<Self, DomainError> {
        if date > today {
            return Err(DomainError::InvalidDate(format!(
                "{} is in the future (today is {})",
                date, today
            )));
        }
        if date == today && category.is_retrospective() {
            return Err(DomainError::InvalidDate(format!(
                "Today ({}) cannot be marked {} while it is still in progress",
                date, category
            )));
        }

        Ok(Self {
            user_id,
            date,
            category,
        })
    }

    pub fn restore(user_id: UserId, date: NaiveDate, category: DayCategory) -> Self {
        Self {
            user_id,
            date,
            category,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> DayCategory {
        self.category
    }
}

/// The three disjoint date sets of one user, as read inside a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub streak: BTreeSet<NaiveDate>,
    pub missed: BTreeSet<NaiveDate>,
    pub frozen: BTreeSet<NaiveDate>,
}

impl LedgerSnapshot {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, DayCategory)>,
    {
        let mut snapshot = Self::default();
        for (date, category) in entries {
            snapshot.insert(date, category);
        }
        snapshot
    }

    /// Insert keeping the sets disjoint: the last write for a date wins.
    pub fn insert(&mut self, date: NaiveDate, category: DayCategory) {
        self.streak.remove(&date);
        self.missed.remove(&date);
        self.frozen.remove(&date);
        self.set_mut(category).insert(date);
    }

    pub fn category_of(&self, date: NaiveDate) -> Option<DayCategory> {
        DayCategory::ALL
            .into_iter()
            .find(|category| self.set(*category).contains(&date))
    }

    pub fn set(&self, category: DayCategory) -> &BTreeSet<NaiveDate> {
        match category {
            DayCategory::Streak => &self.streak,
            DayCategory::Missed => &self.missed,
            DayCategory::Frozen => &self.frozen,
        }
    }

    fn set_mut(&mut self, category: DayCategory) -> &mut BTreeSet<NaiveDate> {
        match category {
            DayCategory::Streak => &mut self.streak,
            DayCategory::Missed => &mut self.missed,
            DayCategory::Frozen => &mut self.frozen,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.streak.is_empty() && self.missed.is_empty() && self.frozen.is_empty()
    }
}
