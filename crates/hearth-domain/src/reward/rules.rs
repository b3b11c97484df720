use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::{DomainError, RuleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSource {
    CycleReward,
    DateReward,
}

impl RewardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardSource::CycleReward => "cycle_reward",
            RewardSource::DateReward => "date_reward",
        }
    }
}

impl fmt::Display for RewardSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cycle_reward" => Ok(RewardSource::CycleReward),
            "date_reward" => Ok(RewardSource::DateReward),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown reward source: {}",
                other
            ))),
        }
    }
}

/// What a claim credits through the points/backpack collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "reward_type", rename_all = "snake_case")]
pub enum RewardPayload {
    Points { amount: i64 },
    Item { item_key: String, quantity: u32 },
}

impl RewardPayload {
    pub fn reward_type(&self) -> &'static str {
        match self {
            RewardPayload::Points { .. } => "points",
            RewardPayload::Item { .. } => "item",
        }
    }

    /// Rebuild from the flat column layout used by the rule and claim tables.
    pub fn from_columns(
        reward_type: &str,
        points: Option<i64>,
        item_key: Option<String>,
        quantity: Option<i64>,
    ) -> Result<Self, DomainError> {
        match reward_type {
            "points" => {
                let amount = points.ok_or_else(|| {
                    DomainError::DataIntegrity("Points reward without amount".to_string())
                })?;
                Ok(RewardPayload::Points { amount })
            }
            "item" => {
                let item_key = item_key.ok_or_else(|| {
                    DomainError::DataIntegrity("Item reward without item_key".to_string())
                })?;
                let quantity = u32::try_from(quantity.unwrap_or(1)).map_err(|_| {
                    DomainError::DataIntegrity(format!("Invalid item quantity for {}", item_key))
                })?;
                Ok(RewardPayload::Item { item_key, quantity })
            }
            other => Err(DomainError::DataIntegrity(format!(
                "Unknown reward type: {}",
                other
            ))),
        }
    }

    pub fn points(&self) -> Option<i64> {
        match self {
            RewardPayload::Points { amount } => Some(*amount),
            RewardPayload::Item { .. } => None,
        }
    }

    pub fn item(&self) -> Option<(&str, u32)> {
        match self {
            RewardPayload::Item { item_key, quantity } => Some((item_key.as_str(), *quantity)),
            RewardPayload::Points { .. } => None,
        }
    }
}

/// Reward granted every time the run reaches a multiple of `cycle_days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCycleRule {
    id: RuleId,
    cycle_days: u32,
    payload: RewardPayload,
}

impl RewardCycleRule {
    pub fn new(id: RuleId, cycle_days: u32, payload: RewardPayload) -> Result<Self, DomainError> {
        if cycle_days == 0 {
            return Err(DomainError::Validation(
                "Cycle length must be at least one day".to_string(),
            ));
        }

        Ok(Self {
            id,
            cycle_days,
            payload,
        })
    }

    pub fn id(&self) -> &RuleId {
        &self.id
    }

    pub fn cycle_days(&self) -> u32 {
        self.cycle_days
    }

    pub fn payload(&self) -> &RewardPayload {
        &self.payload
    }

    pub fn is_milestone(&self, streak_days: u32) -> bool {
        streak_days > 0 && streak_days % self.cycle_days == 0
    }

    /// Every positive multiple of the cycle up to and including `streak_days`.
    pub fn milestones_up_to(&self, streak_days: u32) -> impl Iterator<Item = u32> + '_ {
        (1..=streak_days / self.cycle_days).map(move |k| k * self.cycle_days)
    }
}

/// Reward tied to one calendar date being the last day the run was extended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRewardRule {
    id: RuleId,
    calendar_date: NaiveDate,
    payload: RewardPayload,
}

impl DateRewardRule {
    pub fn new(id: RuleId, calendar_date: NaiveDate, payload: RewardPayload) -> Self {
        Self {
            id,
            calendar_date,
            payload,
        }
    }

    pub fn id(&self) -> &RuleId {
        &self.id
    }

    pub fn calendar_date(&self) -> NaiveDate {
        self.calendar_date
    }

    pub fn payload(&self) -> &RewardPayload {
        &self.payload
    }
}
