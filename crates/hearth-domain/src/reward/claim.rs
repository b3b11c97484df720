use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{RewardPayload, RewardSource};
use crate::shared::{DomainError, RuleId, UserId};

/// The uniqueness key of a claim: at most one record per user and key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimKey {
    pub claim_date: NaiveDate,
    pub source: RewardSource,
    pub source_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    user_id: UserId,
    key: ClaimKey,
    payload: RewardPayload,
    claimed_at: DateTime<Utc>,
}

impl ClaimRecord {
    pub fn new(user_id: UserId, key: ClaimKey, payload: RewardPayload) -> Self {
        Self {
            user_id,
            key,
            payload,
            claimed_at: Utc::now(),
        }
    }

    pub fn restore(
        user_id: UserId,
        key: ClaimKey,
        payload: RewardPayload,
        claimed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            key,
            payload,
            claimed_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn key(&self) -> &ClaimKey {
        &self.key
    }

    pub fn payload(&self) -> &RewardPayload {
        &self.payload
    }

    pub fn claimed_at(&self) -> DateTime<Utc> {
        self.claimed_at
    }
}

/// Parsed form of the `source_key` string carried by claimable rewards.
///
/// Cycle rewards are keyed per milestone (`<rule_id>#<milestone>`) so each
/// multiple of the cycle is claimed separately; date rewards are keyed by
/// the rule id alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardSourceKey {
    Cycle { rule_id: RuleId, milestone: u32 },
    Date { rule_id: RuleId },
}

impl RewardSourceKey {
    const MILESTONE_SEPARATOR: char = '#';

    pub fn parse(source: RewardSource, source_key: &str) -> Result<Self, DomainError> {
        match source {
            RewardSource::CycleReward => {
                let (rule_id, milestone) = source_key
                    .rsplit_once(Self::MILESTONE_SEPARATOR)
                    .ok_or_else(|| {
                        DomainError::UnknownRule(format!(
                            "Malformed cycle reward key: {}",
                            source_key
                        ))
                    })?;
                let milestone = milestone.parse::<u32>().map_err(|_| {
                    DomainError::UnknownRule(format!("Malformed cycle reward key: {}", source_key))
                })?;
                if rule_id.is_empty() {
                    return Err(DomainError::UnknownRule(format!(
                        "Malformed cycle reward key: {}",
                        source_key
                    )));
                }
                Ok(RewardSourceKey::Cycle {
                    rule_id: RuleId::from_string(rule_id),
                    milestone,
                })
            }
            RewardSource::DateReward => {
                if source_key.is_empty() {
                    return Err(DomainError::UnknownRule(
                        "Empty date reward key".to_string(),
                    ));
                }
                Ok(RewardSourceKey::Date {
                    rule_id: RuleId::from_string(source_key),
                })
            }
        }
    }

    pub fn source(&self) -> RewardSource {
        match self {
            RewardSourceKey::Cycle { .. } => RewardSource::CycleReward,
            RewardSourceKey::Date { .. } => RewardSource::DateReward,
        }
    }

    pub fn rule_id(&self) -> &RuleId {
        match self {
            RewardSourceKey::Cycle { rule_id, .. } | RewardSourceKey::Date { rule_id } => rule_id,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            RewardSourceKey::Cycle { rule_id, milestone } => {
                format!("{}{}{}", rule_id, Self::MILESTONE_SEPARATOR, milestone)
            }
            RewardSourceKey::Date { rule_id } => rule_id.to_string(),
        }
    }
}
