use chrono::{DateTime, NaiveDate, Utc};
use hearth_domain::reward::{ClaimRecord, ClaimableReward, RewardPayload, RewardSource};
use hearth_infrastructure::persistence::repositories::BackpackItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimableRewardDto {
    pub source: RewardSource,
    pub source_key: String,
    pub claim_date: NaiveDate,
    pub payload: RewardPayload,
}

impl From<ClaimableReward> for ClaimableRewardDto {
    fn from(reward: ClaimableReward) -> Self {
        Self {
            source: reward.source,
            source_key: reward.source_key,
            claim_date: reward.claim_date,
            payload: reward.payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResultDto {
    pub user_id: String,
    pub source: RewardSource,
    pub source_key: String,
    pub claim_date: NaiveDate,
    pub credited_payload: RewardPayload,
}

impl From<&ClaimRecord> for ClaimResultDto {
    fn from(record: &ClaimRecord) -> Self {
        Self {
            user_id: record.user_id().to_string(),
            source: record.key().source,
            source_key: record.key().source_key.clone(),
            claim_date: record.key().claim_date,
            credited_payload: record.payload().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecordDto {
    pub source: RewardSource,
    pub source_key: String,
    pub claim_date: NaiveDate,
    pub payload: RewardPayload,
    pub claimed_at: DateTime<Utc>,
}

impl From<ClaimRecord> for ClaimRecordDto {
    fn from(record: ClaimRecord) -> Self {
        Self {
            source: record.key().source,
            source_key: record.key().source_key.clone(),
            claim_date: record.key().claim_date,
            payload: record.payload().clone(),
            claimed_at: record.claimed_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDto {
    pub user_id: String,
    pub points: i64,
    pub items: Vec<BackpackItem>,
}
