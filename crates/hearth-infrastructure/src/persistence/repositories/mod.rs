mod claim_repo;
mod counter_repo;
mod in_memory_catalog;
mod ledger_repo;
mod reward_catalog_repo;
mod wallet_repo;

pub use in_memory_catalog::InMemoryRewardCatalog;
pub use reward_catalog_repo::SqliteRewardCatalog;
pub use wallet_repo::{BackpackItem, SqliteWalletRepository};

use hearth_domain::reward::RewardPayload;

/// Flat column layout of a [`RewardPayload`], shared by the rule and claim
/// tables: `(reward_type, points, item_key, quantity)`.
pub(crate) struct PayloadColumns {
    pub reward_type: &'static str,
    pub points: Option<i64>,
    pub item_key: Option<String>,
    pub quantity: Option<i64>,
}

impl From<&RewardPayload> for PayloadColumns {
    fn from(payload: &RewardPayload) -> Self {
        match payload {
            RewardPayload::Points { amount } => Self {
                reward_type: payload.reward_type(),
                points: Some(*amount),
                item_key: None,
                quantity: None,
            },
            RewardPayload::Item { item_key, quantity } => Self {
                reward_type: payload.reward_type(),
                points: None,
                item_key: Some(item_key.clone()),
                quantity: Some(i64::from(*quantity)),
            },
        }
    }
}
