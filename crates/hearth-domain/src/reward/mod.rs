mod catalog;
mod claim;
mod eligibility;
mod rules;
mod store;


pub use catalog::RewardCatalog;
pub use claim::{ClaimKey, ClaimRecord, RewardSourceKey};
pub use eligibility::{claimable_rewards, milestone_date, validate_claim, ClaimableReward};
pub use rules::{DateRewardRule, RewardCycleRule, RewardPayload, RewardSource};
pub use store::ClaimLedger;
