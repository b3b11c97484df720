mod conflict_retry;
mod consistency_maintainer;
mod reward_evaluator;


pub use conflict_retry::{retry_on_conflict, CONFLICT_ATTEMPTS};
pub use consistency_maintainer::{ConsistencyMaintainer, ReconcileOutcome};
pub use reward_evaluator::{ResolvedClaim, RewardEligibilityEvaluator, RuleSet};
