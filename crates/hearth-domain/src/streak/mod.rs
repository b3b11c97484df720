mod counter;
mod policy;
mod recompute;
mod store;

#[cfg(test)]
mod recompute_test;

pub use counter::{StreakCounter, StreakState};
pub use policy::StreakPolicy;
pub use recompute::{recompute, RecomputedStreak};
pub use store::StreakCounterStore;
