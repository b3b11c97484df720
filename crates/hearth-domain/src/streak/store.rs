use async_trait::async_trait;

use super::StreakCounter;
use crate::shared::{DomainError, UserId};

/// Cached counter operations available inside a transaction.
#[async_trait]
pub trait StreakCounterStore: Send {
    async fn load_counter(&mut self, user_id: &UserId)
        -> Result<Option<StreakCounter>, DomainError>;

    /// Insert or overwrite the counter row.
    async fn save_counter(&mut self, counter: &StreakCounter) -> Result<(), DomainError>;
}
