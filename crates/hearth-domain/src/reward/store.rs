use async_trait::async_trait;
use std::collections::HashSet;

use super::{ClaimKey, ClaimRecord, RewardPayload};
use crate::shared::{DomainError, UserId};

/// Claim records and reward crediting, available inside a transaction.
#[async_trait]
pub trait ClaimLedger: Send {
    /// Keys of every claim the user has made.
    async fn claimed_keys(&mut self, user_id: &UserId) -> Result<HashSet<ClaimKey>, DomainError>;

    /// Insert the record. A duplicate key fails with
    /// [`DomainError::AlreadyClaimed`], detected by the store's constraint.
    async fn insert_claim(&mut self, claim: &ClaimRecord) -> Result<(), DomainError>;

    /// Credit a payload to the user's points balance or backpack.
    async fn credit(&mut self, user_id: &UserId, payload: &RewardPayload)
        -> Result<(), DomainError>;

    /// Claims of a user, newest first.
    async fn list_claims(&mut self, user_id: &UserId) -> Result<Vec<ClaimRecord>, DomainError>;
}
