pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Participant, PredictionKey, PredictionValue, Scope};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Participant '{0}' already exists")]
    DuplicateParticipant(String),

    #[error("Corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key-value store of predictions, scoped per participant or `official`.
///
/// Only authoritative inputs live here: match scores and slot records.
/// Standings and resolved pairs are always derived.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn get(&self, scope: &Scope, key: &PredictionKey) -> StoreResult<Option<PredictionValue>>;

    async fn set(&self, scope: &Scope, key: &PredictionKey, value: &PredictionValue) -> StoreResult<()>;

    /// Returns whether a value was removed.
    async fn delete(&self, scope: &Scope, key: &PredictionKey) -> StoreResult<bool>;

    /// Atomically replaces the value under `key` if it currently equals
    /// `expected` (`None` meaning absent). Writing `None` deletes.
    async fn compare_and_swap(
        &self,
        scope: &Scope,
        key: &PredictionKey,
        expected: Option<&PredictionValue>,
        new: Option<&PredictionValue>,
    ) -> StoreResult<bool>;

    /// Every entry of a scope, read as one consistent snapshot.
    async fn entries(&self, scope: &Scope) -> StoreResult<Vec<(PredictionKey, PredictionValue)>>;

    /// Deletes every entry of a scope and returns how many were removed.
    async fn clear_scope(&self, scope: &Scope) -> StoreResult<u64>;

    async fn create_participant(&self, name: &str) -> StoreResult<Participant>;

    async fn list_participants(&self) -> StoreResult<Vec<Participant>>;

    async fn get_participant(&self, id: &str) -> StoreResult<Option<Participant>>;
}
