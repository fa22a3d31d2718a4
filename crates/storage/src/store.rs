use async_trait::async_trait;
use tournament::store::StoreResult;
use tournament::{Participant, PredictionKey, PredictionStore, PredictionValue, Scope, StoreError};
use uuid::Uuid;

use crate::Database;
use crate::error::StorageError;
use crate::repository::participant::ParticipantRepository;
use crate::repository::prediction::PredictionRepository;

/// Postgres-backed prediction store over the `predictions` and
/// `participants` tables.
#[derive(Clone)]
pub struct PgPredictionStore {
    db: Database,
}

impl PgPredictionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn predictions(&self) -> PredictionRepository<'_> {
        PredictionRepository::new(self.db.pool())
    }

    fn participants(&self) -> ParticipantRepository<'_> {
        ParticipantRepository::new(self.db.pool())
    }
}

#[async_trait]
impl PredictionStore for PgPredictionStore {
    async fn get(&self, scope: &Scope, key: &PredictionKey) -> StoreResult<Option<PredictionValue>> {
        let row = self
            .predictions()
            .find(&scope.to_string(), &key.to_string())
            .await?;
        match row {
            Some(row) => Ok(Some(row.decode()?.1)),
            None => Ok(None),
        }
    }

    async fn set(&self, scope: &Scope, key: &PredictionKey, value: &PredictionValue) -> StoreResult<()> {
        self.predictions()
            .upsert(&scope.to_string(), &key.to_string(), value)
            .await?;
        Ok(())
    }

    async fn delete(&self, scope: &Scope, key: &PredictionKey) -> StoreResult<bool> {
        Ok(self
            .predictions()
            .delete(&scope.to_string(), &key.to_string())
            .await?)
    }

    async fn compare_and_swap(
        &self,
        scope: &Scope,
        key: &PredictionKey,
        expected: Option<&PredictionValue>,
        new: Option<&PredictionValue>,
    ) -> StoreResult<bool> {
        Ok(self
            .predictions()
            .compare_and_swap(&scope.to_string(), &key.to_string(), expected, new)
            .await?)
    }

    async fn entries(&self, scope: &Scope) -> StoreResult<Vec<(PredictionKey, PredictionValue)>> {
        let rows = self.predictions().list_scope(&scope.to_string()).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match row.decode() {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Skipping prediction row in {}: {}", scope, e),
            }
        }
        Ok(entries)
    }

    async fn clear_scope(&self, scope: &Scope) -> StoreResult<u64> {
        Ok(self.predictions().delete_scope(&scope.to_string()).await?)
    }

    async fn create_participant(&self, name: &str) -> StoreResult<Participant> {
        match self.participants().create(name).await {
            Ok(row) => Ok(row.into()),
            Err(e) if e.is_unique_violation() => {
                Err(StoreError::DuplicateParticipant(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        let rows = self.participants().list().await?;
        Ok(rows.into_iter().map(Participant::from).collect())
    }

    async fn get_participant(&self, id: &str) -> StoreResult<Option<Participant>> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        match self.participants().find_by_id(id).await {
            Ok(row) => Ok(Some(row.into())),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
