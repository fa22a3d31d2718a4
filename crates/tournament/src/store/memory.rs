use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{PredictionStore, StoreError, StoreResult};
use crate::models::{Participant, PredictionKey, PredictionValue, Scope};

#[derive(Default)]
struct Inner {
    scopes: HashMap<Scope, BTreeMap<PredictionKey, PredictionValue>>,
    participants: Vec<Participant>,
    next_id: u64,
}

/// Process-local store used by tests, the CLI and deployments without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictionStore for MemoryStore {
    async fn get(&self, scope: &Scope, key: &PredictionKey) -> StoreResult<Option<PredictionValue>> {
        let inner = self.inner.read().await;
        Ok(inner.scopes.get(scope).and_then(|entries| entries.get(key)).cloned())
    }

    async fn set(&self, scope: &Scope, key: &PredictionKey, value: &PredictionValue) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .scopes
            .entry(scope.clone())
            .or_default()
            .insert(key.clone(), value.clone());
        Ok(())
    }

    async fn delete(&self, scope: &Scope, key: &PredictionKey) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .scopes
            .get_mut(scope)
            .and_then(|entries| entries.remove(key))
            .is_some())
    }

    async fn compare_and_swap(
        &self,
        scope: &Scope,
        key: &PredictionKey,
        expected: Option<&PredictionValue>,
        new: Option<&PredictionValue>,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let entries = inner.scopes.entry(scope.clone()).or_default();
        if entries.get(key) != expected {
            return Ok(false);
        }
        match new {
            Some(value) => {
                entries.insert(key.clone(), value.clone());
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(true)
    }

    async fn entries(&self, scope: &Scope) -> StoreResult<Vec<(PredictionKey, PredictionValue)>> {
        let inner = self.inner.read().await;
        Ok(inner
            .scopes
            .get(scope)
            .map(|entries| entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn clear_scope(&self, scope: &Scope) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .scopes
            .remove(scope)
            .map(|entries| entries.len() as u64)
            .unwrap_or(0))
    }

    async fn create_participant(&self, name: &str) -> StoreResult<Participant> {
        let mut inner = self.inner.write().await;
        if inner.participants.iter().any(|p| p.name == name) {
            return Err(StoreError::DuplicateParticipant(name.to_string()));
        }
        inner.next_id += 1;
        let participant = Participant {
            id: format!("p{}", inner.next_id),
            name: name.to_string(),
        };
        inner.participants.push(participant.clone());
        Ok(participant)
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        Ok(self.inner.read().await.participants.clone())
    }

    async fn get_participant(&self, id: &str) -> StoreResult<Option<Participant>> {
        let inner = self.inner.read().await;
        Ok(inner.participants.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchId, Score};

    fn key() -> PredictionKey {
        PredictionKey::Match(MatchId::new("México", "Sudáfrica"))
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let store = MemoryStore::new();
        let value = PredictionValue::Score(Score::new(2, 1));
        store.set(&Scope::Official, &key(), &value).await.unwrap();

        assert_eq!(store.get(&Scope::Official, &key()).await.unwrap(), Some(value));
        assert_eq!(store.get(&Scope::participant("p1"), &key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let store = MemoryStore::new();
        let first = PredictionValue::Score(Score::new(1, 0));
        let second = PredictionValue::Score(Score::new(0, 0));
        let scope = Scope::Official;

        assert!(store.compare_and_swap(&scope, &key(), None, Some(&first)).await.unwrap());
        assert!(!store.compare_and_swap(&scope, &key(), None, Some(&second)).await.unwrap());
        assert!(store
            .compare_and_swap(&scope, &key(), Some(&first), Some(&second))
            .await
            .unwrap());
        assert!(store.compare_and_swap(&scope, &key(), Some(&second), None).await.unwrap());
        assert!(!store.delete(&scope, &key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_participants_have_unique_names() {
        let store = MemoryStore::new();
        let ana = store.create_participant("Ana").await.unwrap();

        assert!(matches!(
            store.create_participant("Ana").await,
            Err(StoreError::DuplicateParticipant(_))
        ));
        assert_eq!(store.get_participant(&ana.id).await.unwrap(), Some(ana));
        assert_eq!(store.list_participants().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_scope_counts_entries() {
        let store = MemoryStore::new();
        let scope = Scope::participant("p1");
        store
            .set(&scope, &key(), &PredictionValue::Score(Score::new(0, 3)))
            .await
            .unwrap();

        assert_eq!(store.clear_scope(&scope).await.unwrap(), 1);
        assert!(store.entries(&scope).await.unwrap().is_empty());
    }
}
