use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{match_store::MatchStore, models::MatchEntity, storage::StorageResult};

/// Process-local [`MatchStore`] used when no database backend is configured.
#[derive(Clone, Default)]
pub struct InMemoryMatchStore {
    matches: Arc<RwLock<Vec<MatchEntity>>>,
}

impl InMemoryMatchStore {
    pub fn new(matches: Vec<MatchEntity>) -> Self {
        Self {
            matches: Arc::new(RwLock::new(matches)),
        }
    }

    /// Replace the stored records.
    pub async fn replace(&self, matches: Vec<MatchEntity>) {
        *self.matches.write().await = matches;
    }

    /// Insert a record or replace the one sharing its id.
    pub async fn upsert(&self, entity: MatchEntity) {
        let mut guard = self.matches.write().await;
        match guard.iter_mut().find(|existing| existing.id == entity.id) {
            Some(existing) => *existing = entity,
            None => guard.push(entity),
        }
    }
}

impl MatchStore for InMemoryMatchStore {
    fn fetch_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let matches = self.matches.clone();
        Box::pin(async move { Ok(matches.read().await.clone()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
