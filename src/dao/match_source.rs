//! Match source consumed by the sync core: an upstream [`MatchStore`] fronted by a local cache.

use std::sync::Arc;

use futures::{future::BoxFuture, stream::BoxStream};
use tokio::sync::{RwLock, watch};
use tracing::debug;

use crate::{
    dao::{
        match_store::MatchStore,
        storage::{StorageError, StorageResult},
    },
    state::matches::{Match, MatchCategory},
};

/// Remote match provider as seen by the sync core.
pub trait MatchSource: Send + Sync {
    /// Pull the latest matches from upstream into the local cache.
    fn refresh(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Stream the full current list for `category` on every change.
    ///
    /// Each `Ok` item replaces the previous one. The stream only ends when it is dropped or the
    /// source itself goes away.
    fn observe(&self, category: MatchCategory) -> BoxStream<'static, StorageResult<Vec<Match>>>;
}

/// [`MatchSource`] caching the last successful upstream fetch.
///
/// The upstream store is installed (and removed) at runtime by the storage supervisor; while
/// none is installed refreshes fail with [`StorageError::Degraded`] and subscribers keep
/// receiving the last cached lists.
#[derive(Clone)]
pub struct CachedMatchSource {
    inner: Arc<CachedMatchSourceInner>,
}

struct CachedMatchSourceInner {
    store: RwLock<Option<Arc<dyn MatchStore>>>,
    cache: watch::Sender<Option<Arc<Vec<Match>>>>,
}

impl CachedMatchSource {
    /// Create a source with no upstream installed and an empty cache.
    pub fn new() -> Self {
        Self::from_store(None)
    }

    /// Create a source already backed by `store`.
    pub fn with_store(store: Arc<dyn MatchStore>) -> Self {
        Self::from_store(Some(store))
    }

    fn from_store(store: Option<Arc<dyn MatchStore>>) -> Self {
        let (cache, _receiver) = watch::channel(None);
        Self {
            inner: Arc::new(CachedMatchSourceInner {
                store: RwLock::new(store),
                cache,
            }),
        }
    }

    /// Currently installed upstream store, if any.
    pub async fn store(&self) -> Option<Arc<dyn MatchStore>> {
        self.inner.store.read().await.clone()
    }

    /// Install a new upstream store.
    pub async fn install_store(&self, store: Arc<dyn MatchStore>) {
        *self.inner.store.write().await = Some(store);
    }

    /// Drop the upstream store; the cache is kept.
    pub async fn clear_store(&self) {
        self.inner.store.write().await.take();
    }

    pub async fn has_store(&self) -> bool {
        self.inner.store.read().await.is_some()
    }
}

impl Default for CachedMatchSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchSource for CachedMatchSource {
    fn refresh(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let store = inner
                .store
                .read()
                .await
                .clone()
                .ok_or(StorageError::Degraded)?;

            let mut matches = store
                .fetch_matches()
                .await?
                .into_iter()
                .map(Match::from)
                .collect::<Vec<_>>();
            matches.sort_by_key(|m| m.start_time);

            debug!(count = matches.len(), "match cache refreshed");
            inner.cache.send_replace(Some(Arc::new(matches)));
            Ok(())
        })
    }

    fn observe(&self, category: MatchCategory) -> BoxStream<'static, StorageResult<Vec<Match>>> {
        let mut receiver = self.inner.cache.subscribe();
        Box::pin(async_stream::stream! {
            loop {
                let snapshot = receiver.borrow_and_update().clone();
                if let Some(matches) = snapshot {
                    let filtered = matches
                        .iter()
                        .filter(|m| m.category() == category)
                        .cloned()
                        .collect::<Vec<_>>();
                    yield Ok::<_, StorageError>(filtered);
                }
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use futures::StreamExt;

    use super::*;
    use crate::dao::{
        match_store::memory::InMemoryMatchStore,
        models::{MatchEntity, MatchStatusEntity, TeamEntity, TournamentEntity},
    };

    fn entity(id: &str, status: MatchStatusEntity, start_offset_secs: u64) -> MatchEntity {
        MatchEntity {
            id: id.into(),
            home_team: TeamEntity {
                id: "prx".into(),
                name: "Paper Rex".into(),
                logo: None,
            },
            away_team: TeamEntity {
                id: "drx".into(),
                name: "DRX".into(),
                logo: None,
            },
            tournament: TournamentEntity {
                id: "vct-pacific".into(),
                name: "VCT Pacific".into(),
                game: "VALORANT".into(),
            },
            start_time: SystemTime::UNIX_EPOCH + Duration::from_secs(start_offset_secs),
            status,
            score: None,
            streams: Vec::new(),
        }
    }

    #[tokio::test]
    async fn refresh_without_store_is_degraded() {
        let source = CachedMatchSource::new();
        let err = source.refresh().await.unwrap_err();
        assert!(matches!(err, StorageError::Degraded));
    }

    #[tokio::test]
    async fn observe_emits_category_sorted_by_start_time() {
        let store = InMemoryMatchStore::new(vec![
            entity("late", MatchStatusEntity::Scheduled, 300),
            entity("live", MatchStatusEntity::Live, 50),
            entity("early", MatchStatusEntity::Scheduled, 100),
        ]);
        let source = CachedMatchSource::with_store(Arc::new(store));
        source.refresh().await.unwrap();

        let mut upcoming = source.observe(MatchCategory::Upcoming);
        let first = upcoming.next().await.unwrap().unwrap();
        let ids = first.iter().map(|m| m.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["early", "late"]);

        let mut closed = source.observe(MatchCategory::Closed);
        assert!(closed.next().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn observe_replays_each_refresh() {
        let store = InMemoryMatchStore::new(vec![entity("a", MatchStatusEntity::Live, 0)]);
        let source = CachedMatchSource::new();
        source.install_store(Arc::new(store.clone())).await;

        let mut live = source.observe(MatchCategory::Live);
        source.refresh().await.unwrap();
        assert_eq!(live.next().await.unwrap().unwrap().len(), 1);

        store
            .replace(vec![
                entity("a", MatchStatusEntity::Finished, 0),
                entity("b", MatchStatusEntity::Live, 10),
            ])
            .await;
        source.refresh().await.unwrap();

        let update = live.next().await.unwrap().unwrap();
        assert_eq!(update.len(), 1);
        assert_eq!(update[0].id, "b");
    }

    #[tokio::test]
    async fn clearing_store_keeps_cache() {
        let store = InMemoryMatchStore::new(vec![entity("a", MatchStatusEntity::Live, 0)]);
        let source = CachedMatchSource::with_store(Arc::new(store));
        source.refresh().await.unwrap();
        source.clear_store().await;

        assert!(!source.has_store().await);
        assert!(source.refresh().await.is_err());
        let mut live = source.observe(MatchCategory::Live);
        assert_eq!(live.next().await.unwrap().unwrap().len(), 1);
    }
}
