use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{
        match_source::MatchSource,
        match_store::MatchStore,
        storage::StorageError,
    },
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep a match store installed in the shared state, falling back to degraded mode while it is
/// unreachable.
///
/// Each successful (re)connection primes the match cache with a refresh. A sync session that had
/// started on placeholders is replaced by a fresh one once a store is installed.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn MatchStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_match_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                prime_cache(&state).await;
                resume_sync(&state).await;
                delay = INITIAL_DELAY;

                loop {
                    match store.health_check().await {
                        Ok(()) => {
                            if state.is_degraded() {
                                info!("storage healthy again; leaving degraded mode");
                                state.update_degraded(false);
                            }
                            sleep(HEALTH_POLL_INTERVAL).await;
                        }
                        Err(err) => {
                            warn!(error = %err, "storage health check failed");
                            if reconnect(&state, store.as_ref()).await {
                                state.update_degraded(false);
                                prime_cache(&state).await;
                                sleep(HEALTH_POLL_INTERVAL).await;
                                continue;
                            }

                            warn!("exhausted storage reconnect attempts; staying in degraded mode");
                            state.clear_match_store().await;
                            break;
                        }
                    }
                }

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

async fn reconnect(state: &SharedState, store: &dyn MatchStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(reconnect_err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %reconnect_err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %reconnect_err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

async fn prime_cache(state: &SharedState) {
    if let Err(err) = state.source().refresh().await {
        warn!(error = %err, "failed to refresh matches after connecting storage");
    }
}

async fn resume_sync(state: &SharedState) {
    if let Some(outcome) = state.sync().resume_after_fallback().await {
        info!(?outcome, "sync session reopened after storage connected");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            match_store::memory::InMemoryMatchStore,
            models::{MatchEntity, MatchStatusEntity, TeamEntity, TournamentEntity},
            storage::StorageResult,
        },
        services::sync_orchestrator::StartOutcome,
        state::{AppState, matches::MatchCategory},
    };

    #[derive(Default)]
    struct FlakyStore {
        unhealthy: AtomicBool,
        reconnects: AtomicUsize,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    impl MatchStore for Arc<FlakyStore> {
        fn fetch_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            let unhealthy = self.unhealthy.load(Ordering::SeqCst);
            Box::pin(async move {
                if unhealthy {
                    Err(StorageError::unavailable("ping failed".into(), Refused))
                } else {
                    Ok(())
                }
            })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.reconnects.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(StorageError::unavailable("reconnect failed".into(), Refused)) })
        }
    }

    async fn wait_degraded(state: &SharedState, expected: bool) {
        let mut watcher = state.degraded_watcher();
        tokio::time::timeout(Duration::from_secs(120), watcher.wait_for(|d| *d == expected))
            .await
            .expect("degraded flag did not change in time")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn installs_store_and_primes_the_cache() {
        let state = AppState::new(AppConfig::default());
        let store = InMemoryMatchStore::default();
        let supervisor = tokio::spawn(run(state.clone(), move || {
            let store = store.clone();
            async move { Ok(Arc::new(store) as Arc<dyn MatchStore>) }
        }));

        wait_degraded(&state, false).await;
        assert!(state.source().has_store().await);

        supervisor.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_reconnects_clear_the_store() {
        let state = AppState::new(AppConfig::default());
        let flaky = Arc::new(FlakyStore::default());
        let connects = Arc::new(AtomicUsize::new(0));

        let supervisor = tokio::spawn(run(state.clone(), {
            let flaky = flaky.clone();
            let connects = connects.clone();
            move || {
                let attempt = connects.fetch_add(1, Ordering::SeqCst);
                let flaky = flaky.clone();
                async move {
                    if attempt == 0 {
                        Ok(Arc::new(flaky) as Arc<dyn MatchStore>)
                    } else {
                        Err(StorageError::unavailable("connect failed".into(), Refused))
                    }
                }
            }
        }));

        wait_degraded(&state, false).await;
        flaky.unhealthy.store(true, Ordering::SeqCst);
        wait_degraded(&state, true).await;

        let mut watcher = state.degraded_watcher();
        tokio::time::timeout(Duration::from_secs(120), async {
            while state.source().has_store().await {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        })
        .await
        .expect("store was not cleared");

        assert_eq!(flaky.reconnects.load(Ordering::SeqCst), MAX_RECONNECT_ATTEMPTS as usize);
        assert!(*watcher.borrow_and_update());
        supervisor.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn late_store_replaces_placeholder_session() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(state.sync().start().await, StartOutcome::FellBack);

        let store = InMemoryMatchStore::new(vec![MatchEntity {
            id: "blast-final".into(),
            home_team: TeamEntity {
                id: "navi".into(),
                name: "Natus Vincere".into(),
                logo: None,
            },
            away_team: TeamEntity {
                id: "faze".into(),
                name: "FaZe Clan".into(),
                logo: None,
            },
            tournament: TournamentEntity {
                id: "blast".into(),
                name: "BLAST Premier".into(),
                game: "CS2".into(),
            },
            start_time: std::time::SystemTime::now(),
            status: MatchStatusEntity::Live,
            score: None,
            streams: Vec::new(),
        }]);
        let supervisor = tokio::spawn(run(state.clone(), move || {
            let store = store.clone();
            async move { Ok(Arc::new(store) as Arc<dyn MatchStore>) }
        }));

        let mut live = state.sync().feeds().feed(MatchCategory::Live).subscribe();
        tokio::time::timeout(
            Duration::from_secs(120),
            live.wait_for(|feed| {
                feed.matches()
                    .is_some_and(|matches| matches.iter().any(|m| m.id == "blast-final"))
            }),
        )
        .await
        .expect("real matches never replaced the placeholders")
        .unwrap();

        supervisor.abort();
    }
}
