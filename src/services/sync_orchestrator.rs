use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::{StreamExt, stream::BoxStream};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    dao::{match_source::MatchSource, storage::StorageResult},
    services::fallback::fallback_matches,
    state::{
        feed::{MatchFeeds, MatchesUiState},
        matches::{Match, MatchCategory},
        polling::{PollingController, PollingPhase},
    },
};

/// How a call to [`SyncOrchestrator::start`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The initial refresh succeeded and the three category subscriptions are running.
    Subscribed,
    /// The initial refresh failed; every feed shows placeholder matches.
    FellBack,
    /// The session had already been started.
    AlreadyStarted,
}

/// Coordinates one sync session: initial load, category subscriptions and live polling.
///
/// Feeds never end up in [`MatchesUiState::Error`]: upstream failures and empty results are both
/// replaced by the placeholder list of the category.
pub struct SyncOrchestrator {
    source: Arc<dyn MatchSource>,
    feeds: MatchFeeds,
    polling: PollingController,
    started: AtomicBool,
    fell_back: AtomicBool,
    subscriptions: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncOrchestrator {
    pub fn new(source: Arc<dyn MatchSource>, polling_interval: Duration) -> Self {
        Self {
            polling: PollingController::new(source.clone(), polling_interval),
            source,
            feeds: MatchFeeds::new(),
            started: AtomicBool::new(false),
            fell_back: AtomicBool::new(false),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Read-only access to the category feeds.
    pub fn feeds(&self) -> &MatchFeeds {
        &self.feeds
    }

    pub fn polling(&self) -> &PollingController {
        &self.polling
    }

    /// Load the feeds once and subscribe to upstream changes.
    ///
    /// Only the first call does anything; later calls return [`StartOutcome::AlreadyStarted`].
    pub async fn start(&self) -> StartOutcome {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("sync session already started; ignoring start");
            return StartOutcome::AlreadyStarted;
        }

        for feed in self.feeds.iter() {
            feed.publish(MatchesUiState::Loading);
        }

        if let Err(err) = self.source.refresh().await {
            self.fell_back.store(true, Ordering::SeqCst);
            warn!(error = %err, "initial match refresh failed; showing placeholder matches");
            for feed in self.feeds.iter() {
                feed.publish(MatchesUiState::Success(fallback_matches(feed.category())));
            }
            return StartOutcome::FellBack;
        }

        let handles = MatchCategory::ALL
            .into_iter()
            .map(|category| {
                tokio::spawn(run_subscription(
                    self.source.observe(category),
                    self.feeds.clone(),
                    category,
                ))
            })
            .collect::<Vec<_>>();
        self.lock_subscriptions().extend(handles);

        info!("sync session started; subscribed to upcoming, live and closed matches");
        StartOutcome::Subscribed
    }

    /// Replace a session that fell back to placeholders with a fresh one.
    ///
    /// Returns `None` without touching the feeds when the current session is subscribed or has
    /// not been started. Polling is left as it is.
    pub async fn resume_after_fallback(&self) -> Option<StartOutcome> {
        if !self.fell_back.swap(false, Ordering::SeqCst) {
            return None;
        }
        info!("opening a new sync session after a placeholder start");
        self.cancel_subscriptions();
        self.started.store(false, Ordering::SeqCst);
        Some(self.start().await)
    }

    /// Start background refreshes of the live feed. No-op when already polling.
    pub fn start_polling(&self) -> bool {
        self.polling.start()
    }

    /// Stop background refreshes. No-op when idle.
    pub fn stop_polling(&self) -> bool {
        self.polling.stop()
    }

    pub fn polling_phase(&self) -> PollingPhase {
        self.polling.phase()
    }

    /// End the session: stop polling and cancel every subscription immediately.
    pub fn shutdown(&self) {
        self.polling.shutdown();
        self.cancel_subscriptions();
    }

    fn cancel_subscriptions(&self) {
        let handles = std::mem::take(&mut *self.lock_subscriptions());
        if !handles.is_empty() {
            debug!(count = handles.len(), "cancelling match subscriptions");
        }
        for handle in handles {
            handle.abort();
        }
    }

    fn lock_subscriptions(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SyncOrchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Feed state for one upstream update of `category`.
///
/// Non-empty lists pass through untouched; empty lists and failures fall back to placeholders.
pub fn resolve_update(category: MatchCategory, update: StorageResult<Vec<Match>>) -> MatchesUiState {
    match update {
        Ok(matches) if !matches.is_empty() => MatchesUiState::Success(matches),
        Ok(_) => {
            debug!(%category, "no matches upstream; showing placeholder matches");
            MatchesUiState::Success(fallback_matches(category))
        }
        Err(err) => {
            warn!(%category, error = %err, "match subscription reported an error; showing placeholder matches");
            MatchesUiState::Success(fallback_matches(category))
        }
    }
}

async fn run_subscription(
    mut updates: BoxStream<'static, StorageResult<Vec<Match>>>,
    feeds: MatchFeeds,
    category: MatchCategory,
) {
    while let Some(update) = updates.next().await {
        let state = resolve_update(category, update);
        if let MatchesUiState::Success(matches) = &state {
            debug!(%category, count = matches.len(), "match feed updated");
        }
        feeds.feed(category).publish(state);
    }
    debug!(%category, "match subscription ended");
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::AtomicUsize,
        time::SystemTime,
    };

    use futures::{future::BoxFuture, stream};
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    use super::*;
    use crate::{
        dao::{
            match_source::CachedMatchSource,
            match_store::memory::InMemoryMatchStore,
            models::{MatchEntity, MatchStatusEntity, ScoreEntity, TeamEntity, TournamentEntity},
            storage::StorageError,
        },
        services::fallback::{LIVE_PRIMARY_MAX_SCORE, LIVE_SECONDARY_MAX_SCORE},
        state::{
            matches::{MatchStatus, Team, Tournament},
            polling::{DEFAULT_POLLING_INTERVAL, tests::settle},
        },
    };

    type Updates = mpsc::UnboundedSender<StorageResult<Vec<Match>>>;

    /// Source whose refresh outcome is fixed and whose category streams are fed by the test.
    struct ScriptedSource {
        refresh_fails: bool,
        refreshes: AtomicUsize,
        streams: Mutex<HashMap<MatchCategory, mpsc::UnboundedReceiver<StorageResult<Vec<Match>>>>>,
    }

    impl ScriptedSource {
        fn new(refresh_fails: bool) -> (Arc<Self>, HashMap<MatchCategory, Updates>) {
            let mut senders = HashMap::new();
            let mut receivers = HashMap::new();
            for category in MatchCategory::ALL {
                let (tx, rx) = mpsc::unbounded_channel();
                senders.insert(category, tx);
                receivers.insert(category, rx);
            }
            let source = Arc::new(Self {
                refresh_fails,
                refreshes: AtomicUsize::new(0),
                streams: Mutex::new(receivers),
            });
            (source, senders)
        }
    }

    impl MatchSource for Arc<ScriptedSource> {
        fn refresh(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            let fails = self.refresh_fails;
            Box::pin(async move {
                if fails {
                    Err(StorageError::Degraded)
                } else {
                    Ok(())
                }
            })
        }

        fn observe(&self, category: MatchCategory) -> BoxStream<'static, StorageResult<Vec<Match>>> {
            match self.streams.lock().unwrap().remove(&category) {
                Some(rx) => UnboundedReceiverStream::new(rx).boxed(),
                None => stream::empty().boxed(),
            }
        }
    }

    fn real_match(id: &str, status: MatchStatus) -> Match {
        Match::new(
            id,
            Team {
                id: "c9".into(),
                name: "Cloud9".into(),
                logo: None,
            },
            Team {
                id: "eg".into(),
                name: "Evil Geniuses".into(),
                logo: None,
            },
            Tournament {
                id: "lcs".into(),
                name: "LCS".into(),
                game: "LOL".into(),
            },
            SystemTime::now(),
            status,
        )
    }

    fn ids(state: &MatchesUiState) -> Vec<String> {
        state
            .matches()
            .expect("feed should be in success state")
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }

    fn assert_fallback(feeds: &MatchFeeds) {
        assert_eq!(
            ids(&feeds.snapshot(MatchCategory::Upcoming)),
            ["mock-upcoming-1", "mock-upcoming-2"]
        );
        assert_eq!(
            ids(&feeds.snapshot(MatchCategory::Closed)),
            ["mock-closed-1", "mock-closed-2"]
        );

        let live = feeds.snapshot(MatchCategory::Live);
        assert_eq!(ids(&live), ["mock-live-1", "mock-live-2"]);
        let live = live.matches().unwrap();
        let first = live[0].score().unwrap();
        let second = live[1].score().unwrap();
        assert!(first.home <= LIVE_PRIMARY_MAX_SCORE && first.away <= LIVE_PRIMARY_MAX_SCORE);
        assert!(second.home <= LIVE_SECONDARY_MAX_SCORE && second.away <= LIVE_SECONDARY_MAX_SCORE);
    }

    async fn wait_loaded(feeds: &MatchFeeds) {
        for feed in feeds.iter() {
            let mut rx = feed.subscribe();
            rx.wait_for(|state| !state.is_loading()).await.unwrap();
        }
    }

    fn no_errors(feeds: &MatchFeeds) -> bool {
        feeds
            .iter()
            .all(|feed| !matches!(feed.snapshot(), MatchesUiState::Error(_)))
    }

    #[tokio::test]
    async fn failed_initial_refresh_falls_back_everywhere() {
        let (source, _senders) = ScriptedSource::new(true);
        let orchestrator = SyncOrchestrator::new(Arc::new(source.clone()), DEFAULT_POLLING_INTERVAL);

        assert_eq!(orchestrator.start().await, StartOutcome::FellBack);
        assert_fallback(orchestrator.feeds());
        assert!(no_errors(orchestrator.feeds()));
        assert_eq!(source.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_initial_refresh_does_not_subscribe() {
        let (source, senders) = ScriptedSource::new(true);
        let orchestrator = SyncOrchestrator::new(Arc::new(source), DEFAULT_POLLING_INTERVAL);
        orchestrator.start().await;

        senders[&MatchCategory::Live]
            .send(Ok(vec![real_match("real-live", MatchStatus::Live)]))
            .unwrap();
        settle().await;

        assert_eq!(
            ids(&orchestrator.feeds().snapshot(MatchCategory::Live)),
            ["mock-live-1", "mock-live-2"]
        );
    }

    #[tokio::test]
    async fn empty_upstream_converges_with_failure_path() {
        let store = InMemoryMatchStore::default();
        let source = CachedMatchSource::with_store(Arc::new(store));
        let orchestrator = SyncOrchestrator::new(Arc::new(source), DEFAULT_POLLING_INTERVAL);

        assert_eq!(orchestrator.start().await, StartOutcome::Subscribed);
        wait_loaded(orchestrator.feeds()).await;
        assert_fallback(orchestrator.feeds());
    }

    #[tokio::test]
    async fn non_empty_results_pass_through_unchanged() {
        let (source, senders) = ScriptedSource::new(false);
        let orchestrator = SyncOrchestrator::new(Arc::new(source), DEFAULT_POLLING_INTERVAL);
        assert_eq!(orchestrator.start().await, StartOutcome::Subscribed);

        let upcoming = vec![
            real_match("u1", MatchStatus::Scheduled),
            real_match("u2", MatchStatus::Scheduled),
            real_match("u3", MatchStatus::Scheduled),
        ];
        senders[&MatchCategory::Upcoming].send(Ok(upcoming.clone())).unwrap();
        senders[&MatchCategory::Live].send(Ok(Vec::new())).unwrap();
        senders[&MatchCategory::Closed]
            .send(Err(StorageError::Degraded))
            .unwrap();
        wait_loaded(orchestrator.feeds()).await;

        assert_eq!(
            orchestrator.feeds().snapshot(MatchCategory::Upcoming),
            MatchesUiState::Success(upcoming)
        );
        assert_eq!(
            ids(&orchestrator.feeds().snapshot(MatchCategory::Live)),
            ["mock-live-1", "mock-live-2"]
        );
        assert_eq!(
            ids(&orchestrator.feeds().snapshot(MatchCategory::Closed)),
            ["mock-closed-1", "mock-closed-2"]
        );
        assert!(no_errors(orchestrator.feeds()));
    }

    #[tokio::test]
    async fn later_updates_replace_earlier_ones() {
        let (source, senders) = ScriptedSource::new(false);
        let orchestrator = SyncOrchestrator::new(Arc::new(source), DEFAULT_POLLING_INTERVAL);
        orchestrator.start().await;

        let live = &senders[&MatchCategory::Live];
        live.send(Ok(vec![real_match("a", MatchStatus::Live)])).unwrap();
        live.send(Ok(vec![real_match("b", MatchStatus::Live)])).unwrap();
        settle().await;

        assert_eq!(ids(&orchestrator.feeds().snapshot(MatchCategory::Live)), ["b"]);
    }

    #[tokio::test]
    async fn start_runs_once_per_session() {
        let (source, _senders) = ScriptedSource::new(false);
        let orchestrator = SyncOrchestrator::new(Arc::new(source.clone()), DEFAULT_POLLING_INTERVAL);

        assert_eq!(orchestrator.start().await, StartOutcome::Subscribed);
        assert_eq!(orchestrator.start().await, StartOutcome::AlreadyStarted);
        assert_eq!(source.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_cancels_subscriptions() {
        let (source, senders) = ScriptedSource::new(false);
        let orchestrator = SyncOrchestrator::new(Arc::new(source), DEFAULT_POLLING_INTERVAL);
        orchestrator.start().await;
        orchestrator.shutdown();
        settle().await;

        let _ = senders[&MatchCategory::Closed].send(Ok(vec![real_match("late", MatchStatus::Finished)]));
        settle().await;

        assert!(orchestrator.feeds().snapshot(MatchCategory::Closed).is_loading());
        assert_eq!(orchestrator.polling_phase(), PollingPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_pushes_fresh_live_data_into_the_feed() {
        let store = InMemoryMatchStore::default();
        let source = CachedMatchSource::with_store(Arc::new(store.clone()));
        let orchestrator = SyncOrchestrator::new(Arc::new(source), DEFAULT_POLLING_INTERVAL);
        orchestrator.start().await;
        assert!(orchestrator.start_polling());
        settle().await;
        assert_eq!(
            ids(&orchestrator.feeds().snapshot(MatchCategory::Live)),
            ["mock-live-1", "mock-live-2"]
        );

        store.upsert(esl_final()).await;

        tokio::time::advance(DEFAULT_POLLING_INTERVAL).await;
        settle().await;

        assert_eq!(ids(&orchestrator.feeds().snapshot(MatchCategory::Live)), ["esl-final"]);
        assert!(orchestrator.stop_polling());
    }

    #[tokio::test]
    async fn store_connected_after_fallback_opens_a_fresh_session() {
        let source = CachedMatchSource::new();
        let orchestrator =
            SyncOrchestrator::new(Arc::new(source.clone()), DEFAULT_POLLING_INTERVAL);
        assert_eq!(orchestrator.start().await, StartOutcome::FellBack);
        assert_fallback(orchestrator.feeds());

        source
            .install_store(Arc::new(InMemoryMatchStore::new(vec![esl_final()])))
            .await;
        assert_eq!(
            orchestrator.resume_after_fallback().await,
            Some(StartOutcome::Subscribed)
        );
        wait_loaded(orchestrator.feeds()).await;

        assert_eq!(ids(&orchestrator.feeds().snapshot(MatchCategory::Live)), ["esl-final"]);
        assert_eq!(
            ids(&orchestrator.feeds().snapshot(MatchCategory::Upcoming)),
            ["mock-upcoming-1", "mock-upcoming-2"]
        );
        assert_eq!(orchestrator.resume_after_fallback().await, None);
    }

    #[tokio::test]
    async fn subscribed_session_is_not_reopened() {
        let (source, _senders) = ScriptedSource::new(false);
        let orchestrator = SyncOrchestrator::new(Arc::new(source.clone()), DEFAULT_POLLING_INTERVAL);
        orchestrator.start().await;

        assert_eq!(orchestrator.resume_after_fallback().await, None);
        assert_eq!(source.refreshes.load(Ordering::SeqCst), 1);
    }

    fn esl_final() -> MatchEntity {
        MatchEntity {
            id: "esl-final".into(),
            home_team: TeamEntity {
                id: "mouz".into(),
                name: "MOUZ".into(),
                logo: None,
            },
            away_team: TeamEntity {
                id: "spirit".into(),
                name: "Team Spirit".into(),
                logo: None,
            },
            tournament: TournamentEntity {
                id: "esl-pro-league".into(),
                name: "ESL Pro League".into(),
                game: "CS2".into(),
            },
            start_time: SystemTime::now(),
            status: MatchStatusEntity::Live,
            score: Some(ScoreEntity { home: 1, away: 0 }),
            streams: Vec::new(),
        }
    }
}
