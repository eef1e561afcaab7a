pub mod feed;
pub mod matches;
pub mod polling;
mod sse;

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::AppConfig,
    dao::{match_source::CachedMatchSource, match_store::MatchStore},
    error::ServiceError,
    services::{
        reminder_service::{SystemClock, TokioReminderScheduler},
        sse_events::SseReminderSink,
        sync_orchestrator::SyncOrchestrator,
    },
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Central application state: the match source, the sync session, reminders and the SSE hub.
pub struct AppState {
    config: AppConfig,
    source: CachedMatchSource,
    sync: SyncOrchestrator,
    reminders: TokioReminderScheduler,
    sse: SseHub,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let source = CachedMatchSource::new();
        let sse = SseHub::new(config.sse_capacity());
        let reminders = TokioReminderScheduler::with_clock(
            Arc::new(SseReminderSink::new(sse.clone())),
            Arc::new(SystemClock),
            config.reminder_lead_time(),
        );

        Arc::new(Self {
            sync: SyncOrchestrator::new(Arc::new(source.clone()), config.polling_interval()),
            source,
            reminders,
            sse,
            degraded: degraded_tx,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Match source shared by the sync session and the storage supervisor.
    pub fn source(&self) -> &CachedMatchSource {
        &self.source
    }

    /// The sync session driving the three match feeds.
    pub fn sync(&self) -> &SyncOrchestrator {
        &self.sync
    }

    pub fn reminders(&self) -> &TokioReminderScheduler {
        &self.reminders
    }

    /// Broadcast hub used for the match SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Obtain a handle to the current match store, if one is installed.
    pub async fn match_store(&self) -> Option<Arc<dyn MatchStore>> {
        self.source.store().await
    }

    /// Current match store, or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_match_store(&self) -> Result<Arc<dyn MatchStore>, ServiceError> {
        self.match_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new match store implementation and leave degraded mode.
    pub async fn install_match_store(&self, store: Arc<dyn MatchStore>) {
        self.source.install_store(store).await;
        self.update_degraded(false);
    }

    /// Remove the current match store and enter degraded mode.
    pub async fn clear_match_store(&self) {
        self.source.clear_store().await;
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Tear the sync session down and drop every pending reminder.
    pub fn shutdown(&self) {
        self.sync.shutdown();
        self.reminders.shutdown();
    }
}
