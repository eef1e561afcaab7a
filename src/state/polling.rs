use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, warn};

use crate::dao::match_source::MatchSource;

/// Period between two background refreshes of the live feed.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(15_000);

/// Externally visible state of the polling controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingPhase {
    /// No polling loop is running.
    Idle,
    /// A polling loop refreshes the source on every interval.
    Active,
}

impl PollingPhase {
    pub fn is_active(self) -> bool {
        self == PollingPhase::Active
    }
}

enum PollingState {
    Idle,
    Active(ActiveLoop),
}

struct ActiveLoop {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives periodic refreshes of the match source while active.
///
/// Refresh failures are logged and the loop carries on at the same interval. Dropping the
/// controller tears the loop down.
pub struct PollingController {
    source: Arc<dyn MatchSource>,
    period: Duration,
    state: Mutex<PollingState>,
    phase: watch::Sender<PollingPhase>,
}

impl PollingController {
    pub fn new(source: Arc<dyn MatchSource>, period: Duration) -> Self {
        let (phase, _receiver) = watch::channel(PollingPhase::Idle);
        Self {
            source,
            period,
            state: Mutex::new(PollingState::Idle),
            phase,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn phase(&self) -> PollingPhase {
        *self.phase.borrow()
    }

    /// Subscribe to Idle/Active changes.
    pub fn watch_phase(&self) -> watch::Receiver<PollingPhase> {
        self.phase.subscribe()
    }

    /// Idle → Active. Returns `false` (and does nothing) when a loop is already running.
    pub fn start(&self) -> bool {
        let mut state = self.lock_state();
        if matches!(*state, PollingState::Active(_)) {
            debug!("polling already active; ignoring start");
            return false;
        }

        let (stop, stop_rx) = oneshot::channel();
        let first_tick = Instant::now() + self.period;
        let handle = tokio::spawn(run_polling_loop(
            self.source.clone(),
            first_tick,
            self.period,
            stop_rx,
        ));

        *state = PollingState::Active(ActiveLoop { stop, handle });
        self.phase.send_replace(PollingPhase::Active);
        info!(period_ms = self.period.as_millis() as u64, "live polling started");
        true
    }

    /// Active → Idle. A pending wait is cancelled; a refresh already in flight completes but no
    /// further cycle is scheduled. Returns `false` when already idle.
    pub fn stop(&self) -> bool {
        let mut state = self.lock_state();
        let PollingState::Active(active) = std::mem::replace(&mut *state, PollingState::Idle)
        else {
            return false;
        };

        let _ = active.stop.send(());
        self.phase.send_replace(PollingPhase::Idle);
        info!("live polling stopped");
        true
    }

    /// Stop polling and abort the loop immediately, including any refresh in flight.
    pub fn shutdown(&self) {
        let mut state = self.lock_state();
        if let PollingState::Active(active) = std::mem::replace(&mut *state, PollingState::Idle) {
            active.handle.abort();
            self.phase.send_replace(PollingPhase::Idle);
            debug!("live polling aborted");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PollingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_polling_loop(
    source: Arc<dyn MatchSource>,
    first_tick: Instant,
    period: Duration,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        cycle += 1;
        match source.refresh().await {
            Ok(()) => debug!(cycle, "live polling refresh completed"),
            Err(err) => warn!(cycle, error = %err, "live polling refresh failed; retrying next interval"),
        }
    }

    debug!(cycles = cycle, "polling loop exited");
}
