//! One-shot match reminders firing a fixed lead time before kick-off.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use dashmap::DashMap;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        reminders::{
            CancelRemindersResponse, ReminderJobDto, ReminderSetResponse,
            ScheduleReminderRequest, ScheduleReminderResponse,
        },
        validation::validate_match_id,
    },
    error::ServiceError,
    state::SharedState,
};

/// Default interval between a reminder firing and the start of its match.
pub const DEFAULT_REMINDER_LEAD_TIME: Duration = Duration::from_secs(60 * 60);

/// Source of wall-clock time used to compute reminder delays.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// [`Clock`] backed by [`SystemTime::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Receives the match id of every reminder that fires.
pub trait ReminderSink: Send + Sync {
    fn reminder_due(&self, match_id: &str);
}

/// A reminder registered for a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderJob {
    pub id: Uuid,
    pub match_id: String,
    /// Wall-clock instant the reminder fires at.
    pub fire_at: SystemTime,
    /// Delay computed when the job was registered.
    pub delay: Duration,
}

/// Deferred notification scheduling keyed by match id.
pub trait ReminderScheduler: Send + Sync {
    /// Register a reminder firing one lead time before `start`.
    ///
    /// Returns `None` without registering anything when that instant is not in the future.
    /// Scheduling twice for the same match registers two jobs.
    fn schedule(&self, match_id: &str, start: SystemTime) -> Option<ReminderJob>;

    /// Cancel every job registered for `match_id`, returning how many were cancelled.
    fn cancel(&self, match_id: &str) -> usize;
}

struct ScheduledJob {
    job: ReminderJob,
    handle: AbortHandle,
}

type JobRegistry = DashMap<String, Vec<ScheduledJob>>;

/// [`ReminderScheduler`] running each job as a sleeping tokio task.
pub struct TokioReminderScheduler {
    jobs: Arc<JobRegistry>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ReminderSink>,
    lead_time: Duration,
}

impl TokioReminderScheduler {
    pub fn with_clock(
        sink: Arc<dyn ReminderSink>,
        clock: Arc<dyn Clock>,
        lead_time: Duration,
    ) -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
            clock,
            sink,
            lead_time,
        }
    }

    pub fn lead_time(&self) -> Duration {
        self.lead_time
    }

    /// Match ids with at least one outstanding job, sorted.
    pub fn reminder_set(&self) -> Vec<String> {
        let mut ids = self
            .jobs
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// Outstanding jobs for `match_id`, in registration order.
    pub fn jobs_for(&self, match_id: &str) -> Vec<ReminderJob> {
        self.jobs
            .get(match_id)
            .map(|jobs| jobs.iter().map(|scheduled| scheduled.job.clone()).collect())
            .unwrap_or_default()
    }

    /// Cancel every outstanding job.
    pub fn shutdown(&self) {
        let ids = self
            .jobs
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        for id in ids {
            self.cancel(&id);
        }
    }
}

impl ReminderScheduler for TokioReminderScheduler {
    fn schedule(&self, match_id: &str, start: SystemTime) -> Option<ReminderJob> {
        let now = self.clock.now();
        let delay = start
            .checked_sub(self.lead_time)
            .and_then(|fire_at| fire_at.duration_since(now).ok())
            .filter(|delay| !delay.is_zero());
        let Some(delay) = delay else {
            debug!(match_id, "reminder time already passed; nothing scheduled");
            return None;
        };

        let job = ReminderJob {
            id: Uuid::new_v4(),
            match_id: match_id.to_string(),
            fire_at: now + delay,
            delay,
        };

        // The entry guard is held until the job is registered so it cannot fire unregistered.
        let mut entry = self.jobs.entry(match_id.to_string()).or_default();
        let handle = tokio::spawn(run_job(
            self.jobs.clone(),
            self.sink.clone(),
            job.match_id.clone(),
            job.id,
            delay,
        ));
        entry.push(ScheduledJob {
            job: job.clone(),
            handle: handle.abort_handle(),
        });

        info!(match_id, job_id = %job.id, delay_secs = delay.as_secs(), "reminder scheduled");
        Some(job)
    }

    fn cancel(&self, match_id: &str) -> usize {
        let Some((_, jobs)) = self.jobs.remove(match_id) else {
            return 0;
        };
        for scheduled in &jobs {
            scheduled.handle.abort();
        }
        if !jobs.is_empty() {
            info!(match_id, count = jobs.len(), "reminders cancelled");
        }
        jobs.len()
    }
}

impl Drop for TokioReminderScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_job(
    jobs: Arc<JobRegistry>,
    sink: Arc<dyn ReminderSink>,
    match_id: String,
    job_id: Uuid,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    if let Some(mut entry) = jobs.get_mut(&match_id) {
        entry.retain(|scheduled| scheduled.job.id != job_id);
    }
    jobs.remove_if(&match_id, |_, remaining| remaining.is_empty());

    debug!(match_id, %job_id, "reminder fired");
    sink.reminder_due(&match_id);
}

/// Schedule a reminder for a validated request.
pub fn schedule_for_match(
    state: &SharedState,
    request: &ScheduleReminderRequest,
) -> Result<ScheduleReminderResponse, ServiceError> {
    let start = request
        .start()
        .ok_or_else(|| ServiceError::InvalidInput("start_time must be RFC 3339".into()))?;
    let job = state.reminders().schedule(&request.match_id, start);
    Ok(ScheduleReminderResponse {
        scheduled: job.is_some(),
        job: job
            .map(ReminderJobDto::try_from)
            .transpose()
            .map_err(|err| ServiceError::InvalidInput(err.to_string()))?,
    })
}

/// Every match with pending reminders and the jobs behind them.
pub fn list_reminders(state: &SharedState) -> ReminderSetResponse {
    let reminders = state.reminders();
    let match_ids = reminders.reminder_set();
    let jobs = match_ids
        .iter()
        .flat_map(|id| reminders.jobs_for(id))
        .filter_map(|job| {
            let (match_id, job_id) = (job.match_id.clone(), job.id);
            ReminderJobDto::try_from(job)
                .inspect_err(|err| warn!(match_id = %match_id, %job_id, error = %err, "skipping reminder"))
                .ok()
        })
        .collect();
    ReminderSetResponse {
        lead_time_secs: reminders.lead_time().as_secs(),
        match_ids,
        jobs,
    }
}

/// Cancel the reminders of `match_id`, which must pass the same checks as a schedule request.
pub fn cancel_for_match(
    state: &SharedState,
    match_id: &str,
) -> Result<CancelRemindersResponse, ServiceError> {
    validate_match_id(match_id).map_err(|err| {
        ServiceError::InvalidInput(
            err.message
                .map(|message| message.into_owned())
                .unwrap_or_else(|| err.code.into_owned()),
        )
    })?;
    Ok(CancelRemindersResponse {
        match_id: match_id.to_string(),
        cancelled: state.reminders().cancel(match_id),
    })
}
