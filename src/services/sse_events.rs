use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    dto::{
        matches::FeedStateResponse,
        sse::{FeedUpdatedEvent, PollingChangedEvent, ReminderDueEvent, ServerEvent},
    },
    services::reminder_service::ReminderSink,
    state::{SharedState, SseHub},
};

pub(crate) const EVENT_FEED_UPDATED: &str = "feed.updated";
const EVENT_REMINDER_DUE: &str = "reminder.due";
const EVENT_POLLING_CHANGED: &str = "polling.changed";

/// Forward feed and polling changes onto the SSE hub until the state goes away.
pub fn spawn_broadcasters(state: &SharedState) -> Vec<JoinHandle<()>> {
    let mut handles = state
        .sync()
        .feeds()
        .iter()
        .map(|feed| {
            let category = feed.category();
            let mut receiver = feed.subscribe();
            let hub = state.sse().clone();
            tokio::spawn(async move {
                while receiver.changed().await.is_ok() {
                    let snapshot = receiver.borrow_and_update().clone();
                    let payload = FeedUpdatedEvent(FeedStateResponse::new(category, &snapshot));
                    send_event(&hub, EVENT_FEED_UPDATED, &payload);
                }
                debug!(%category, "feed broadcaster stopped");
            })
        })
        .collect::<Vec<_>>();

    let mut phases = state.sync().polling().watch_phase();
    let hub = state.sse().clone();
    handles.push(tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let active = phases.borrow_and_update().is_active();
            send_event(&hub, EVENT_POLLING_CHANGED, &PollingChangedEvent { active });
        }
        debug!("polling broadcaster stopped");
    }));

    handles
}

/// [`ReminderSink`] publishing `reminder.due` events on the match stream.
pub struct SseReminderSink {
    hub: SseHub,
}

impl SseReminderSink {
    pub fn new(hub: SseHub) -> Self {
        Self { hub }
    }
}

impl ReminderSink for SseReminderSink {
    fn reminder_due(&self, match_id: &str) {
        let payload = ReminderDueEvent {
            match_id: match_id.to_string(),
        };
        send_event(&self.hub, EVENT_REMINDER_DUE, &payload);
    }
}

fn send_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
