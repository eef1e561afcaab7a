use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::matches::FeedStateResponse;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Create an event whose data is already rendered.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever a category feed publishes a new state.
pub struct FeedUpdatedEvent(pub FeedStateResponse);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a reminder fires for a match.
pub struct ReminderDueEvent {
    pub match_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when live polling starts or stops.
pub struct PollingChangedEvent {
    pub active: bool,
}
