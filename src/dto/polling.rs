use serde::Serialize;
use utoipa::ToSchema;

/// Current polling state of the live feed.
#[derive(Debug, Serialize, ToSchema)]
pub struct PollingStatusResponse {
    /// True while the live feed is refreshed in the background.
    pub active: bool,
    pub interval_ms: u64,
}

/// Result of a start/stop request.
#[derive(Debug, Serialize, ToSchema)]
pub struct PollingToggleResponse {
    pub active: bool,
    /// False when the controller was already in the requested state.
    pub changed: bool,
}
