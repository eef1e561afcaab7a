use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether the live feed is currently being polled.
    pub polling: bool,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(polling: bool) -> Self {
        Self {
            status: "ok".to_string(),
            polling,
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(polling: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            polling,
        }
    }
}
