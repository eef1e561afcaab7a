use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::polling::{PollingStatusResponse, PollingToggleResponse},
    services::feed_service,
    state::SharedState,
};

/// Live feed polling control.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/polling", get(polling_status))
        .route("/polling/start", post(start_polling))
        .route("/polling/stop", post(stop_polling))
}

/// Report whether the live feed is being polled.
#[utoipa::path(
    get,
    path = "/polling",
    tag = "polling",
    responses((status = 200, description = "Polling status", body = PollingStatusResponse))
)]
pub async fn polling_status(State(state): State<SharedState>) -> Json<PollingStatusResponse> {
    Json(feed_service::polling_status(&state))
}

#[utoipa::path(
    post,
    path = "/polling/start",
    tag = "polling",
    responses((status = 200, description = "Polling active", body = PollingToggleResponse))
)]
pub async fn start_polling(State(state): State<SharedState>) -> Json<PollingToggleResponse> {
    Json(feed_service::start_polling(&state))
}

#[utoipa::path(
    post,
    path = "/polling/stop",
    tag = "polling",
    responses((status = 200, description = "Polling idle", body = PollingToggleResponse))
)]
pub async fn stop_polling(State(state): State<SharedState>) -> Json<PollingToggleResponse> {
    Json(feed_service::stop_polling(&state))
}
