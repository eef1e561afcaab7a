use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::matches::{FeedStateResponse, MatchesResponse},
    error::AppError,
    services::feed_service,
    state::SharedState,
};

/// Read-only access to the match feeds.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches", get(list_feeds))
        .route("/matches/{category}", get(get_feed))
}

/// Snapshot every category feed.
#[utoipa::path(
    get,
    path = "/matches",
    tag = "matches",
    responses((status = 200, description = "Upcoming, live and closed feeds", body = MatchesResponse))
)]
pub async fn list_feeds(State(state): State<SharedState>) -> Json<MatchesResponse> {
    Json(feed_service::all_feeds(&state))
}

/// Snapshot a single category feed.
#[utoipa::path(
    get,
    path = "/matches/{category}",
    tag = "matches",
    params(("category" = String, Path, description = "`upcoming`, `live` or `closed`")),
    responses(
        (status = 200, description = "Feed state", body = FeedStateResponse),
        (status = 404, description = "Unknown category")
    )
)]
pub async fn get_feed(
    State(state): State<SharedState>,
    Path(category): Path<String>,
) -> Result<Json<FeedStateResponse>, AppError> {
    Ok(Json(feed_service::feed(&state, &category)?))
}
