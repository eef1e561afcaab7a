use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/matches",
    tag = "sse",
    responses((status = 200, description = "Match feed SSE stream (feed.updated, reminder.due, polling.changed, info)", content_type = "text/event-stream", body = String))
)]
/// Stream feed updates, fired reminders and polling changes to connected clients.
pub async fn match_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    info!(subscribers = state.sse().subscriber_count(), "New match SSE connection");
    sse_service::broadcast_info(state.sse(), "match stream connected");
    sse_service::to_sse_stream(sse_service::initial_events(&state), receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/matches", get(match_stream))
}
