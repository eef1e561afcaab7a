use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod matches;
pub mod polling;
pub mod reminders;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(matches::router())
        .merge(reminders::router())
        .merge(polling::router())
        .merge(sse::router());

    api_router.merge(docs::router()).with_state(state)
}
