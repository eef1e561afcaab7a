use indexmap::IndexMap;

use crate::{
    dto::{
        matches::{FeedStateResponse, MatchesResponse},
        polling::{PollingStatusResponse, PollingToggleResponse},
    },
    error::ServiceError,
    state::{SharedState, matches::MatchCategory},
};

/// Snapshot of every category feed.
pub fn all_feeds(state: &SharedState) -> MatchesResponse {
    let feeds = state
        .sync()
        .feeds()
        .iter()
        .map(|feed| {
            (
                feed.category().to_string(),
                FeedStateResponse::new(feed.category(), &feed.snapshot()),
            )
        })
        .collect::<IndexMap<_, _>>();
    MatchesResponse { feeds }
}

/// Snapshot of the feed named `category`.
pub fn feed(state: &SharedState, category: &str) -> Result<FeedStateResponse, ServiceError> {
    let category = category.parse::<MatchCategory>()?;
    Ok(FeedStateResponse::new(
        category,
        &state.sync().feeds().snapshot(category),
    ))
}

pub fn polling_status(state: &SharedState) -> PollingStatusResponse {
    let polling = state.sync().polling();
    PollingStatusResponse {
        active: polling.phase().is_active(),
        interval_ms: polling.period().as_millis() as u64,
    }
}

/// Start polling the live feed. Starting an active controller changes nothing.
pub fn start_polling(state: &SharedState) -> PollingToggleResponse {
    let changed = state.sync().start_polling();
    PollingToggleResponse {
        active: true,
        changed,
    }
}

/// Stop polling the live feed. Stopping an idle controller changes nothing.
pub fn stop_polling(state: &SharedState) -> PollingToggleResponse {
    let changed = state.sync().stop_polling();
    PollingToggleResponse {
        active: false,
        changed,
    }
}
