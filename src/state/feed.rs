use std::sync::Arc;

use tokio::sync::watch;

use crate::state::matches::{Match, MatchCategory};

/// Load status of one category feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchesUiState {
    /// A refresh cycle is in progress and no result has been published yet.
    Loading,
    /// Latest list for the category.
    Success(Vec<Match>),
    /// The feed could not be loaded.
    Error(String),
}

impl MatchesUiState {
    /// Matches carried by a success state, if any.
    pub fn matches(&self) -> Option<&[Match]> {
        match self {
            MatchesUiState::Success(matches) => Some(matches),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, MatchesUiState::Loading)
    }
}

/// Observable holder of one category's state.
///
/// Only the sync orchestrator publishes into a feed; everyone else reads snapshots or
/// subscribes to changes.
pub struct MatchFeed {
    category: MatchCategory,
    sender: watch::Sender<MatchesUiState>,
}

impl MatchFeed {
    fn new(category: MatchCategory) -> Self {
        let (sender, _receiver) = watch::channel(MatchesUiState::Loading);
        Self { category, sender }
    }

    pub fn category(&self) -> MatchCategory {
        self.category
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> MatchesUiState {
        self.sender.borrow().clone()
    }

    /// Receiver notified on every published state.
    pub fn subscribe(&self) -> watch::Receiver<MatchesUiState> {
        self.sender.subscribe()
    }

    pub(crate) fn publish(&self, state: MatchesUiState) {
        self.sender.send_replace(state);
    }
}

/// The three category feeds of a sync session.
#[derive(Clone)]
pub struct MatchFeeds {
    inner: Arc<[MatchFeed; 3]>,
}

impl MatchFeeds {
    /// Create the feeds, all starting in [`MatchesUiState::Loading`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MatchCategory::ALL.map(MatchFeed::new)),
        }
    }

    /// Feed for the given category.
    pub fn feed(&self, category: MatchCategory) -> &MatchFeed {
        let index = match category {
            MatchCategory::Upcoming => 0,
            MatchCategory::Live => 1,
            MatchCategory::Closed => 2,
        };
        &self.inner[index]
    }

    /// Snapshot of the given category.
    pub fn snapshot(&self, category: MatchCategory) -> MatchesUiState {
        self.feed(category).snapshot()
    }

    /// Iterate the feeds in display order.
    pub fn iter(&self) -> impl Iterator<Item = &MatchFeed> {
        self.inner.iter()
    }
}

impl Default for MatchFeeds {
    fn default() -> Self {
        Self::new()
    }
}
