use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    state::{
        feed::MatchesUiState,
        matches::{Match, MatchCategory, MatchStatus, StreamPlatform},
    },
};

/// Team as exposed to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDto {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TournamentDto {
    pub id: String,
    pub name: String,
    pub game: String,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ScoreDto {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StreamDto {
    /// `twitch` or `youtube`.
    pub platform: String,
    pub url: String,
}

/// A match entry inside a feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchDto {
    pub id: String,
    pub home_team: TeamDto,
    pub away_team: TeamDto,
    pub tournament: TournamentDto,
    /// RFC 3339 kick-off time.
    pub start_time: String,
    /// `scheduled`, `live` or `finished`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreDto>,
    pub streams: Vec<StreamDto>,
}

impl From<&Match> for MatchDto {
    fn from(value: &Match) -> Self {
        let status = match value.status() {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
        };
        Self {
            id: value.id.clone(),
            home_team: TeamDto {
                id: value.home_team.id.clone(),
                name: value.home_team.name.clone(),
                logo: value.home_team.logo.clone(),
            },
            away_team: TeamDto {
                id: value.away_team.id.clone(),
                name: value.away_team.name.clone(),
                logo: value.away_team.logo.clone(),
            },
            tournament: TournamentDto {
                id: value.tournament.id.clone(),
                name: value.tournament.name.clone(),
                game: value.tournament.game.clone(),
            },
            start_time: format_system_time(value.start_time)
                .unwrap_or_else(|_| "invalid-timestamp".into()),
            status: status.to_string(),
            score: value.score().map(|score| ScoreDto {
                home: score.home,
                away: score.away,
            }),
            streams: value
                .streams
                .iter()
                .map(|stream| StreamDto {
                    platform: match stream.platform {
                        StreamPlatform::Twitch => "twitch".to_string(),
                        StreamPlatform::YouTube => "youtube".to_string(),
                    },
                    url: stream.url.clone(),
                })
                .collect(),
        }
    }
}

/// Load status of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Loading,
    Success,
    Error,
}

/// Snapshot of one category feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedStateResponse {
    /// `upcoming`, `live` or `closed`.
    pub category: String,
    pub status: FeedStatus,
    pub matches: Vec<MatchDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FeedStateResponse {
    pub fn new(category: MatchCategory, state: &MatchesUiState) -> Self {
        let (status, matches, message) = match state {
            MatchesUiState::Loading => (FeedStatus::Loading, Vec::new(), None),
            MatchesUiState::Success(matches) => (
                FeedStatus::Success,
                matches.iter().map(MatchDto::from).collect(),
                None,
            ),
            MatchesUiState::Error(message) => {
                (FeedStatus::Error, Vec::new(), Some(message.clone()))
            }
        };
        Self {
            category: category.to_string(),
            status,
            matches,
            message,
        }
    }
}

/// Every feed keyed by category, in upcoming/live/closed order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchesResponse {
    #[schema(value_type = Object)]
    pub feeds: IndexMap<String, FeedStateResponse>,
}
