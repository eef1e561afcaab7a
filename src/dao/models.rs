use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tracing::warn;

use crate::state::matches::{
    Match, MatchStatus, Score, Stream, StreamPlatform, Team, Tournament,
};

/// Status of a match as stored upstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatusEntity {
    Scheduled,
    Live,
    Finished,
}

/// Team record embedded in a match document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Tournament record embedded in a match document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentEntity {
    pub id: String,
    pub name: String,
    /// Short game tag (e.g. "VALORANT").
    pub game: String,
}

/// Home/away score stored alongside a started match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntity {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreamPlatformEntity {
    Twitch,
    #[serde(rename = "youtube")]
    YouTube,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamEntity {
    pub platform: StreamPlatformEntity,
    pub url: String,
}

/// Match record persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Stable identifier of the match.
    pub id: String,
    pub home_team: TeamEntity,
    pub away_team: TeamEntity,
    pub tournament: TournamentEntity,
    /// Scheduled start of the match.
    pub start_time: SystemTime,
    pub status: MatchStatusEntity,
    #[serde(default)]
    pub score: Option<ScoreEntity>,
    /// Broadcasts in display order.
    #[serde(default)]
    pub streams: Vec<StreamEntity>,
}

impl From<MatchStatusEntity> for MatchStatus {
    fn from(value: MatchStatusEntity) -> Self {
        match value {
            MatchStatusEntity::Scheduled => MatchStatus::Scheduled,
            MatchStatusEntity::Live => MatchStatus::Live,
            MatchStatusEntity::Finished => MatchStatus::Finished,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            logo: value.logo,
        }
    }
}

impl From<TournamentEntity> for Tournament {
    fn from(value: TournamentEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            game: value.game,
        }
    }
}

impl From<StreamEntity> for Stream {
    fn from(value: StreamEntity) -> Self {
        let platform = match value.platform {
            StreamPlatformEntity::Twitch => StreamPlatform::Twitch,
            StreamPlatformEntity::YouTube => StreamPlatform::YouTube,
        };
        Self {
            platform,
            url: value.url,
        }
    }
}

impl From<MatchEntity> for Match {
    fn from(entity: MatchEntity) -> Self {
        let status: MatchStatus = entity.status.into();
        if status == MatchStatus::Scheduled && entity.score.is_some() {
            warn!(match_id = %entity.id, "dropping score stored on a scheduled match");
        }

        let mut domain = Match::new(
            entity.id,
            entity.home_team.into(),
            entity.away_team.into(),
            entity.tournament.into(),
            entity.start_time,
            status,
        )
        .with_streams(entity.streams.into_iter().map(Into::into).collect());

        if let Some(score) = entity.score {
            domain = domain.with_score(Score {
                home: score.home,
                away: score.away,
            });
        }
        domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(status: MatchStatusEntity, score: Option<ScoreEntity>) -> MatchEntity {
        MatchEntity {
            id: "vct-1".into(),
            home_team: TeamEntity {
                id: "fnc".into(),
                name: "Fnatic".into(),
                logo: None,
            },
            away_team: TeamEntity {
                id: "tl".into(),
                name: "Team Liquid".into(),
                logo: Some("https://cdn.example/tl.png".into()),
            },
            tournament: TournamentEntity {
                id: "vct-emea".into(),
                name: "VCT EMEA".into(),
                game: "VALORANT".into(),
            },
            start_time: SystemTime::UNIX_EPOCH,
            status,
            score,
            streams: vec![StreamEntity {
                platform: StreamPlatformEntity::YouTube,
                url: "https://youtube.com/valorant".into(),
            }],
        }
    }

    #[test]
    fn scheduled_entity_loses_stray_score() {
        let domain: Match = entity(
            MatchStatusEntity::Scheduled,
            Some(ScoreEntity { home: 1, away: 2 }),
        )
        .into();
        assert_eq!(domain.status(), MatchStatus::Scheduled);
        assert!(domain.score().is_none());
    }

    #[test]
    fn finished_entity_keeps_score_and_streams() {
        let domain: Match = entity(
            MatchStatusEntity::Finished,
            Some(ScoreEntity { home: 13, away: 11 }),
        )
        .into();
        assert_eq!(domain.score(), Some(Score { home: 13, away: 11 }));
        assert_eq!(domain.streams.len(), 1);
        assert_eq!(domain.streams[0].platform, StreamPlatform::YouTube);
    }

    #[test]
    fn entity_json_uses_snake_case_tags() {
        let json = serde_json::to_value(entity(MatchStatusEntity::Live, None)).unwrap();
        assert_eq!(json["status"], "live");
        assert_eq!(json["streams"][0]["platform"], "youtube");
    }
}
