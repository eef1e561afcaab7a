use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::dao::models::{
    MatchEntity, MatchStatusEntity, ScoreEntity, StreamEntity, TeamEntity, TournamentEntity,
};

pub const MATCH_COLLECTION_NAME: &str = "matches";

/// Match document stored in the `matches` collection, keyed by the match id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    home_team: TeamEntity,
    away_team: TeamEntity,
    tournament: TournamentEntity,
    start_time: DateTime,
    status: MatchStatusEntity,
    #[serde(default)]
    score: Option<ScoreEntity>,
    #[serde(default)]
    streams: Vec<StreamEntity>,
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id,
            home_team: value.home_team,
            away_team: value.away_team,
            tournament: value.tournament,
            start_time: DateTime::from_system_time(value.start_time),
            status: value.status,
            score: value.score,
            streams: value.streams,
        }
    }
}

impl From<MongoMatchDocument> for MatchEntity {
    fn from(value: MongoMatchDocument) -> Self {
        Self {
            id: value.id,
            home_team: value.home_team,
            away_team: value.away_team,
            tournament: value.tournament,
            start_time: value.start_time.to_system_time(),
            status: value.status,
            score: value.score,
            streams: value.streams,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    #[test]
    fn start_time_survives_bson_conversion_at_millisecond_precision() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_millis(1_760_000_000_123);
        let entity = MatchEntity {
            id: "blast-7".into(),
            home_team: TeamEntity {
                id: "vit".into(),
                name: "Team Vitality".into(),
                logo: None,
            },
            away_team: TeamEntity {
                id: "faze".into(),
                name: "FaZe Clan".into(),
                logo: None,
            },
            tournament: TournamentEntity {
                id: "blast".into(),
                name: "BLAST Premier".into(),
                game: "CS2".into(),
            },
            start_time: start,
            status: MatchStatusEntity::Finished,
            score: Some(ScoreEntity { home: 2, away: 1 }),
            streams: Vec::new(),
        };

        let back: MatchEntity = MongoMatchDocument::from(entity.clone()).into();
        assert_eq!(back, entity);
    }
}
