//! Domain model for esports matches and the category partition derived from their status.

use std::{fmt, str::FromStr, time::SystemTime};

use thiserror::Error;

/// Lifecycle status reported by the upstream for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    /// The match has not started yet.
    Scheduled,
    /// The match is being played right now.
    Live,
    /// The match is over and its score is final.
    Finished,
}

/// Status-derived partition of all known matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchCategory {
    /// Scheduled matches.
    Upcoming,
    /// Matches currently in progress.
    Live,
    /// Finished matches.
    Closed,
}

impl MatchCategory {
    /// Every category, in display order.
    pub const ALL: [MatchCategory; 3] = [
        MatchCategory::Upcoming,
        MatchCategory::Live,
        MatchCategory::Closed,
    ];

    /// Category a match with the given status belongs to.
    pub fn of(status: MatchStatus) -> Self {
        match status {
            MatchStatus::Scheduled => MatchCategory::Upcoming,
            MatchStatus::Live => MatchCategory::Live,
            MatchStatus::Finished => MatchCategory::Closed,
        }
    }

    /// Stable lowercase name used in routes and events.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchCategory::Upcoming => "upcoming",
            MatchCategory::Live => "live",
            MatchCategory::Closed => "closed",
        }
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown match category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for MatchCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "upcoming" => Ok(MatchCategory::Upcoming),
            "live" => Ok(MatchCategory::Live),
            "closed" => Ok(MatchCategory::Closed),
            _ => Err(UnknownCategory(value.to_string())),
        }
    }
}

/// A competing team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Reference to the team logo (URL or asset key), when known.
    pub logo: Option<String>,
}

/// Tournament a match is played in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    /// Short game tag, e.g. `VALORANT` or `CS2`.
    pub game: String,
}

/// Home/away score pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// Platform hosting a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPlatform {
    Twitch,
    YouTube,
}

/// One broadcast of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub platform: StreamPlatform,
    pub url: String,
}

/// A single match as seen by the sync core.
///
/// The score is only ever present once the match has started; use [`Match::new`] or
/// [`Match::with_score`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: String,
    pub home_team: Team,
    pub away_team: Team,
    pub tournament: Tournament,
    pub start_time: SystemTime,
    status: MatchStatus,
    score: Option<Score>,
    pub streams: Vec<Stream>,
}

impl Match {
    /// Build a match without a score.
    pub fn new(
        id: impl Into<String>,
        home_team: Team,
        away_team: Team,
        tournament: Tournament,
        start_time: SystemTime,
        status: MatchStatus,
    ) -> Self {
        Self {
            id: id.into(),
            home_team,
            away_team,
            tournament,
            start_time,
            status,
            score: None,
            streams: Vec::new(),
        }
    }

    /// Attach a score. Ignored for scheduled matches.
    pub fn with_score(mut self, score: Score) -> Self {
        if self.status != MatchStatus::Scheduled {
            self.score = Some(score);
        }
        self
    }

    /// Attach the broadcast list, preserving its order.
    pub fn with_streams(mut self, streams: Vec<Stream>) -> Self {
        self.streams = streams;
        self
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn score(&self) -> Option<Score> {
        self.score
    }

    /// Category this match currently belongs to.
    pub fn category(&self) -> MatchCategory {
        MatchCategory::of(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: &str) -> Team {
        Team {
            id: id.into(),
            name: id.to_uppercase(),
            logo: None,
        }
    }

    fn tournament() -> Tournament {
        Tournament {
            id: "vct".into(),
            name: "VCT Masters".into(),
            game: "VALORANT".into(),
        }
    }

    #[test]
    fn category_follows_status() {
        assert_eq!(MatchCategory::of(MatchStatus::Scheduled), MatchCategory::Upcoming);
        assert_eq!(MatchCategory::of(MatchStatus::Live), MatchCategory::Live);
        assert_eq!(MatchCategory::of(MatchStatus::Finished), MatchCategory::Closed);
    }

    #[test]
    fn scheduled_match_never_carries_a_score() {
        let m = Match::new(
            "m1",
            team("a"),
            team("b"),
            tournament(),
            SystemTime::UNIX_EPOCH,
            MatchStatus::Scheduled,
        )
        .with_score(Score { home: 1, away: 0 });
        assert_eq!(m.score(), None);
    }

    #[test]
    fn live_match_keeps_its_score() {
        let m = Match::new(
            "m2",
            team("a"),
            team("b"),
            tournament(),
            SystemTime::UNIX_EPOCH,
            MatchStatus::Live,
        )
        .with_score(Score { home: 7, away: 9 });
        assert_eq!(m.score(), Some(Score { home: 7, away: 9 }));
        assert_eq!(m.category(), MatchCategory::Live);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("LIVE".parse::<MatchCategory>(), Ok(MatchCategory::Live));
        assert_eq!("closed".parse::<MatchCategory>(), Ok(MatchCategory::Closed));
        assert!("finished".parse::<MatchCategory>().is_err());
    }
}
