//! Placeholder matches shown whenever a category has no real data to display.

use std::time::{Duration, SystemTime};

use rand::Rng;

use crate::state::matches::{
    Match, MatchCategory, MatchStatus, Score, Stream, StreamPlatform, Team, Tournament,
};

/// Upper bound (inclusive) of each side's score on the first live placeholder.
pub const LIVE_PRIMARY_MAX_SCORE: u32 = 15;
/// Upper bound (inclusive) of each side's score on the second live placeholder.
pub const LIVE_SECONDARY_MAX_SCORE: u32 = 30;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Placeholder list for `category`, relative to the current time.
pub fn fallback_matches(category: MatchCategory) -> Vec<Match> {
    fallback_matches_at(category, SystemTime::now())
}

/// Placeholder list for `category`, with start times relative to `now`.
///
/// Ids, teams and counts never change; only the live scores are drawn at random.
pub fn fallback_matches_at(category: MatchCategory, now: SystemTime) -> Vec<Match> {
    match category {
        MatchCategory::Upcoming => upcoming(now),
        MatchCategory::Live => live(now),
        MatchCategory::Closed => closed(now),
    }
}

fn upcoming(now: SystemTime) -> Vec<Match> {
    vec![
        Match::new(
            "mock-upcoming-1",
            team("sen", "Sentinels"),
            team("loud", "LOUD"),
            tournament("vct-champions", "VALORANT Champions", "VALORANT"),
            now + 2 * HOUR,
            MatchStatus::Scheduled,
        )
        .with_streams(vec![twitch("valorant")]),
        Match::new(
            "mock-upcoming-2",
            team("vit", "Team Vitality"),
            team("g2", "G2 Esports"),
            tournament("blast-premier", "BLAST Premier", "CS2"),
            now + DAY,
            MatchStatus::Scheduled,
        )
        .with_streams(vec![twitch("blastpremier"), youtube("@BLASTPremier")]),
    ]
}

fn live(now: SystemTime) -> Vec<Match> {
    let mut rng = rand::rng();
    vec![
        Match::new(
            "mock-live-1",
            team("fnc", "Fnatic"),
            team("th", "Team Heretics"),
            tournament("vct-emea", "VCT EMEA", "VALORANT"),
            now - HOUR / 2,
            MatchStatus::Live,
        )
        .with_score(Score {
            home: rng.random_range(0..=LIVE_PRIMARY_MAX_SCORE),
            away: rng.random_range(0..=LIVE_PRIMARY_MAX_SCORE),
        })
        .with_streams(vec![twitch("valorant_emea")]),
        Match::new(
            "mock-live-2",
            team("t1", "T1"),
            team("geng", "Gen.G"),
            tournament("lck", "LCK", "LOL"),
            now - HOUR / 4,
            MatchStatus::Live,
        )
        .with_score(Score {
            home: rng.random_range(0..=LIVE_SECONDARY_MAX_SCORE),
            away: rng.random_range(0..=LIVE_SECONDARY_MAX_SCORE),
        })
        .with_streams(vec![twitch("lck"), youtube("@LCK")]),
    ]
}

fn closed(now: SystemTime) -> Vec<Match> {
    vec![
        Match::new(
            "mock-closed-1",
            team("navi", "Natus Vincere"),
            team("faze", "FaZe Clan"),
            tournament("iem-katowice", "IEM Katowice", "CS2"),
            now - DAY,
            MatchStatus::Finished,
        )
        .with_score(Score { home: 2, away: 1 }),
        Match::new(
            "mock-closed-2",
            team("prx", "Paper Rex"),
            team("drx", "DRX"),
            tournament("vct-pacific", "VCT Pacific", "VALORANT"),
            now - 2 * DAY,
            MatchStatus::Finished,
        )
        .with_score(Score { home: 13, away: 11 }),
    ]
}

fn team(id: &str, name: &str) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        logo: None,
    }
}

fn tournament(id: &str, name: &str, game: &str) -> Tournament {
    Tournament {
        id: id.to_string(),
        name: name.to_string(),
        game: game.to_string(),
    }
}

fn twitch(channel: &str) -> Stream {
    Stream {
        platform: StreamPlatform::Twitch,
        url: format!("https://www.twitch.tv/{channel}"),
    }
}

fn youtube(handle: &str) -> Stream {
    Stream {
        platform: StreamPlatform::YouTube,
        url: format!("https://www.youtube.com/{handle}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn each_category_has_two_fixed_placeholders() {
        let now = SystemTime::now();
        assert_eq!(
            ids(&fallback_matches_at(MatchCategory::Upcoming, now)),
            ["mock-upcoming-1", "mock-upcoming-2"]
        );
        assert_eq!(
            ids(&fallback_matches_at(MatchCategory::Live, now)),
            ["mock-live-1", "mock-live-2"]
        );
        assert_eq!(
            ids(&fallback_matches_at(MatchCategory::Closed, now)),
            ["mock-closed-1", "mock-closed-2"]
        );
    }

    #[test]
    fn placeholders_belong_to_their_category() {
        for category in MatchCategory::ALL {
            for m in fallback_matches(category) {
                assert_eq!(m.category(), category, "{} misfiled", m.id);
            }
        }
    }

    #[test]
    fn upcoming_placeholders_start_in_the_future_without_score() {
        let now = SystemTime::now();
        for m in fallback_matches_at(MatchCategory::Upcoming, now) {
            assert!(m.start_time > now);
            assert!(m.score().is_none());
        }
    }

    #[test]
    fn live_scores_stay_within_bounds() {
        for _ in 0..200 {
            let live = fallback_matches(MatchCategory::Live);
            let first = live[0].score().unwrap();
            let second = live[1].score().unwrap();
            assert!(first.home <= LIVE_PRIMARY_MAX_SCORE);
            assert!(first.away <= LIVE_PRIMARY_MAX_SCORE);
            assert!(second.home <= LIVE_SECONDARY_MAX_SCORE);
            assert!(second.away <= LIVE_SECONDARY_MAX_SCORE);
        }
    }
}
