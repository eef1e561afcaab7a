use std::time::SystemTime;
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

pub mod health;
pub mod matches;
pub mod polling;
pub mod reminders;
pub mod sse;
pub mod validation;

/// Instant that has no RFC 3339 representation in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timestamp outside the RFC 3339 range")]
pub struct TimestampOutOfRange;

fn to_utc(time: SystemTime) -> Option<OffsetDateTime> {
    let offset = match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(after) => time::Duration::try_from(after).ok()?,
        Err(before) => -time::Duration::try_from(before.duration()).ok()?,
    };
    OffsetDateTime::UNIX_EPOCH.checked_add(offset)
}

fn format_system_time(time: SystemTime) -> Result<String, TimestampOutOfRange> {
    to_utc(time)
        .and_then(|utc| utc.format(&Rfc3339).ok())
        .ok_or(TimestampOutOfRange)
}

/// Parse an RFC 3339 timestamp whose UTC form is still a four-digit year.
fn parse_system_time(value: &str) -> Option<SystemTime> {
    let parsed = OffsetDateTime::parse(value, &Rfc3339).ok()?;
    let utc = parsed.checked_to_offset(UtcOffset::UTC)?;
    (0..=9999).contains(&utc.year()).then(|| SystemTime::from(utc))
}
