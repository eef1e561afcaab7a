//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest match identifier accepted from clients.
pub const MAX_MATCH_ID_LEN: usize = 128;

/// Validates that a match ID is a non-empty slug of at most [`MAX_MATCH_ID_LEN`] characters.
///
/// Allowed characters are ASCII letters, digits, `-`, `_`, `.` and `:`.
///
/// # Examples
///
/// ```ignore
/// validate_match_id("vct-emea-2025-final") // Ok
/// validate_match_id("")                    // Err - empty
/// validate_match_id("final match")         // Err - space
/// ```
pub fn validate_match_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_MATCH_ID_LEN {
        let mut err = ValidationError::new("match_id_length");
        err.message = Some(
            format!(
                "Match ID must be between 1 and {MAX_MATCH_ID_LEN} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    {
        let mut err = ValidationError::new("match_id_format");
        err.message = Some("Match ID may only contain letters, digits, '-', '_', '.' and ':'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a timestamp parses as RFC 3339 and stays within years 0000-9999 in UTC.
pub fn validate_rfc3339(value: &str) -> Result<(), ValidationError> {
    super::parse_system_time(value).map(|_| ()).ok_or_else(|| {
        let mut err = ValidationError::new("rfc3339");
        err.message = Some("Expected an RFC 3339 timestamp between years 0000 and 9999 UTC".into());
        err
    })
}
