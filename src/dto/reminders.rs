use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        TimestampOutOfRange, format_system_time, parse_system_time,
        validation::{validate_match_id, validate_rfc3339},
    },
    services::reminder_service::ReminderJob,
};

/// Payload asking for a reminder ahead of a match.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScheduleReminderRequest {
    #[validate(custom(function = validate_match_id))]
    pub match_id: String,
    /// RFC 3339 kick-off time of the match.
    #[validate(custom(function = validate_rfc3339))]
    pub start_time: String,
}

impl ScheduleReminderRequest {
    /// Kick-off time as a [`SystemTime`], `None` when the payload was not validated.
    pub fn start(&self) -> Option<SystemTime> {
        parse_system_time(&self.start_time)
    }
}

/// A registered reminder job.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReminderJobDto {
    pub id: Uuid,
    pub match_id: String,
    /// RFC 3339 instant the reminder fires at.
    pub fire_at: String,
}

impl TryFrom<ReminderJob> for ReminderJobDto {
    type Error = TimestampOutOfRange;

    fn try_from(job: ReminderJob) -> Result<Self, Self::Error> {
        Ok(Self {
            id: job.id,
            fire_at: format_system_time(job.fire_at)?,
            match_id: job.match_id,
        })
    }
}

/// Outcome of a schedule request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleReminderResponse {
    /// False when the reminder time had already passed and nothing was registered.
    pub scheduled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<ReminderJobDto>,
}

/// Match ids with at least one pending reminder, and their jobs.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReminderSetResponse {
    /// Interval between a reminder firing and kick-off.
    pub lead_time_secs: u64,
    pub match_ids: Vec<String>,
    pub jobs: Vec<ReminderJobDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelRemindersResponse {
    pub match_id: String,
    /// Number of jobs cancelled.
    pub cancelled: usize,
}
