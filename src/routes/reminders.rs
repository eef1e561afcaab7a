use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use axum_valid::Valid;

use crate::{
    dto::reminders::{
        CancelRemindersResponse, ReminderSetResponse, ScheduleReminderRequest,
        ScheduleReminderResponse,
    },
    error::AppError,
    services::reminder_service,
    state::SharedState,
};

/// Reminder scheduling endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/reminders", get(list_reminders).post(schedule_reminder))
        .route("/reminders/{match_id}", delete(cancel_reminders))
}

/// List matches with pending reminders.
#[utoipa::path(
    get,
    path = "/reminders",
    tag = "reminders",
    responses((status = 200, description = "Pending reminders", body = ReminderSetResponse))
)]
pub async fn list_reminders(State(state): State<SharedState>) -> Json<ReminderSetResponse> {
    Json(reminder_service::list_reminders(&state))
}

/// Schedule a reminder one lead time before the match starts.
#[utoipa::path(
    post,
    path = "/reminders",
    tag = "reminders",
    request_body = ScheduleReminderRequest,
    responses(
        (status = 200, description = "Reminder scheduled, or skipped when already due", body = ScheduleReminderResponse),
        (status = 400, description = "Invalid match id or start time")
    )
)]
pub async fn schedule_reminder(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ScheduleReminderRequest>>,
) -> Result<Json<ScheduleReminderResponse>, AppError> {
    Ok(Json(reminder_service::schedule_for_match(&state, &payload)?))
}

/// Cancel every reminder registered for a match.
#[utoipa::path(
    delete,
    path = "/reminders/{match_id}",
    tag = "reminders",
    params(("match_id" = String, Path, description = "Identifier of the match")),
    responses(
        (status = 200, description = "Reminders cancelled", body = CancelRemindersResponse),
        (status = 400, description = "Invalid match id")
    )
)]
pub async fn cancel_reminders(
    State(state): State<SharedState>,
    Path(match_id): Path<String>,
) -> Result<Json<CancelRemindersResponse>, AppError> {
    Ok(Json(reminder_service::cancel_for_match(&state, &match_id)?))
}
