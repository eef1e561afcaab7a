use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Matchday Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::matches::list_feeds,
        crate::routes::matches::get_feed,
        crate::routes::reminders::list_reminders,
        crate::routes::reminders::schedule_reminder,
        crate::routes::reminders::cancel_reminders,
        crate::routes::polling::polling_status,
        crate::routes::polling::start_polling,
        crate::routes::polling::stop_polling,
        crate::routes::sse::match_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::matches::MatchesResponse,
            crate::dto::matches::FeedStateResponse,
            crate::dto::matches::FeedStatus,
            crate::dto::matches::MatchDto,
            crate::dto::reminders::ScheduleReminderRequest,
            crate::dto::reminders::ScheduleReminderResponse,
            crate::dto::reminders::ReminderSetResponse,
            crate::dto::reminders::CancelRemindersResponse,
            crate::dto::polling::PollingStatusResponse,
            crate::dto::polling::PollingToggleResponse,
            crate::dto::sse::ReminderDueEvent,
            crate::dto::sse::PollingChangedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "matches", description = "Upcoming, live and closed match feeds"),
        (name = "reminders", description = "Match start reminders"),
        (name = "polling", description = "Live feed polling control"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
