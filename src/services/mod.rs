/// OpenAPI documentation generation.
pub mod documentation;
/// Placeholder matches shown when real data is missing.
pub mod fallback;
/// Feed snapshots and polling control.
pub mod feed_service;
/// Health check service.
pub mod health_service;
/// Match reminders and their HTTP-facing helpers.
pub mod reminder_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Sync session driving the match feeds.
pub mod sync_orchestrator;
