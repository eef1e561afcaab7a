//! Matchday Back binary entrypoint wiring the match store, sync session, REST and SSE layers.

use std::{env, net::SocketAddr, time::Duration};

use anyhow::Context;
use axum::Router;
use matchday_back::{
    config::AppConfig,
    dao::match_store::StoreBackend,
    routes,
    services::{sse_events, storage_supervisor, sync_orchestrator::StartOutcome},
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long startup waits for the first storage connection before loading the feeds.
const STORAGE_WAIT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let backend = StoreBackend::from_env().context("selecting storage backend")?;
    info!(backend = backend.name(), "using storage backend");

    let app_state = AppState::new(config);

    tokio::spawn(storage_supervisor::run(app_state.clone(), move || {
        let backend = backend.clone();
        async move { backend.connect().await }
    }));
    let broadcasters = sse_events::spawn_broadcasters(&app_state);

    start_sync_session(&app_state).await;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    app_state.shutdown();
    for handle in broadcasters {
        handle.abort();
    }
    info!("sync session stopped");

    Ok(())
}

/// Give storage a moment to come up, then load the feeds and start live polling.
async fn start_sync_session(state: &SharedState) {
    let mut degraded = state.degraded_watcher();
    if tokio::time::timeout(STORAGE_WAIT, degraded.wait_for(|flag| !*flag))
        .await
        .is_err()
    {
        warn!(
            wait_secs = STORAGE_WAIT.as_secs(),
            "storage still unavailable; starting with placeholder matches"
        );
    }

    match state.sync().start().await {
        StartOutcome::Subscribed => info!("match feeds subscribed"),
        StartOutcome::FellBack => warn!("match feeds showing placeholder data"),
        StartOutcome::AlreadyStarted => {}
    }
    state.sync().start_polling();
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
