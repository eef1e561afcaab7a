use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report storage connectivity and polling status, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_match_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    let polling = state.sync().polling_phase().is_active();
    if state.is_degraded() {
        HealthResponse::degraded(polling)
    } else {
        HealthResponse::ok(polling)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::match_store::memory::InMemoryMatchStore, state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).await.status, "degraded");

        state
            .install_match_store(Arc::new(InMemoryMatchStore::default()))
            .await;
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert!(!health.polling);
    }
}
