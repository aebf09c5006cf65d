use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database_ready: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ready = match core_library::health_check(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "Database health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if database_ready { "ok" } else { "degraded" },
        database_ready,
    })
}
