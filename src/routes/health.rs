use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
///
/// Reports whether the data directory is readable. Used by load balancers
/// and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let data_dir = state.store.data_dir().to_path_buf();
    let dir = data_dir.clone();
    let readable = tokio::task::spawn_blocking(move || match std::fs::read_dir(&dir) {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Data directory health check failed: {:?}", e);
            false
        }
    })
    .await
    .unwrap_or(false);

    Json(json!({
        "status": if readable { "healthy" } else { "unhealthy" },
        "data_dir": data_dir.display().to_string(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
