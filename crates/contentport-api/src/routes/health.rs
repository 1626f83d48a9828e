use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

fn connectivity<E>(result: Result<(), E>) -> String {
    match result {
        Ok(()) => "connected".to_string(),
        Err(_) => "disconnected".to_string(),
    }
}

/// Health check endpoint
///
/// Reports the API version and whether both stores answer a ping.
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let records = state.records.ping().await;
    let kv = state.kv.ping().await;
    let healthy = records.is_ok() && kv.is_ok();

    let mut services = HashMap::new();
    services.insert("record_store".to_string(), connectivity(records));
    services.insert("kv_store".to_string(), connectivity(kv));

    Ok(Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
