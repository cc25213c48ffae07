use crate::server::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use parkpulse_heatmap::LotHeatmap;
use parkpulse_store::Observation;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// Serves the weekly occupancy heatmap, lot URL -> 168-slot grid plus the
/// most recent observation. Within the freshness window this never
/// touches the store.
///
/// # Errors
/// Returns a 500 with `{"error": ...}` if the store scan fails on a cache
/// miss; callers never see partial data.
pub async fn heatmap(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HashMap<String, LotHeatmap>>, ApiError> {
    match state.cache.get().await {
        Ok(snapshot) => Ok(Json(snapshot.lots.clone())),
        Err(e) => {
            tracing::error!("failed to build heatmap: {}", e);
            Err(internal_error("failed to generate heatmap data"))
        }
    }
}

/// Dumps every stored observation, uncached and unaggregated.
///
/// # Errors
/// Returns a 500 with `{"error": ...}` if the store scan fails.
pub async fn all_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    match state.store.scan_all().await {
        Ok(observations) => Ok(Json(observations)),
        Err(e) => {
            tracing::error!("failed to fetch parking data: {}", e);
            Err(internal_error("failed to fetch parking data"))
        }
    }
}

/// Kicks off one collection pass in a detached task and responds
/// immediately. Guarded by the shared secret in `x-api-key`; collection
/// failures are logged by the task and never reach this response.
pub async fn trigger_collection(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let provided = headers.get("x-api-key").and_then(|value| value.to_str().ok());
    if provided != Some(state.trigger_secret.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "unauthorized".to_string(),
            }),
        )
            .into_response();
    }

    let collector = Arc::clone(&state.collector);
    tokio::spawn(async move {
        let stored = collector.run_once().await;
        tracing::info!("background collection stored {} observation(s)", stored);
    });

    (
        StatusCode::OK,
        Json(TriggerResponse {
            success: true,
            message: "collection started".to_string(),
        }),
    )
        .into_response()
}
