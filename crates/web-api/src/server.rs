use crate::handlers;
use axum::{routing::get, Router};
use parkpulse_collector::Collector;
use parkpulse_heatmap::HeatmapCache;
use parkpulse_store::ObservationStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared handler state, injected once at startup. The cache is the only
/// mutable piece; everything else is read-only wiring.
pub struct AppState {
    pub cache: Arc<HeatmapCache>,
    pub store: Arc<dyn ObservationStore>,
    pub collector: Arc<Collector>,
    /// Shared secret the trigger endpoint expects in `x-api-key`.
    pub trigger_secret: String,
}

pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/heatmap", get(handlers::heatmap))
            .route("/api/all-data", get(handlers::all_data))
            .route("/api/query-parking", get(handlers::trigger_collection))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
