use crate::metrics::collector::InventoryMetrics;
use crate::{ExporterError, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Pull endpoint serving the inventory registry to scrapers.
pub struct MetricsExporter {
    metrics: Arc<InventoryMetrics>,
    path: String,
}

impl MetricsExporter {
    pub fn new(metrics: Arc<InventoryMetrics>, path: impl Into<String>) -> Self {
        Self {
            metrics,
            path: path.into(),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(&self.path, get(scrape))
            .with_state(self.metrics.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until the server fails; it never stops on its own.
    pub async fn serve(&self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ExporterError::BindFailed(addr, e))?;

        info!(addr = %addr, path = %self.path, "Metrics endpoint listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| ExporterError::ServerError(e.to_string()))
    }
}

async fn scrape(State(metrics): State<Arc<InventoryMetrics>>) -> Response {
    match metrics.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
