//! Reports HTTP Server.
//!
//! Exposes catalog metadata and report execution over JSON.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::domain::models::{ReportRequest, ReportResult, ServerConfig};
use crate::domain::ports::ResultStore;
use crate::services::reporting::{CatalogMetadata, ReportEngine, ReportError};

/// Configuration for the reports HTTP server.
#[derive(Debug, Clone)]
pub struct ReportsHttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
    /// Upper bound on one report computation.
    pub request_timeout: Duration,
}

impl Default for ReportsHttpConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for ReportsHttpConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Query parameters for the metadata endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataParams {
    #[serde(default, alias = "project_id")]
    pub project_id: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

/// Shared state for the reports HTTP server.
struct AppState<S: ResultStore> {
    engine: ReportEngine<S>,
    request_timeout: Duration,
}

/// Reports HTTP Server.
pub struct ReportsHttpServer<S: ResultStore + 'static> {
    config: ReportsHttpConfig,
    engine: ReportEngine<S>,
}

impl<S: ResultStore + 'static> ReportsHttpServer<S> {
    pub fn new(engine: ReportEngine<S>, config: ReportsHttpConfig) -> Self {
        Self { config, engine }
    }

    /// Build the router.
    pub fn router(self) -> Router {
        let state = Arc::new(AppState {
            engine: self.engine,
            request_timeout: self.config.request_timeout,
        });

        let app = Router::new()
            .route("/api/v1/reports", post(run_report::<S>))
            .route("/api/v1/reports/metadata", get(get_metadata::<S>))
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.addr()?;
        let router = self.router();

        info!("Reports HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = self.router();

        info!("Reports HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn get_metadata<S: ResultStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<MetadataParams>,
) -> Json<CatalogMetadata> {
    tracing::debug!(project = ?params.project_id, "metadata requested");
    Json(state.engine.metadata())
}

#[instrument(skip_all)]
async fn run_report<S: ResultStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ReportResult>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        api_error(StatusCode::BAD_REQUEST, rejection.body_text(), "INVALID_REQUEST")
    })?;

    let outcome = tokio::time::timeout(state.request_timeout, state.engine.run(&request)).await;

    match outcome {
        Ok(Ok(report)) => Ok(Json(report)),
        Ok(Err(e)) => Err(report_error(&e, state.engine.config().expose_error_details)),
        Err(_) => {
            warn!(timeout = ?state.request_timeout, "report request timed out");
            Err(api_error(
                StatusCode::GATEWAY_TIMEOUT,
                format!("report did not complete within {}s", state.request_timeout.as_secs()),
                "TIMEOUT",
            ))
        }
    }
}

fn report_error(error: &ReportError, expose_details: bool) -> ApiError {
    let status = match error {
        ReportError::Validation(_) => StatusCode::BAD_REQUEST,
        ReportError::Aggregation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, error.public_message(expose_details), error.code())
}
