// crates/json-depot-server/src/server.rs
// ============================================================================
// Module: Depot HTTP Server
// Description: axum routes for JSON ingestion and retrieval.
// Purpose: Map HTTP requests onto the ingestion pipeline and retrieval service.
// Dependencies: json-depot-core, json-depot-config, axum, http-body-util, tokio
// ============================================================================

//! ## Overview
//! Two routes are served:
//! - `POST /ingest` takes `{ "jsonString": string }` and replies with the
//!   parsed document, or `{ "error": message }` with a 4xx/5xx status.
//! - `GET /records` replies with `{ "data": [record...] }` in insertion order.
//!
//! The declared `Content-Length` is checked before the body is read, and the
//! body itself is read under the configured byte cap. Store calls run on the
//! blocking pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::num::FpCategory;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::CONTENT_LENGTH;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use http_body_util::BodyExt;
use http_body_util::LengthLimitError;
use http_body_util::Limited;
use json_depot_config::DepotConfig;
use json_depot_config::StoreConfig;
use json_depot_config::StoreType;
use json_depot_core::InMemoryJsonStore;
use json_depot_core::IngestError;
use json_depot_core::IngestOutcome;
use json_depot_core::IngestPipeline;
use json_depot_core::RecordView;
use json_depot_core::RetrievalService;
use json_depot_core::SharedJsonStore;
use json_depot_core::StoreError;
use json_depot_store_sqlite::SqliteJsonStore;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;
use tokio::net::TcpListener;

use crate::audit::AuditOutcome;
use crate::audit::AuditSink;
use crate::audit::IngestAuditEvent;
use crate::audit::IngestAuditEventParams;
use crate::audit::RecordsAuditEvent;
use crate::audit::audit_sink_from_config;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Envelope field carrying the submitted JSON text.
const JSON_STRING_FIELD: &str = "jsonString";
/// Response message for a failed records read.
const RECORDS_FAILURE_MESSAGE: &str = "Failed to fetch data";

// ============================================================================
// SECTION: Depot Server
// ============================================================================

/// JSON Depot HTTP server instance.
pub struct DepotServer {
    /// Configured bind address.
    bind: SocketAddr,
    /// Shared handler state.
    state: Arc<AppState>,
}

impl DepotServer {
    /// Builds a server from configuration, opening the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`DepotServerError`] when validation or initialization fails.
    pub fn from_config(config: &DepotConfig) -> Result<Self, DepotServerError> {
        config.validate().map_err(|err| DepotServerError::Config(err.to_string()))?;
        let store = open_json_store(&config.store)?;
        let audit = audit_sink_from_config(&config.server.audit)
            .map_err(|err| DepotServerError::Init(format!("audit sink: {err}")))?;
        Self::with_store(config, store, audit)
    }

    /// Builds a server over an already opened store and audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`DepotServerError`] when server settings are invalid.
    pub fn with_store(
        config: &DepotConfig,
        store: SharedJsonStore,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, DepotServerError> {
        let bind =
            config.server.bind_addr().map_err(|err| DepotServerError::Config(err.to_string()))?;
        let max_body_bytes = usize::try_from(config.server.max_body_bytes)
            .map_err(|_| DepotServerError::Config("server.max_body_bytes too large".to_string()))?;
        let state = AppState {
            pipeline: IngestPipeline::new(store.clone()),
            retrieval: RetrievalService::new(store, config.retrieval.data_format),
            audit,
            max_body_bytes,
        };
        Ok(Self {
            bind,
            state: Arc::new(state),
        })
    }

    /// Returns the configured bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Builds the axum router for the depot routes.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ingest", post(handle_ingest))
            .route("/records", get(handle_records))
            .with_state(Arc::clone(&self.state))
    }

    /// Serves on the configured address until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`DepotServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), DepotServerError> {
        let listener = TcpListener::bind(self.bind)
            .await
            .map_err(|err| DepotServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serves on `listener` until `shutdown` resolves, then drains in-flight
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns [`DepotServerError`] when serving fails.
    pub async fn serve_on<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), DepotServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, "json depot listening");
        }
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| DepotServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Opens the JSON store selected by configuration.
///
/// # Errors
///
/// Returns [`DepotServerError`] when the store cannot be opened.
pub fn open_json_store(config: &StoreConfig) -> Result<SharedJsonStore, DepotServerError> {
    match config.store_type {
        StoreType::Memory => Ok(SharedJsonStore::from_store(InMemoryJsonStore::new())),
        StoreType::Sqlite => {
            let sqlite_config = config.sqlite_config().ok_or_else(|| {
                DepotServerError::Config("sqlite store settings unavailable".to_string())
            })?;
            let store = SqliteJsonStore::new(&sqlite_config)
                .map_err(|err| DepotServerError::Init(err.to_string()))?;
            Ok(SharedJsonStore::from_store(store))
        }
    }
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Shared state for HTTP handlers.
struct AppState {
    /// Ingestion pipeline over the shared store.
    pipeline: IngestPipeline,
    /// Read-all service over the shared store.
    retrieval: RetrievalService,
    /// Audit sink for request events.
    audit: Arc<dyn AuditSink>,
    /// Hard cap on bytes read from a request body.
    max_body_bytes: usize,
}

/// Successful `/records` payload.
#[derive(Debug, Serialize)]
struct RecordsResponse {
    /// Records in insertion order.
    data: Vec<RecordView>,
}

/// Error payload for every failing route.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// User-readable message.
    error: String,
}

/// Handles `POST /ingest`.
async fn handle_ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let declared_bytes = declared_length(&headers);
    let (result, body_bytes) = ingest_request(&state, declared_bytes, body).await;
    let (outcome, record_id, error_kind) = match &result {
        Ok(accepted) => (AuditOutcome::Accepted, Some(accepted.id), None),
        Err(err) if err.is_client_error() => (AuditOutcome::Rejected, None, Some(err.kind())),
        Err(err) => (AuditOutcome::Failed, None, Some(err.kind())),
    };
    let response = match result {
        Ok(accepted) => (StatusCode::OK, Json(accepted.value)).into_response(),
        Err(err) => ApiError::Ingest(err).into_response(),
    };
    state.audit.record_ingest(&IngestAuditEvent::new(IngestAuditEventParams {
        outcome,
        status: response.status().as_u16(),
        error_kind,
        declared_bytes,
        body_bytes,
        record_id,
    }));
    response
}

/// Runs the size gate, reads the envelope, and invokes the pipeline.
///
/// Returns the result with the number of body bytes read, if any.
async fn ingest_request(
    state: &AppState,
    declared_bytes: Option<u64>,
    body: Body,
) -> (Result<IngestOutcome, IngestError>, Option<u64>) {
    if let Err(err) = IngestPipeline::check_declared_length(declared_bytes) {
        return (Err(err), None);
    }
    let bytes = match Limited::new(body, state.max_body_bytes).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            let max_bytes = u64::try_from(state.max_body_bytes).unwrap_or(u64::MAX);
            let too_large = IngestError::PayloadTooLarge {
                bytes: declared_bytes.unwrap_or_else(|| max_bytes.saturating_add(1)),
                max_bytes,
            };
            return (Err(too_large), None);
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to read ingest request body");
            return (Err(IngestError::InvalidSyntax), None);
        }
    };
    let body_bytes = u64::try_from(bytes.len()).ok();
    let json_text = match extract_json_string(&bytes) {
        Ok(text) => text,
        Err(err) => return (Err(err), body_bytes),
    };
    let pipeline = state.pipeline.clone();
    let result =
        tokio::task::spawn_blocking(move || pipeline.ingest(json_text.as_deref(), declared_bytes))
            .await
            .unwrap_or_else(|err| {
                tracing::error!(error = %err, "ingest task failed");
                Err(IngestError::InternalFailure(err.to_string()))
            });
    (result, body_bytes)
}

/// Handles `GET /records`.
async fn handle_records(State(state): State<Arc<AppState>>) -> Response {
    let retrieval = state.retrieval.clone();
    let result = tokio::task::spawn_blocking(move || retrieval.get_all())
        .await
        .unwrap_or_else(|err| Err(StoreError::Store(format!("records task failed: {err}"))));
    let (outcome, record_count, response) = match result {
        Ok(data) => {
            let count = data.len();
            let body = RecordsResponse {
                data,
            };
            (AuditOutcome::Accepted, Some(count), (StatusCode::OK, Json(body)).into_response())
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to fetch records");
            (AuditOutcome::Failed, None, ApiError::Records(err).into_response())
        }
    };
    state.audit.record_records(&RecordsAuditEvent::new(
        outcome,
        response.status().as_u16(),
        state.retrieval.format(),
        record_count,
    ));
    response
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads `Content-Length`, treating malformed values as absent.
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

/// Extracts `jsonString` from the request envelope.
///
/// An empty body, a missing field, or a falsy non-string field (`null`,
/// `false`, zero) yields `None`; an unparseable envelope or any other
/// non-string field is a syntax error.
fn extract_json_string(body: &[u8]) -> Result<Option<String>, IngestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let envelope: Value = serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(line = err.line(), column = err.column(), "malformed request envelope");
        IngestError::InvalidSyntax
    })?;
    match envelope.get(JSON_STRING_FIELD) {
        Some(Value::String(text)) => Ok(Some(text.clone())),
        None | Some(Value::Null | Value::Bool(false)) => Ok(None),
        Some(Value::Number(number)) if is_zero(number) => Ok(None),
        Some(_) => Err(IngestError::InvalidSyntax),
    }
}

/// Returns true for numeric zero in any spelling (`0`, `-0.0`, `0e7`).
fn is_zero(number: &Number) -> bool {
    number.as_f64().is_some_and(|value| value.classify() == FpCategory::Zero)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Route-level failures rendered as `{ "error": message }`.
enum ApiError {
    /// Ingestion failure.
    Ingest(IngestError),
    /// Retrieval failure.
    Records(#[allow(dead_code, reason = "store error is retained for context; the response uses a fixed message")] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Ingest(err) => {
                let status = match &err {
                    IngestError::PayloadTooLarge {
                        ..
                    } => StatusCode::PAYLOAD_TOO_LARGE,
                    IngestError::EmptyInput | IngestError::InvalidSyntax => StatusCode::BAD_REQUEST,
                    IngestError::InternalFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.user_message().to_string())
            }
            Self::Records(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, RECORDS_FAILURE_MESSAGE.to_string())
            }
        };
        let body = ErrorResponse {
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

/// Depot server errors.
#[derive(Debug, thiserror::Error)]
pub enum DepotServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
