//! HTTP server mode exposing the export trigger
//!
//! `GET /admin/analytics/export` starts exactly one pipeline run. The run
//! executes in a background task; the caller either gets the run handle
//! back immediately or, with `?redirect=true`, is redirected to the run's
//! status page.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::pipeline::{ExportPipeline, RunReport};

/// Status of a triggered export run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// The run is still executing
    Running,
    /// The run finished successfully
    Succeeded {
        /// Final run report
        report: RunReport,
    },
    /// The run failed; the backlog is untouched and a re-trigger is safe
    Failed {
        /// Terminal error message
        error: String,
    },
}

/// App state shared across handlers
struct AppState {
    pipeline: Arc<ExportPipeline>,
    runs: RwLock<HashMap<String, RunStatus>>,
    run_counter: AtomicU64,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Query parameters of the trigger endpoint
#[derive(Debug, Deserialize)]
struct ExportParams {
    /// Redirect the caller to the run's status page
    #[serde(default)]
    redirect: bool,
}

/// Build the server router around a pipeline handle
pub fn build_router(pipeline: Arc<ExportPipeline>) -> Router {
    let state = Arc::new(AppState {
        pipeline,
        runs: RwLock::new(HashMap::new()),
        run_counter: AtomicU64::new(0),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/admin/analytics/export", get(trigger_export))
        .route("/admin/analytics/runs/:id", get(run_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(pipeline: Arc<ExportPipeline>, port: u16) -> Result<()> {
    let app = build_router(pipeline);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Start one export run
async fn trigger_export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Response {
    let run_id = format!(
        "run-{}-{}",
        chrono::Utc::now().format("%Y%m%dT%H%M%S"),
        state.run_counter.fetch_add(1, Ordering::SeqCst)
    );

    state
        .runs
        .write()
        .await
        .insert(run_id.clone(), RunStatus::Running);

    info!("Triggered export {run_id}");

    let task_state = Arc::clone(&state);
    let task_run_id = run_id.clone();
    tokio::spawn(async move {
        let status = match task_state.pipeline.run().await {
            Ok(report) => RunStatus::Succeeded { report },
            Err(e) => {
                error!("Export {task_run_id} failed: {e}");
                RunStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        task_state
            .runs
            .write()
            .await
            .insert(task_run_id, status);
    });

    if params.redirect {
        Redirect::to(&format!("/admin/analytics/runs/{run_id}")).into_response()
    } else {
        Json(ApiResponse::success(json!({ "run_id": run_id }))).into_response()
    }
}

/// Report the status of a run
async fn run_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.runs.read().await.get(&id) {
        Some(status) => Json(ApiResponse::success(status.clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("Unknown run: {id}"))),
        )
            .into_response(),
    }
}
