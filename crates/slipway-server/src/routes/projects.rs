//! Project lifecycle routes: create, deploy (progress stream), teardown.

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::Serialize;
use slipway_core::types::{CleanupResult, ConflictKind, CreateProjectRequest};
use slipway_core::{Error, ProgressEvent};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::warn;

use crate::state::AppState;

/// Create project router
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/projects", post(create_project).delete(teardown_all))
        .route("/projects/{name}", delete(teardown_project))
        .route("/projects/{name}/deploy", get(deploy_project))
}

/// Body of a 409 response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResponse {
    pub conflict_type: ConflictKind,
    pub message: String,
}

/// Map a core error onto an HTTP response. Validation and conflict errors
/// were detected before any side effect, so they are safe to surface
/// directly.
fn error_response(err: Error) -> Response {
    match err {
        Error::Conflict { ref kind, .. } => {
            let body = ConflictResponse {
                conflict_type: *kind,
                message: err.to_string(),
            };
            (StatusCode::CONFLICT, Json(body)).into_response()
        }
        Error::InvalidName(_) | Error::ReservedNamespace(_) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Error::ProjectNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
        other => {
            warn!("Request failed: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
        }
    }
}

/// Create a new project
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> Response {
    match state.lifecycle.create(req).await {
        Ok(resp) => (StatusCode::CREATED, Json(resp)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Stream a project's deployment as newline-delimited JSON events. Each
/// line carries exactly one of `log`, `error` or `success`; the stream ends
/// after the first terminal event.
pub async fn deploy_project(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    // Operating on an unknown identifier is a synchronous 404, not a
    // one-event stream.
    if let Err(e) = state.store.get(&name) {
        return error_response(e);
    }

    let rx = state.provisioner.provision(&name);
    let stream = UnboundedReceiverStream::new(rx).map(|event: ProgressEvent| {
        let mut line = serde_json::to_string(&event)
            .unwrap_or_else(|e| format!(r#"{{"error":"event serialization failed: {e}"}}"#));
        line.push('\n');
        Ok::<_, Infallible>(Bytes::from(line))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|e| {
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        })
}

/// Tear down one project
pub async fn teardown_project(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<CleanupResult> {
    Json(state.teardown.teardown(&name).await)
}

/// Tear down every known project
pub async fn teardown_all(State(state): State<Arc<AppState>>) -> Response {
    match state.teardown.teardown_all().await {
        Ok(results) => Json(results).into_response(),
        Err(e) => error_response(e),
    }
}
