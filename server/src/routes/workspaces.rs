//! Workspace endpoint routes.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use taskgrid_engine::{Command, PageView, WorkspaceSnapshot};

use crate::error::Result;
use crate::handlers::{handle_command, handle_reset, handle_snapshot, handle_view};
use crate::AppState;

/// Create workspace routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workspaces/{key}", get(snapshot_handler))
        .route("/workspaces/{key}/view", get(view_handler))
        .route("/workspaces/{key}/commands", post(command_handler))
        .route("/workspaces/{key}/reset", post(reset_handler))
}

/// GET /workspaces/{key} - Full workspace state.
async fn snapshot_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<WorkspaceSnapshot>> {
    let snapshot = handle_snapshot(&state, &key).await?;
    Ok(Json(snapshot))
}

/// GET /workspaces/{key}/view - Current page of tasks.
async fn view_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<PageView>> {
    let view = handle_view(&state, &key).await?;
    Ok(Json(view))
}

/// POST /workspaces/{key}/commands - Apply one command.
async fn command_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(command): Json<Command>,
) -> Result<Json<PageView>> {
    let view = handle_command(&state, &key, command).await?;
    Ok(Json(view))
}

/// POST /workspaces/{key}/reset - Back to the built-in defaults.
async fn reset_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<PageView>> {
    let view = handle_reset(&state, &key).await?;
    Ok(Json(view))
}
