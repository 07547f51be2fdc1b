//! Workspace handlers - load, command, read and reset hosted workspaces.

use crate::db;
use crate::error::{AppError, Result};
use crate::workspaces::{is_valid_workspace_key, SharedWorkspace};
use crate::AppState;
use taskgrid_engine::persistence::{restore, sanitize_for_save};
use taskgrid_engine::{Command, PageView, Workspace, WorkspaceSnapshot};

/// Current time in milliseconds.
fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Find a workspace in memory, or load it from storage.
///
/// With `create` set, a key that was never stored starts from the defaults;
/// without it, such a key is not found. A corrupt blob is deleted and the
/// workspace starts from the defaults.
async fn load(state: &AppState, key: &str, create: bool) -> Result<SharedWorkspace> {
    if !is_valid_workspace_key(key) {
        return Err(AppError::BadRequest(format!("invalid workspace key: {}", key)));
    }
    if let Some(hosted) = state.workspaces.get(key) {
        return Ok(hosted);
    }

    let storage_key = state.config.storage_key(key);
    let raw = db::get_snapshot(&state.pool, &storage_key).await?;
    if raw.is_none() && !create {
        return Err(AppError::NotFound(format!("workspace {}", key)));
    }

    let restored = restore(raw.as_deref());
    if restored.discard_blob {
        tracing::warn!(workspace = %key, "removing corrupt snapshot");
        db::delete_snapshot(&state.pool, &storage_key).await?;
    }
    Ok(state.workspaces.insert(key, restored.workspace))
}

/// Save `workspace` in the background.
///
/// Nothing is written when the workspace has no tasks or no fields. A
/// reset removes the stored blob instead.
fn persist(
    state: &AppState,
    key: &str,
    hosted: &SharedWorkspace,
    workspace: &Workspace,
    reset: bool,
) {
    let blob = if reset {
        None
    } else {
        let Some(snapshot) = sanitize_for_save(workspace) else {
            return;
        };
        match snapshot.to_json() {
            Ok(blob) => Some(blob),
            Err(e) => {
                tracing::error!(workspace = %key, error = %e, "failed to serialize workspace");
                return;
            }
        }
    };

    let revision = hosted.next_revision();
    let hosted = SharedWorkspace::clone(hosted);
    let pool = state.pool.clone();
    let storage_key = state.config.storage_key(key);

    tokio::spawn(async move {
        let result = hosted
            .write_in_order(revision, || async {
                match &blob {
                    Some(blob) => db::put_snapshot(&pool, &storage_key, blob).await,
                    None => db::delete_snapshot(&pool, &storage_key).await,
                }
            })
            .await;

        match result {
            Ok(true) => tracing::debug!(key = %storage_key, revision, "workspace saved"),
            Ok(false) => tracing::debug!(key = %storage_key, revision, "skipped stale save"),
            Err(e) => tracing::error!(key = %storage_key, error = %e, "failed to save workspace"),
        }
    });
}

/// Apply a command to a workspace and return the page now on screen.
pub async fn handle_command(state: &AppState, key: &str, command: Command) -> Result<PageView> {
    let hosted = load(state, key, true).await?;
    let mut workspace = hosted.lock().await;

    let name = command.name();
    let reset = matches!(command, Command::ResetToDefaults);
    *workspace = workspace.apply(command, now_millis())?;
    tracing::info!(
        workspace = %key,
        command = name,
        tasks = workspace.tasks().len(),
        "command applied"
    );

    persist(state, key, &hosted, &workspace, reset);
    Ok(workspace.page_view())
}

/// Return to the built-in defaults and drop the stored blob.
pub async fn handle_reset(state: &AppState, key: &str) -> Result<PageView> {
    handle_command(state, key, Command::ResetToDefaults).await
}

/// The page currently on screen.
pub async fn handle_view(state: &AppState, key: &str) -> Result<PageView> {
    let hosted = load(state, key, false).await?;
    let workspace = hosted.lock().await;
    Ok(workspace.page_view())
}

/// The full workspace state.
pub async fn handle_snapshot(state: &AppState, key: &str) -> Result<WorkspaceSnapshot> {
    let hosted = load(state, key, false).await?;
    let workspace = hosted.lock().await;
    Ok(WorkspaceSnapshot::capture(&workspace))
}
