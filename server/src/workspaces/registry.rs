//! Workspace registry.
//!
//! Keeps every workspace that has been touched since startup in memory.
//! Each workspace sits behind its own async mutex so commands against one
//! workspace run one at a time while different workspaces proceed in
//! parallel.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use taskgrid_engine::Workspace;
use tokio::sync::{Mutex, MutexGuard};

/// A hosted workspace and the bookkeeping for its background saves.
#[derive(Debug)]
pub struct HostedWorkspace {
    state: Mutex<Workspace>,
    /// Bumped once per applied command
    revision: AtomicU64,
    /// Newest revision that reached storage
    written: Mutex<u64>,
}

impl HostedWorkspace {
    fn new(workspace: Workspace) -> Self {
        Self {
            state: Mutex::new(workspace),
            revision: AtomicU64::new(0),
            written: Mutex::new(0),
        }
    }

    /// Lock the workspace for reading or replacing it.
    pub async fn lock(&self) -> MutexGuard<'_, Workspace> {
        self.state.lock().await
    }

    /// Take the revision number for a state about to be saved.
    ///
    /// Call it while holding the workspace lock so revisions follow the
    /// order commands were applied in.
    pub fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run `write` for `revision` unless a newer revision is already stored.
    ///
    /// Saves run in the background and can finish out of order; this keeps
    /// an older state from overwriting a newer one. Returns whether `write`
    /// ran.
    pub async fn write_in_order<F, Fut, E>(&self, revision: u64, write: F) -> Result<bool, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let mut written = self.written.lock().await;
        if *written >= revision {
            return Ok(false);
        }
        write().await?;
        *written = revision;
        Ok(true)
    }
}

/// A workspace shared between handlers.
pub type SharedWorkspace = Arc<HostedWorkspace>;

/// Loaded workspaces, keyed by workspace name.
#[derive(Debug, Default)]
pub struct WorkspaceRegistry {
    workspaces: DashMap<String, SharedWorkspace>,
}

impl WorkspaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// The loaded workspace named `key`, if any.
    pub fn get(&self, key: &str) -> Option<SharedWorkspace> {
        self.workspaces.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Register a freshly loaded workspace.
    ///
    /// If another request loaded the same key first, that workspace wins and
    /// is returned instead.
    pub fn insert(&self, key: &str, workspace: Workspace) -> SharedWorkspace {
        let entry = self.workspaces.entry(key.to_string()).or_insert_with(|| {
            tracing::debug!(workspace = %key, "workspace loaded");
            Arc::new(HostedWorkspace::new(workspace))
        });
        Arc::clone(entry.value())
    }

    /// Number of loaded workspaces.
    pub fn loaded(&self) -> usize {
        self.workspaces.len()
    }
}

/// Whether `key` is usable as a workspace name.
pub fn is_valid_workspace_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
