//! Controller - owns one workspace and its storage.
//!
//! The controller is the only place that talks to storage: it loads once
//! when the session starts and saves after every successful command.

use crate::persistence::{restore, sanitize_for_save, Storage, STORAGE_KEY};
use crate::{error::Result, Command, PageView, Timestamp, Workspace};
use tracing::{debug, error};

/// A workspace bound to a storage backend.
#[derive(Debug)]
pub struct Controller<S: Storage> {
    storage: S,
    key: String,
    state: Workspace,
}

impl<S: Storage> Controller<S> {
    /// Start a session using the default storage key.
    pub fn start(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    /// Start a session stored under `key`.
    ///
    /// A corrupt stored blob is removed and the session starts from the
    /// defaults.
    pub fn with_key(mut storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let raw = match storage.get(&key) {
            Ok(raw) => raw,
            Err(e) => {
                error!(key = %key, error = %e, "failed to read stored workspace");
                None
            }
        };

        let restored = restore(raw.as_deref());
        if restored.discard_blob {
            if let Err(e) = storage.remove(&key) {
                error!(key = %key, error = %e, "failed to remove corrupt workspace");
            }
        }

        Self {
            storage,
            key,
            state: restored.workspace,
        }
    }

    /// Apply a command, then persist the result.
    ///
    /// Storage failures are logged and do not fail the command.
    pub fn dispatch(&mut self, command: Command, now: Timestamp) -> Result<()> {
        let name = command.name();
        let reset = matches!(command, Command::ResetToDefaults);
        self.state = self.state.apply(command, now)?;
        debug!(command = name, tasks = self.state.tasks().len(), "applied command");

        if reset {
            if let Err(e) = self.storage.remove(&self.key) {
                error!(key = %self.key, error = %e, "failed to clear stored workspace");
            }
            return Ok(());
        }
        self.save();
        Ok(())
    }

    fn save(&mut self) {
        let Some(snapshot) = sanitize_for_save(&self.state) else {
            return;
        };
        let result = snapshot
            .to_json()
            .and_then(|blob| self.storage.set(&self.key, blob));
        if let Err(e) = result {
            error!(key = %self.key, error = %e, "failed to save workspace");
        }
    }

    pub fn state(&self) -> &Workspace {
        &self.state
    }

    /// The page currently on screen.
    pub fn view(&self) -> PageView {
        self.state.page_view()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// End the session and hand back the storage.
    pub fn into_storage(self) -> S {
        self.storage
    }
}
