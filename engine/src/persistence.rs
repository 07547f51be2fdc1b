//! Guarding what goes into and comes out of storage.
//!
//! A stored blob with a missing or malformed field list is discarded whole
//! and never partially repaired. Field entries of an unknown type are the
//! one exception: they are skipped and the rest of the blob loads.

use crate::workspace::is_loadable_field;
use crate::{
    error::Result, Command, Error, FieldType, SnapshotPatch, Workspace, WorkspaceSnapshot,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Key the workspace snapshot is stored under.
pub const STORAGE_KEY: &str = "taskManagementApp";

/// Prepare a workspace for saving.
///
/// Returns `None` when there is nothing worth writing: no tasks, or no
/// field definitions. Unusable field definitions are stripped.
pub fn sanitize_for_save(workspace: &Workspace) -> Option<WorkspaceSnapshot> {
    if workspace.tasks().is_empty() || workspace.schema().is_empty() {
        return None;
    }
    let mut snapshot = WorkspaceSnapshot::capture(workspace);
    snapshot.custom_fields.retain(is_loadable_field);
    Some(snapshot)
}

/// Check a stored blob before loading it.
///
/// Fails with [`Error::CorruptedSnapshot`] if the blob is not a JSON object,
/// if `customFields` is missing or not an array, or if any field entry
/// lacks a name or label or has a name containing `count`. Entries whose
/// `type` is missing or unknown are dropped; the rest of the blob is kept.
pub fn validate_on_load(raw: &str) -> Result<SnapshotPatch> {
    let mut value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| Error::CorruptedSnapshot(e.to_string()))?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| Error::CorruptedSnapshot("snapshot is not an object".into()))?;

    let fields = object
        .get_mut("customFields")
        .ok_or_else(|| Error::CorruptedSnapshot("customFields is missing".into()))?
        .as_array_mut()
        .ok_or_else(|| Error::CorruptedSnapshot("customFields is not an array".into()))?;
    for field in fields.iter() {
        check_stored_field(field)?;
    }
    fields.retain(|field| {
        let typed = has_known_type(field);
        if !typed {
            debug!(field = ?field.get("name"), "dropping stored field without a known type");
        }
        typed
    });

    serde_json::from_value(value).map_err(|e| Error::CorruptedSnapshot(e.to_string()))
}

fn has_known_type(field: &serde_json::Value) -> bool {
    field
        .get("type")
        .is_some_and(|t| serde_json::from_value::<FieldType>(t.clone()).is_ok())
}

fn check_stored_field(field: &serde_json::Value) -> Result<()> {
    let text = |key: &str| {
        field
            .get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
    };
    let name = text("name")
        .ok_or_else(|| Error::CorruptedSnapshot("field without a name".into()))?;
    if text("label").is_none() {
        return Err(Error::CorruptedSnapshot(format!(
            "field '{}' has no label",
            name
        )));
    }
    if name.contains("count") {
        return Err(Error::CorruptedSnapshot(format!(
            "field '{}' is not allowed",
            name
        )));
    }
    Ok(())
}

/// Outcome of restoring a workspace from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    pub workspace: Workspace,
    /// The stored blob was corrupt and should be removed
    pub discard_blob: bool,
}

/// Build the starting workspace from whatever was stored.
///
/// An absent blob gives the defaults. A corrupt blob also gives the
/// defaults and asks the caller to remove it.
pub fn restore(raw: Option<&str>) -> Restored {
    let Some(raw) = raw else {
        return Restored {
            workspace: Workspace::new(),
            discard_blob: false,
        };
    };

    let loaded = validate_on_load(raw)
        .and_then(|patch| Workspace::new().apply(Command::LoadFromStorage(patch), 0));
    match loaded {
        Ok(workspace) => {
            debug!(tasks = workspace.tasks().len(), "restored workspace");
            Restored {
                workspace,
                discard_blob: false,
            }
        }
        Err(e) => {
            warn!(error = %e, "discarding stored workspace");
            Restored {
                workspace: Workspace::new(),
                discard_blob: true,
            }
        }
    }
}

/// A key-value blob store.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, blob: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process [`Storage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage already holding `blob` under `key`.
    pub fn with_blob(key: &str, blob: impl Into<String>) -> Self {
        let mut storage = Self::new();
        storage.blobs.insert(key.to_string(), blob.into());
        storage
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, blob: String) -> Result<()> {
        self.blobs.insert(key.to_string(), blob);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}
