//! Snapshot types for persisting and restoring workspace state.
//!
//! A snapshot is the single object stored under the storage key:
//! `{tasks, customFields, activeFilters, sortBy, sortOrder, currentPage, pageSize}`.

use crate::{
    error::Result, CustomField, Error, FieldName, Filter, PageSize, SortOrder, Task, Workspace,
};
use serde::{Deserialize, Serialize};

/// A complete, point-in-time snapshot of a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub tasks: Vec<Task>,
    pub custom_fields: Vec<CustomField>,
    pub active_filters: Vec<Filter>,
    pub sort_by: FieldName,
    pub sort_order: SortOrder,
    pub current_page: u32,
    pub page_size: PageSize,
}

impl WorkspaceSnapshot {
    /// Capture the state of a workspace.
    pub fn capture(workspace: &Workspace) -> Self {
        Self {
            tasks: workspace.tasks().to_vec(),
            custom_fields: workspace.schema().fields().to_vec(),
            active_filters: workspace.filters().iter().cloned().collect(),
            sort_by: workspace.sort().sort_by.clone(),
            sort_order: workspace.sort().sort_order,
            current_page: workspace.view().current_page,
            page_size: workspace.view().page_size,
        }
    }

    /// Number of tasks in the snapshot.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON. Every key must be present.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }
}

/// A possibly partial snapshot.
///
/// Loading merges it over the current state: present keys override, absent
/// keys leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<CustomField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_filters: Option<Vec<Filter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<FieldName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<PageSize>,
}

impl From<WorkspaceSnapshot> for SnapshotPatch {
    fn from(snapshot: WorkspaceSnapshot) -> Self {
        Self {
            tasks: Some(snapshot.tasks),
            custom_fields: Some(snapshot.custom_fields),
            active_filters: Some(snapshot.active_filters),
            sort_by: Some(snapshot.sort_by),
            sort_order: Some(snapshot.sort_order),
            current_page: Some(snapshot.current_page),
            page_size: Some(snapshot.page_size),
        }
    }
}
