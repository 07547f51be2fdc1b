//! Commands that transform a workspace.
//!
//! Every change to a workspace is expressed as a command. The wire shape is
//! `{"type": "<name>", "payload": <payload>}`; commands without a payload
//! omit it.

use crate::record::Attributes;
use crate::{CustomField, FieldName, Operator, SnapshotPatch, Task, TaskId};
use serde::{Deserialize, Serialize};

/// Payload of a bulk edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdate {
    /// Tasks to edit
    pub task_ids: Vec<TaskId>,
    /// Attributes assigned onto every selected task
    pub update_data: Attributes,
}

/// Payload of an add-filter request.
///
/// An absent or empty `value` clears the field's filter instead of adding one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInput {
    pub field: FieldName,
    pub operator: Operator,
    #[serde(default)]
    pub value: Option<String>,
}

impl FilterInput {
    /// Create a filter request.
    pub fn new(
        field: impl Into<FieldName>,
        operator: impl Into<Operator>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: Some(value.into()),
        }
    }
}

/// A command issued against a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Command {
    /// Insert a task with a generated id
    AddTask(Attributes),
    /// Merge attributes into the task with the same id
    UpdateTask(Task),
    BulkUpdateTasks(BulkUpdate),
    DeleteTask(TaskId),
    BulkDeleteTasks(Vec<TaskId>),
    /// Replace the filter on a field
    AddFilter(FilterInput),
    RemoveFilter(FieldName),
    ClearAllFilters,
    /// Sort by a field, flipping direction if it is already the key
    SetSort(FieldName),
    SetCurrentPage(u32),
    SetPageSize(u32),
    AddCustomField(CustomField),
    RemoveCustomField(FieldName),
    /// Merge a previously persisted snapshot over the current state
    LoadFromStorage(SnapshotPatch),
    ResetToDefaults,
}

impl Command {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTask(_) => "addTask",
            Command::UpdateTask(_) => "updateTask",
            Command::BulkUpdateTasks(_) => "bulkUpdateTasks",
            Command::DeleteTask(_) => "deleteTask",
            Command::BulkDeleteTasks(_) => "bulkDeleteTasks",
            Command::AddFilter(_) => "addFilter",
            Command::RemoveFilter(_) => "removeFilter",
            Command::ClearAllFilters => "clearAllFilters",
            Command::SetSort(_) => "setSort",
            Command::SetCurrentPage(_) => "setCurrentPage",
            Command::SetPageSize(_) => "setPageSize",
            Command::AddCustomField(_) => "addCustomField",
            Command::RemoveCustomField(_) => "removeCustomField",
            Command::LoadFromStorage(_) => "loadFromStorage",
            Command::ResetToDefaults => "resetToDefaults",
        }
    }

    /// Whether the command edits the schema.
    pub fn is_schema_edit(&self) -> bool {
        matches!(
            self,
            Command::AddCustomField(_) | Command::RemoveCustomField(_)
        )
    }
}
