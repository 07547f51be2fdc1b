//! Task records.

use crate::{FieldName, Schema, TaskId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute bag of a task, keyed by field name.
pub type Attributes = BTreeMap<FieldName, Value>;

/// A task in the store.
///
/// On the wire a task is one flat object: `id` next to its attributes,
/// e.g. `{"id": 1, "title": "Ship it", "estimate": 3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct Task {
    /// Immutable identifier assigned at creation
    pub id: TaskId,
    /// Attribute values keyed by field name
    pub attrs: Attributes,
}

impl Task {
    /// Create a task with the given id and attributes.
    pub fn new(id: TaskId, attrs: Attributes) -> Self {
        Self { id, attrs }
    }

    /// Get an attribute value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attrs.get(field)
    }

    /// Set an attribute value, returning the previous one.
    pub fn set(&mut self, field: impl Into<FieldName>, value: Value) -> Option<Value> {
        self.attrs.insert(field.into(), value)
    }

    /// Merge attributes into this task, overwriting existing keys.
    pub fn merge(&mut self, attrs: Attributes) {
        self.attrs.extend(attrs);
    }

    /// Re-tag attribute values to match the schema's declared types.
    pub fn conform(&mut self, schema: &Schema) {
        let attrs = std::mem::take(&mut self.attrs);
        self.attrs = conform_attrs(attrs, schema);
    }
}

/// Re-tag attribute values to match the schema's declared types.
///
/// Keys without a field definition are kept untouched.
pub fn conform_attrs(attrs: Attributes, schema: &Schema) -> Attributes {
    attrs
        .into_iter()
        .map(|(name, value)| {
            let value = match schema.field_type(&name) {
                Some(field_type) => value.conform(field_type),
                None => value,
            };
            (name, value)
        })
        .collect()
}

fn parse_id(value: &serde_json::Value) -> Option<TaskId> {
    if let Some(id) = value.as_u64() {
        return Some(id);
    }
    // Ids written by other clients may come through as integral floats.
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as TaskId)
    } else {
        None
    }
}

impl TryFrom<serde_json::Value> for Task {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(map) = value else {
            return Err("task must be an object".to_string());
        };

        let mut id = None;
        let mut attrs = Attributes::new();
        for (key, raw) in map {
            if key == "id" {
                id = Some(parse_id(&raw).ok_or_else(|| format!("invalid task id: {}", raw))?);
                continue;
            }
            // A null attribute is the same as a missing one.
            if raw.is_null() {
                continue;
            }
            let value = Value::try_from(raw).map_err(|e| format!("attribute '{}': {}", key, e))?;
            attrs.insert(key, value);
        }

        let id = id.ok_or_else(|| "task is missing an id".to_string())?;
        Ok(Task { id, attrs })
    }
}

impl From<Task> for serde_json::Value {
    fn from(task: Task) -> Self {
        let mut map = serde_json::Map::with_capacity(task.attrs.len() + 1);
        map.insert("id".to_string(), serde_json::Value::from(task.id));
        for (key, value) in &task.attrs {
            map.insert(key.clone(), serde_json::Value::from(value));
        }
        serde_json::Value::Object(map)
    }
}
