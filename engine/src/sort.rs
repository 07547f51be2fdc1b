//! Type-aware ordering of tasks.

use crate::{FieldName, FieldType, Schema, Task, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Apply this direction to an ascending ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// The single active sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub sort_by: FieldName,
    pub sort_order: SortOrder,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            sort_by: "title".to_string(),
            sort_order: SortOrder::Asc,
        }
    }
}

impl SortState {
    /// Sort by `field`: flip the direction if it is already the key,
    /// otherwise switch to it ascending.
    pub fn toggle(&mut self, field: &str) {
        if self.sort_by == field {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_by = field.to_string();
            self.sort_order = SortOrder::Asc;
        }
    }
}

/// Compare two tasks on `field` according to its declared type.
///
/// Falsy and missing values read as empty. Numbers coerce with NaN as `0`,
/// checkboxes by truthiness (`false` first ascending), and everything else
/// compares as strings.
pub fn compare(a: &Task, b: &Task, field: &str, order: SortOrder, schema: &Schema) -> Ordering {
    let a = a.get(field).filter(|v| v.is_truthy());
    let b = b.get(field).filter(|v| v.is_truthy());

    let ordering = match schema.field_type(field) {
        Some(FieldType::Number) => sort_number(a).total_cmp(&sort_number(b)),
        Some(FieldType::Checkbox) => a.is_some().cmp(&b.is_some()),
        _ => collate(&sort_string(a), &sort_string(b)),
    };
    order.apply(ordering)
}

fn sort_number(value: Option<&Value>) -> f64 {
    let n = value.map_or(0.0, Value::to_number);
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

fn sort_string(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}

/// Case-insensitive string order; on a tie lowercase sorts first.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Sort tasks in place by `field`.
///
/// Ties are broken by id, in the same direction as `order`, so ascending and
/// descending results are exact mirrors of each other.
pub fn sort_tasks(tasks: &mut [&Task], field: &str, order: SortOrder, schema: &Schema) {
    tasks.sort_by(|a, b| {
        compare(a, b, field, order, schema).then_with(|| order.apply(a.id.cmp(&b.id)))
    });
}
