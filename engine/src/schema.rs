//! Schema definition and validation.
//!
//! The schema is the ordered list of custom fields that every task is shaped
//! against. It is edited at run time; the workspace keeps tasks and filters in
//! step with it.

use crate::{error::Result, Error, FieldName, Operator, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Fields that exist in every schema and can never be removed.
pub const PERMANENT_FIELDS: [&str; 3] = ["title", "priority", "status"];

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));

/// Field types supported in schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Checkbox,
    /// One value drawn from the field's options
    SingleSelect,
}

impl FieldType {
    /// Value back-filled into existing tasks when a field of this type is added.
    pub fn zero_value(self) -> Value {
        match self {
            FieldType::Checkbox => Value::Bool(false),
            FieldType::Number => Value::Num(0.0),
            FieldType::Text => Value::Text(String::new()),
            FieldType::SingleSelect => Value::Choice(String::new()),
        }
    }

    /// Operators a filter form offers for this type.
    pub fn operators(self) -> &'static [Operator] {
        match self {
            FieldType::Text => &[
                Operator::Contains,
                Operator::Equals,
                Operator::StartsWith,
                Operator::EndsWith,
            ],
            FieldType::Number => &[
                Operator::Equals,
                Operator::GreaterThan,
                Operator::LessThan,
                Operator::GreaterEqual,
                Operator::LessEqual,
            ],
            FieldType::SingleSelect => &[Operator::Equals, Operator::NotEquals],
            FieldType::Checkbox => &[Operator::Equals],
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "Text"),
            FieldType::Number => write!(f, "Number"),
            FieldType::Checkbox => write!(f, "Checkbox"),
            FieldType::SingleSelect => write!(f, "Single Select"),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Definition of one custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    /// Identifier used as the attribute key on tasks
    pub name: FieldName,
    /// Human-readable label
    pub label: String,
    /// Declared value type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the task form must collect a value
    #[serde(default)]
    pub required: bool,
    /// Whether the field can be filtered on
    #[serde(default = "default_true")]
    pub filterable: bool,
    /// Whether the field can be sorted on
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Allowed values for single select fields, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl CustomField {
    /// Create an optional, filterable, sortable field with no options.
    pub fn new(name: impl Into<FieldName>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            filterable: true,
            sortable: true,
            options: Vec::new(),
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the option list.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether the field is filterable.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Set whether the field is sortable.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Whether this is one of the permanent fields.
    pub fn is_permanent(&self) -> bool {
        is_permanent(&self.name)
    }
}

/// Whether `name` is one of the permanent fields.
pub fn is_permanent(name: &str) -> bool {
    PERMANENT_FIELDS.contains(&name)
}

/// Whether `name` is a valid field identifier.
pub fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME_RE.is_match(name)
}

/// The ordered list of field definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<CustomField>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Schema {
    /// Create a schema from already-trusted definitions.
    ///
    /// No validation is performed; use [`Schema::validate_new_field`] for
    /// definitions coming from user input.
    pub fn new(fields: Vec<CustomField>) -> Self {
        Self { fields }
    }

    /// The built-in schema: the three permanent fields.
    pub fn defaults() -> Self {
        Self::new(vec![
            CustomField::new("title", "Task Title", FieldType::Text).required(),
            CustomField::new("priority", "Priority", FieldType::SingleSelect)
                .required()
                .with_options(["high", "medium", "low", "none"]),
            CustomField::new("status", "Status", FieldType::SingleSelect)
                .required()
                .with_options(["not_started", "in_progress", "completed", "none"]),
        ])
    }

    /// All field definitions in order.
    pub fn fields(&self) -> &[CustomField] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field by exact name.
    pub fn get(&self, name: &str) -> Option<&CustomField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared type of a field, if present.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.get(name).map(|f| f.field_type)
    }

    /// Whether a field with this name exists, ignoring case.
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.fields.iter().any(|f| f.name.to_lowercase() == name)
    }

    /// Fields that can be filtered on.
    pub fn filterable_fields(&self) -> impl Iterator<Item = &CustomField> {
        self.fields.iter().filter(|f| f.filterable)
    }

    /// Fields that can be sorted on.
    pub fn sortable_fields(&self) -> impl Iterator<Item = &CustomField> {
        self.fields.iter().filter(|f| f.sortable)
    }

    /// Validate a new field definition against this schema.
    ///
    /// Returns the definition as it will be stored: name lowercased and
    /// options trimmed.
    pub fn validate_new_field(&self, def: CustomField) -> Result<CustomField> {
        if def.name.trim().is_empty() {
            return Err(Error::EmptyFieldName);
        }
        if def.label.trim().is_empty() {
            return Err(Error::EmptyFieldLabel);
        }
        if self.contains_ignore_case(&def.name) {
            return Err(Error::DuplicateField(def.name));
        }
        if !is_valid_field_name(&def.name) {
            return Err(Error::InvalidFieldName(def.name));
        }

        let name = def.name.to_lowercase();
        let mut options = Vec::with_capacity(def.options.len());
        let mut seen = HashSet::new();
        for option in &def.options {
            let option = option.trim();
            if option.is_empty() {
                return Err(Error::BlankOption(name));
            }
            if !seen.insert(option.to_string()) {
                return Err(Error::DuplicateOption {
                    field: name,
                    option: option.to_string(),
                });
            }
            options.push(option.to_string());
        }

        if def.field_type == FieldType::SingleSelect && options.is_empty() {
            return Err(Error::MissingOptions(name));
        }

        Ok(CustomField {
            name,
            options,
            ..def
        })
    }

    /// Append a definition that has already been validated.
    pub(crate) fn push(&mut self, field: CustomField) {
        self.fields.push(field);
    }

    /// Remove a field by name.
    ///
    /// Permanent fields are never removed. Returns the removed definition.
    pub(crate) fn remove(&mut self, name: &str) -> Option<CustomField> {
        if is_permanent(name) {
            return None;
        }
        let index = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(index))
    }

    /// Keep only the fields matching `keep`.
    pub(crate) fn retain(&mut self, keep: impl FnMut(&CustomField) -> bool) {
        self.fields.retain(keep);
    }

    /// Put back any permanent field missing from the list.
    ///
    /// Each one goes to its built-in position, or the end if the list is
    /// shorter. Returns the names that were added.
    pub(crate) fn restore_permanent(&mut self) -> Vec<FieldName> {
        let mut added = Vec::new();
        for (index, field) in Self::defaults().fields.into_iter().enumerate() {
            if self.fields.iter().any(|f| f.name == field.name) {
                continue;
            }
            added.push(field.name.clone());
            let at = index.min(self.fields.len());
            self.fields.insert(at, field);
        }
        added
    }

    /// Check that every required field has a truthy value in `attrs`.
    ///
    /// This mirrors what a task form checks before submitting; the store does
    /// not call it.
    pub fn check_required(&self, attrs: &BTreeMap<FieldName, Value>) -> Result<()> {
        for field in self.fields.iter().filter(|f| f.required) {
            let present = attrs.get(&field.name).is_some_and(Value::is_truthy);
            if !present {
                return Err(Error::MissingRequiredField(field.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_permanent_fields() {
        let schema = Schema::defaults();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, PERMANENT_FIELDS);
        assert!(schema.fields().iter().all(|f| f.required && f.is_permanent()));
        assert_eq!(schema.get("priority").unwrap().options.len(), 4);
    }

    #[test]
    fn validate_accepts_and_normalizes() {
        let schema = Schema::defaults();
        let def = CustomField::new("Estimate_Hours", "Estimate", FieldType::Number);
        let field = schema.validate_new_field(def).unwrap();
        assert_eq!(field.name, "estimate_hours");
    }

    #[test]
    fn validate_rejects_empty_name_and_label() {
        let schema = Schema::defaults();
        let result = schema.validate_new_field(CustomField::new("  ", "X", FieldType::Text));
        assert_eq!(result, Err(Error::EmptyFieldName));

        let result = schema.validate_new_field(CustomField::new("x", "", FieldType::Text));
        assert_eq!(result, Err(Error::EmptyFieldLabel));
    }

    #[test]
    fn validate_rejects_duplicate_any_case() {
        let schema = Schema::defaults();
        let result = schema.validate_new_field(CustomField::new("TITLE", "T", FieldType::Text));
        assert!(matches!(result, Err(Error::DuplicateField(n)) if n == "TITLE"));
    }

    #[test]
    fn validate_rejects_bad_identifiers() {
        let schema = Schema::defaults();
        for name in ["1abc", "has space", "dash-name", "émoji"] {
            let result = schema.validate_new_field(CustomField::new(name, "L", FieldType::Text));
            assert!(
                matches!(result, Err(Error::InvalidFieldName(_))),
                "accepted {}",
                name
            );
        }
        assert!(is_valid_field_name("_private9"));
    }

    #[test]
    fn validate_single_select_options() {
        let schema = Schema::defaults();

        let result =
            schema.validate_new_field(CustomField::new("size", "Size", FieldType::SingleSelect));
        assert!(matches!(result, Err(Error::MissingOptions(_))));

        let result = schema.validate_new_field(
            CustomField::new("size", "Size", FieldType::SingleSelect).with_options(["S", " S "]),
        );
        assert!(matches!(result, Err(Error::DuplicateOption { option, .. }) if option == "S"));

        let result = schema.validate_new_field(
            CustomField::new("size", "Size", FieldType::SingleSelect).with_options(["S", " "]),
        );
        assert!(matches!(result, Err(Error::BlankOption(_))));
    }

    #[test]
    fn permanent_fields_are_not_removed() {
        let mut schema = Schema::defaults();
        for name in PERMANENT_FIELDS {
            assert!(schema.remove(name).is_none());
        }
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn check_required_uses_truthiness() {
        let schema = Schema::defaults();
        let mut attrs = BTreeMap::new();
        attrs.insert("title".to_string(), Value::from("Write docs"));
        attrs.insert("priority".to_string(), Value::from(""));
        attrs.insert("status".to_string(), Value::from("none"));

        let result = schema.check_required(&attrs);
        assert_eq!(result, Err(Error::MissingRequiredField("priority".into())));

        attrs.insert("priority".to_string(), Value::from("low"));
        assert!(schema.check_required(&attrs).is_ok());
    }

    #[test]
    fn operators_per_type() {
        assert_eq!(FieldType::Checkbox.operators(), &[Operator::Equals]);
        assert!(FieldType::Number.operators().contains(&Operator::GreaterEqual));
        assert!(!FieldType::Text.operators().contains(&Operator::NotEquals));
    }

    #[test]
    fn field_json_shape() {
        let json = r#"{"name":"title","label":"Task Title","type":"text","required":true}"#;
        let field: CustomField = serde_json::from_str(json).unwrap();
        assert!(field.filterable && field.sortable);
        assert!(field.options.is_empty());

        let out = serde_json::to_value(&field).unwrap();
        assert_eq!(out["type"], "text");
        assert!(out.get("options").is_none());
    }

    #[test]
    fn field_type_display() {
        assert_eq!(FieldType::SingleSelect.to_string(), "Single Select");
        assert_eq!(FieldType::Number.to_string(), "Number");
    }
}
