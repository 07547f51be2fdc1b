//! Error types for the TaskGrid engine.

use crate::FieldName;
use thiserror::Error;

/// All possible errors from the TaskGrid engine.
///
/// Every error leaves the workspace untouched: a failed command never
/// partially applies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Schema validation errors
    #[error("field name is required")]
    EmptyFieldName,

    #[error("field label is required")]
    EmptyFieldLabel,

    #[error("field name already exists: {0}")]
    DuplicateField(FieldName),

    #[error(
        "invalid field name '{0}': only letters, numbers, and underscores are allowed, \
         and it must start with a letter or underscore"
    )]
    InvalidFieldName(FieldName),

    #[error("single select field '{0}' must have at least one option")]
    MissingOptions(FieldName),

    #[error("duplicate option '{option}' for field '{field}'")]
    DuplicateOption { field: FieldName, option: String },

    #[error("blank option for field '{0}'")]
    BlankOption(FieldName),

    // Task validation errors
    #[error("{0} is required")]
    MissingRequiredField(FieldName),

    // View errors
    #[error("invalid page size: {0} (expected 10, 20 or 50)")]
    InvalidPageSize(u32),

    #[error("invalid page: {0} (pages start at 1)")]
    InvalidPage(u32),

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("corrupted snapshot: {0}")]
    CorruptedSnapshot(String),

    // Storage errors
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Whether this error rejects a schema edit.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyFieldName
                | Error::EmptyFieldLabel
                | Error::DuplicateField(_)
                | Error::InvalidFieldName(_)
                | Error::MissingOptions(_)
                | Error::DuplicateOption { .. }
                | Error::BlankOption(_)
                | Error::MissingRequiredField(_)
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
