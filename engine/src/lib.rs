//! # TaskGrid Engine
//!
//! A schema-driven query and mutation engine for task lists with
//! user-defined fields.
//!
//! This crate holds the core logic behind a task table: the field schema,
//! the task collection, filtering, sorting, pagination and the guard that
//! keeps persisted state consistent. Every command is a pure transform from
//! one workspace to the next.
//!
//! ## Design Principles
//!
//! - **No IO**: The engine never touches files, network or clocks; callers
//!   pass the time in and plug storage in through [`Storage`]
//! - **Whole commands**: A command either applies completely or returns an
//!   error and leaves the workspace as it was
//! - **Permissive reads**: Unknown operators pass, missing values sort as
//!   empty, and nothing on the read path fails
//!
//! ## Core Concepts
//!
//! ### Schema
//!
//! The [`Schema`] is an ordered list of [`CustomField`]s. Three permanent
//! fields (`title`, `priority`, `status`) are always present. Adding a
//! field gives every existing task the zero value for its [`FieldType`].
//!
//! ### Tasks
//!
//! A [`Task`] is an id plus an attribute bag of [`Value`]s keyed by field
//! name. The [`TaskStore`] keeps tasks in insertion order and owns id
//! allocation.
//!
//! ### Views
//!
//! Reading a workspace runs the active [`FilterSet`] (ANDed), sorts with
//! the single [`SortState`], and cuts a page according to [`ViewState`].
//! [`Workspace::page_view`] returns the result.
//!
//! ### Persistence
//!
//! [`persistence::sanitize_for_save`] and [`persistence::validate_on_load`]
//! guard the stored [`WorkspaceSnapshot`]. A [`Controller`] ties a
//! workspace to a [`Storage`] backend.
//!
//! ## Quick Start
//!
//! ```rust
//! use taskgrid_engine::{
//!     store::attributes, Command, CustomField, FieldType, FilterInput, Value, Workspace,
//! };
//!
//! // 1. Start from the built-in fields
//! let ws = Workspace::new();
//!
//! // 2. Add tasks
//! let ws = ws
//!     .apply(Command::AddTask(attributes([("title", "Write docs")])), 1_000)
//!     .unwrap()
//!     .apply(Command::AddTask(attributes([("title", "Ship release")])), 1_001)
//!     .unwrap();
//!
//! // 3. Add a field; existing tasks get its zero value
//! let ws = ws
//!     .apply(
//!         Command::AddCustomField(CustomField::new("estimate", "Estimate", FieldType::Number)),
//!         1_002,
//!     )
//!     .unwrap();
//! assert_eq!(ws.tasks()[0].get("estimate"), Some(&Value::Num(0.0)));
//!
//! // 4. Filter and read a page
//! let ws = ws
//!     .apply(
//!         Command::AddFilter(FilterInput::new("title", "contains", "ship")),
//!         1_003,
//!     )
//!     .unwrap();
//! let view = ws.page_view();
//! assert_eq!(view.total_count, 1);
//! ```
//!
//! ## FFI
//!
//! The [`ffi`] module provides C-compatible functions for use from other
//! languages. All data is exchanged as JSON strings.

pub mod command;
pub mod controller;
pub mod error;
pub mod ffi;
pub mod filter;
pub mod page;
pub mod persistence;
pub mod record;
pub mod schema;
pub mod snapshot;
pub mod sort;
pub mod store;
pub mod value;
pub mod workspace;

// Re-export main types at crate root
pub use command::{BulkUpdate, Command, FilterInput};
pub use controller::Controller;
pub use error::Error;
pub use filter::{evaluate, Filter, FilterSet, Operator, RESERVED_BOOLEAN_FIELD};
pub use page::{paginate, total_pages, PageSize, ViewState};
pub use persistence::{MemoryStorage, Restored, Storage, STORAGE_KEY};
pub use record::{Attributes, Task};
pub use schema::{CustomField, FieldType, Schema, PERMANENT_FIELDS};
pub use snapshot::{SnapshotPatch, WorkspaceSnapshot};
pub use sort::{sort_tasks, SortOrder, SortState};
pub use store::TaskStore;
pub use value::Value;
pub use workspace::{PageView, Workspace};

/// Type aliases for clarity
pub type TaskId = u64;
pub type FieldName = String;
pub type Timestamp = u64;
