//! Request handlers for hosted workspaces.

mod workspace;

pub use workspace::*;
