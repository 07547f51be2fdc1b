//! Hosted workspaces.

mod registry;

pub use registry::*;
