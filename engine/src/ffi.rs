//! FFI layer for UI integration.
//!
//! This module provides C-compatible functions that a presentation layer
//! (Dart FFI, Swift, Kotlin) calls to drive a workspace. All data crosses the
//! boundary as JSON strings.
//!
//! # Memory Management
//!
//! - Strings returned by `taskgrid_*` functions are allocated by Rust
//! - Caller must free them with `taskgrid_string_free`
//! - Workspace pointers must be freed with `taskgrid_workspace_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::persistence::{restore, sanitize_for_save};
use crate::{Command, FieldType, Workspace, WorkspaceSnapshot};
use std::ffi::{c_char, CStr, CString};
use std::ptr;

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

fn error_json(message: impl Into<String>) -> *mut c_char {
    to_c_string(FfiResult::<()>::err(message).to_json())
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `taskgrid_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => CString::from(c"{\"error\":\"string contained null bytes\"}").into_raw(),
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

// ============================================================================
// Workspace Lifecycle
// ============================================================================

/// Create a workspace with the built-in fields.
///
/// Caller must free the returned pointer with `taskgrid_workspace_free`.
#[no_mangle]
pub extern "C" fn taskgrid_workspace_new() -> *mut Workspace {
    Box::into_raw(Box::new(Workspace::new()))
}

/// Create a workspace from a stored snapshot blob.
///
/// A null `blob` gives the defaults. A corrupt blob also gives the defaults
/// and sets `*discard_out` to true, telling the caller to remove it from
/// storage.
///
/// # Safety
/// - `blob` must be a valid null-terminated C string or null
/// - `discard_out` must be a valid pointer to a bool or null
/// - Caller must free the returned pointer with `taskgrid_workspace_free`
#[no_mangle]
pub unsafe extern "C" fn taskgrid_workspace_restore(
    blob: *const c_char,
    discard_out: *mut bool,
) -> *mut Workspace {
    let raw = from_c_string(blob);
    let restored = restore(raw.as_deref());
    if let Some(out) = discard_out.as_mut() {
        *out = restored.discard_blob;
    }
    Box::into_raw(Box::new(restored.workspace))
}

/// Free a workspace.
///
/// # Safety
/// - `ws` must be a valid pointer from `taskgrid_workspace_new` or
///   `taskgrid_workspace_restore`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn taskgrid_workspace_free(ws: *mut Workspace) {
    if !ws.is_null() {
        drop(Box::from_raw(ws));
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `taskgrid_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn taskgrid_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Commands and Views
// ============================================================================

/// Apply a command to the workspace.
///
/// # Arguments
/// - `ws`: Workspace pointer
/// - `command_json`: JSON string of Command
/// - `now`: Current time in milliseconds
///
/// # Returns
/// JSON string: `{"ok": PageView}` or `{"error": "message"}`.
/// On error the workspace is unchanged.
///
/// # Safety
/// - `ws` must be a valid workspace pointer or null
/// - `command_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `taskgrid_string_free`
#[no_mangle]
pub unsafe extern "C" fn taskgrid_workspace_apply(
    ws: *mut Workspace,
    command_json: *const c_char,
    now: u64,
) -> *mut c_char {
    let ws = match ws.as_mut() {
        Some(w) => w,
        None => return error_json("null workspace pointer"),
    };

    let command_str = match from_c_string(command_json) {
        Some(s) => s,
        None => return error_json("invalid command JSON"),
    };

    let command: Command = match serde_json::from_str(&command_str) {
        Ok(c) => c,
        Err(e) => return error_json(format!("parse error: {}", e)),
    };

    match ws.apply(command, now) {
        Ok(next) => {
            *ws = next;
            to_c_string(FfiResult::ok(ws.page_view()).to_json())
        }
        Err(e) => error_json(e.to_string()),
    }
}

/// Get the current page of filtered, sorted tasks.
///
/// # Returns
/// JSON string: `{"ok": PageView}` or `{"error": "message"}`
///
/// # Safety
/// - `ws` must be a valid workspace pointer or null
/// - Caller must free the returned string with `taskgrid_string_free`
#[no_mangle]
pub unsafe extern "C" fn taskgrid_workspace_view(ws: *const Workspace) -> *mut c_char {
    match ws.as_ref() {
        Some(ws) => to_c_string(FfiResult::ok(ws.page_view()).to_json()),
        None => error_json("null workspace pointer"),
    }
}

/// Get the full workspace state.
///
/// # Returns
/// JSON string: `{"ok": WorkspaceSnapshot}` or `{"error": "message"}`
///
/// # Safety
/// - `ws` must be a valid workspace pointer or null
/// - Caller must free the returned string with `taskgrid_string_free`
#[no_mangle]
pub unsafe extern "C" fn taskgrid_workspace_snapshot(ws: *const Workspace) -> *mut c_char {
    match ws.as_ref() {
        Some(ws) => to_c_string(FfiResult::ok(WorkspaceSnapshot::capture(ws)).to_json()),
        None => error_json("null workspace pointer"),
    }
}

/// Export the blob to store, ready for the storage primitive.
///
/// # Returns
/// The snapshot JSON, or null when there is nothing worth saving (no
/// tasks or no fields) or `ws` is null.
///
/// # Safety
/// - `ws` must be a valid workspace pointer or null
/// - Caller must free the returned string with `taskgrid_string_free`
#[no_mangle]
pub unsafe extern "C" fn taskgrid_workspace_export(ws: *const Workspace) -> *mut c_char {
    let Some(ws) = ws.as_ref() else {
        return ptr::null_mut();
    };
    match sanitize_for_save(ws).map(|s| s.to_json()) {
        Some(Ok(blob)) => to_c_string(blob),
        _ => ptr::null_mut(),
    }
}

// ============================================================================
// Form Support
// ============================================================================

/// List the filter operators offered for a field type.
///
/// # Arguments
/// - `field_type`: one of `text`, `number`, `checkbox`, `single_select`
///
/// # Returns
/// JSON string: `{"ok": [{"value": "contains", "label": "Contains"}, ...]}`
/// or `{"error": "message"}`
///
/// # Safety
/// - `field_type` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `taskgrid_string_free`
#[no_mangle]
pub unsafe extern "C" fn taskgrid_field_operators(field_type: *const c_char) -> *mut c_char {
    let type_str = match from_c_string(field_type) {
        Some(s) => s,
        None => return error_json("invalid field type"),
    };

    let field_type: FieldType = match serde_json::from_value(serde_json::Value::String(type_str))
    {
        Ok(t) => t,
        Err(e) => return error_json(format!("unknown field type: {}", e)),
    };

    let operators: Vec<_> = field_type
        .operators()
        .iter()
        .map(|op| serde_json::json!({"value": op.as_str(), "label": op.label()}))
        .collect();
    to_c_string(FfiResult::ok(operators).to_json())
}

/// Get the engine version.
///
/// # Returns
/// Static string (do not free).
#[no_mangle]
pub extern "C" fn taskgrid_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
