//! FFI bindings for the seasonal dashboard
//!
//! This module provides C-compatible functions for embedding the dashboard in
//! a host UI. All strings are null-terminated; returned strings are allocated
//! here and must be freed by the caller using `dash_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::controller::DashboardController;
use crate::season::SeasonTag;

// Per-thread message behind `dash_last_error`
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Record a failure for `dash_last_error` (interior NULs drop the message)
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Reset on entry to every fallible call
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Borrow a C string as UTF-8; None for NULL or invalid UTF-8
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Hand ownership of a string to the caller (freed via `dash_free_string`)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Opaque handle to a DashboardController
pub struct DashHandle {
    controller: DashboardController,
}

/// Create a dashboard with all seasons active.
///
/// # Safety
/// - Must be freed with `dash_free`.
#[no_mangle]
pub unsafe extern "C" fn dash_new() -> *mut DashHandle {
    clear_last_error();
    Box::into_raw(Box::new(DashHandle {
        controller: DashboardController::new(),
    }))
}

/// Free a dashboard.
///
/// # Safety
/// - `handle` must be a pointer returned by `dash_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn dash_free(handle: *mut DashHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Load a JSON array of raw points. Returns 0 on success, -1 on error.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `dash_new`.
/// - `json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn dash_load_json(handle: *mut DashHandle, json: *const c_char) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null dashboard pointer");
        return -1;
    }
    let handle = &mut *handle;

    let Some(json) = cstr_to_str(json) else {
        set_last_error("Invalid JSON string pointer");
        return -1;
    };

    match handle.controller.load_json(json) {
        Ok(()) => 0,
        Err(e) => {
            let detail: Vec<String> = e.causes().iter().map(|c| c.to_string()).collect();
            if detail.is_empty() {
                set_last_error(&e.to_string());
            } else {
                set_last_error(&format!("{}: {}", e, detail.join("; ")));
            }
            -1
        }
    }
}

/// Toggle a season by name. Returns 0 on success, -1 on an unknown name.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `dash_new`.
/// - `season` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn dash_toggle(handle: *mut DashHandle, season: *const c_char) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null dashboard pointer");
        return -1;
    }
    let handle = &mut *handle;

    let Some(name) = cstr_to_str(season) else {
        set_last_error("Invalid season string pointer");
        return -1;
    };

    match name.parse::<SeasonTag>() {
        Ok(tag) => {
            handle.controller.toggle(tag);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Select (non-zero) or clear (zero) all seasons.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `dash_new`.
#[no_mangle]
pub unsafe extern "C" fn dash_set_all(handle: *mut DashHandle, present: i32) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null dashboard pointer");
        return -1;
    }
    (*handle).controller.set_all(present != 0);
    0
}

/// Current view model as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `dash_new`.
/// - Returns a newly allocated string that must be freed with `dash_free_string`.
/// - Returns NULL when nothing has been published yet, or on error.
#[no_mangle]
pub unsafe extern "C" fn dash_view_json(handle: *const DashHandle) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null dashboard pointer");
        return ptr::null_mut();
    }

    let Some(view) = (*handle).controller.current_view() else {
        set_last_error("No view model published");
        return ptr::null_mut();
    };

    match view.to_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Last error message on this thread, or NULL.
///
/// # Safety
/// - The returned pointer is valid until the next dashboard call on this thread.
/// - Do NOT free the returned pointer.
#[no_mangle]
pub unsafe extern "C" fn dash_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by this module.
///
/// # Safety
/// - `s` must be a pointer returned by a `dash_*` function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn dash_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_error() -> Option<String> {
        unsafe {
            let ptr = dash_last_error();
            if ptr.is_null() {
                None
            } else {
                Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
            }
        }
    }

    #[test]
    fn test_ffi_round_trip() {
        unsafe {
            let handle = dash_new();
            assert!(dash_view_json(handle).is_null());

            let json = CString::new(
                r#"[{"timestamp":1,"season":"spring","value":10},
                    {"timestamp":2,"season":"summer","value":20}]"#,
            )
            .unwrap();
            assert_eq!(dash_load_json(handle, json.as_ptr()), 0);

            let summer = CString::new("summer").unwrap();
            assert_eq!(dash_toggle(handle, summer.as_ptr()), 0);

            let view_ptr = dash_view_json(handle);
            assert!(!view_ptr.is_null());
            let view: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(view_ptr).to_str().unwrap()).unwrap();
            assert_eq!(view["kpis_overall"]["count"], 1);
            assert_eq!(view["kpis_by_season"]["spring"]["sum"], 10.0);
            dash_free_string(view_ptr);

            dash_free(handle);
        }
    }

    #[test]
    fn test_ffi_errors() {
        unsafe {
            let handle = dash_new();

            let bad = CString::new("fall").unwrap();
            assert_eq!(dash_toggle(handle, bad.as_ptr()), -1);
            assert!(last_error().unwrap().contains("fall"));

            let empty = CString::new("[]").unwrap();
            assert_eq!(dash_load_json(handle, empty.as_ptr()), -1);
            assert!(last_error().unwrap().contains("no data points"));

            let mixed = CString::new(
                r#"[{"timestamp":1,"season":"spring","value":null},
                    {"timestamp":2,"season":"monsoon","value":1}]"#,
            )
            .unwrap();
            assert_eq!(dash_load_json(handle, mixed.as_ptr()), -1);
            let message = last_error().unwrap();
            assert!(message.contains("index 0"));
            assert!(message.contains("monsoon"));

            assert_eq!(dash_set_all(ptr::null_mut(), 1), -1);
            dash_free(handle);
        }
    }
}
