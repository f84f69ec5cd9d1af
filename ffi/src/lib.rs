//! C-ABI wrapper around `goma-core`.
//!
//! # Overview
//! Exposes the client facade through `extern "C"` functions so a JVM (via
//! JNI) or any other host with a C FFI can issue requests and receive results
//! through a success/error callback without linking Rust's async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Verbs return an `FfiStatus` synchronously; on `Ok` the callback fires
//!   later on a worker thread, exactly once, unless the request is cancelled
//!   or the client stopped first.
//! - The caller owns the client handle and must release it with
//!   `goma_client_free`. No other allocation crosses the boundary.

pub mod types;

use std::ffi::c_void;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use goma_core::{Client, HttpMethod, Params, QueueConfig};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url` with `workers` queue threads.
///
/// A null `base_url` gives the empty base (paths are used verbatim); a
/// `workers` of 0 uses the default. Returns null if `base_url` is not valid
/// UTF-8 or if an internal panic occurs. The caller must free the returned
/// pointer with `goma_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn goma_client_new(base_url: *const c_char, workers: u32) -> *mut FfiClient {
    catch_unwind(|| {
        let base_url = if base_url.is_null() {
            None
        } else {
            match unsafe { read_str(base_url) } {
                Ok(url) => Some(url),
                Err(_) => return std::ptr::null_mut(),
            }
        };
        let mut queue = QueueConfig::default();
        if workers > 0 {
            queue.workers = workers as usize;
        }
        let client = Client::builder(base_url).queue_config(queue).build();
        Box::into_raw(Box::new(FfiClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `goma_client_new`. Outstanding callbacks are
/// dropped. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn goma_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

/// Issue a GET for `path`.
#[unsafe(no_mangle)]
pub extern "C" fn goma_get(
    client: *const FfiClient,
    path: *const c_char,
    callback: GomaCallback,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(HttpMethod::Get, client, path, std::ptr::null(), 0, std::ptr::null(), 0, callback, user_data)
}

/// Issue a POST with `headers` and form `params`. Either array may be null
/// when its length is 0.
#[unsafe(no_mangle)]
pub extern "C" fn goma_post(
    client: *const FfiClient,
    path: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    params: *const FfiPair,
    params_len: u32,
    callback: GomaCallback,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(HttpMethod::Post, client, path, headers, headers_len, params, params_len, callback, user_data)
}

/// Issue a PUT. Same arguments as `goma_post`.
#[unsafe(no_mangle)]
pub extern "C" fn goma_put(
    client: *const FfiClient,
    path: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    params: *const FfiPair,
    params_len: u32,
    callback: GomaCallback,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(HttpMethod::Put, client, path, headers, headers_len, params, params_len, callback, user_data)
}

/// Issue a PATCH. Same arguments as `goma_post`.
#[unsafe(no_mangle)]
pub extern "C" fn goma_patch(
    client: *const FfiClient,
    path: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    params: *const FfiPair,
    params_len: u32,
    callback: GomaCallback,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(HttpMethod::Patch, client, path, headers, headers_len, params, params_len, callback, user_data)
}

/// Issue a DELETE. Same arguments as `goma_post`.
#[unsafe(no_mangle)]
pub extern "C" fn goma_delete(
    client: *const FfiClient,
    path: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    params: *const FfiPair,
    params_len: u32,
    callback: GomaCallback,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(HttpMethod::Delete, client, path, headers, headers_len, params, params_len, callback, user_data)
}

#[allow(clippy::too_many_arguments)]
fn dispatch(
    method: HttpMethod,
    client: *const FfiClient,
    path: *const c_char,
    headers: *const FfiPair,
    headers_len: u32,
    params: *const FfiPair,
    params_len: u32,
    callback: GomaCallback,
    user_data: *mut c_void,
) -> FfiStatus {
    // Raw pointers are only read inside; a panic leaves nothing half-updated.
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiStatus::NullArg;
        }
        let client = unsafe { &*client };
        let inputs = unsafe {
            read_str(path).and_then(|path| {
                let headers = read_pairs(headers, headers_len)?;
                let params: Params = read_pairs(params, params_len)?;
                Ok((path, headers, params))
            })
        };
        let (path, headers, params) = match inputs {
            Ok(inputs) => inputs,
            Err(status) => return status,
        };
        let listener = FfiListener::new(callback, user_data);
        match client.inner.dispatch(method, path, headers, params, listener) {
            Ok(_) => FfiStatus::Ok,
            Err(err) => {
                tracing::debug!(error = %err, "ffi dispatch rejected");
                FfiStatus::from(&err)
            }
        }
    }))
    .unwrap_or(FfiStatus::Panic)
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Cancel every request this client has issued. Their callbacks will not
/// fire (best effort). Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn goma_cancel(client: *const FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &*client }.inner.cancel()));
    }
}

/// Stop the client's queue. Later verbs return `Stopped`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn goma_stop(client: *const FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &*client }.inner.stop()));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
