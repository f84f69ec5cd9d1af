//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Inputs are borrowed C strings and caller-owned `FfiPair` arrays; nothing
//! the host passes in is freed here. Results travel back through a
//! `GomaCallback` invoked on a queue worker thread, with the text pointer
//! valid only for the duration of that call, so there is nothing for the
//! host to free either.

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;

use goma_core::{ClientError, Headers, Listener};

/// Opaque handle to a `Client`. C callers receive a pointer to this and pass
/// it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: goma_core::Client,
}

/// A single key/value pair of C strings (a header or a form parameter).
#[repr(C)]
pub struct FfiPair {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Which listener branch fired.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOutcome {
    Success = 0,
    Error = 1,
}

/// Status returned by every dispatching FFI function.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NullArg = 1,
    InvalidUtf8 = 2,
    Stopped = 3,
    Runtime = 4,
    Panic = 5,
}

impl From<&ClientError> for FfiStatus {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Stopped => FfiStatus::Stopped,
            ClientError::Runtime(_) => FfiStatus::Runtime,
        }
    }
}

/// Result callback. `text` is the body on `Success` and the error message on
/// `Error`; it is null when absent and only valid during the call. `text_len`
/// is the full byte length, which is larger than `strlen(text)` when the body
/// itself contains NUL bytes. The buffer is NUL-terminated after `text_len`
/// bytes either way. The callback itself must not be null.
pub type GomaCallback =
    extern "C" fn(user_data: *mut c_void, outcome: FfiOutcome, text: *const c_char, text_len: usize);

/// Listener that forwards to a C callback.
pub(crate) struct FfiListener {
    callback: GomaCallback,
    user_data: UserData,
}

/// Host-owned pointer handed back verbatim to the callback.
struct UserData(*mut c_void);

// The host promises `user_data` may be used from a worker thread.
unsafe impl Send for UserData {}

impl FfiListener {
    pub(crate) fn new(callback: GomaCallback, user_data: *mut c_void) -> Self {
        Self {
            callback,
            user_data: UserData(user_data),
        }
    }

    pub(crate) fn invoke(&self, outcome: FfiOutcome, text: Option<String>) {
        match text {
            Some(text) => {
                let len = text.len();
                let mut buf = text.into_bytes();
                buf.push(0);
                (self.callback)(self.user_data.0, outcome, buf.as_ptr() as *const c_char, len);
            }
            None => (self.callback)(self.user_data.0, outcome, std::ptr::null(), 0),
        }
    }
}

impl Listener for FfiListener {
    fn on_success(self: Box<Self>, body: Option<String>) {
        self.invoke(FfiOutcome::Success, body);
    }

    fn on_error(self: Box<Self>, message: Option<String>) {
        self.invoke(FfiOutcome::Error, message);
    }
}

/// Read a borrowed C string. `Err` carries the status to report.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_str<'a>(ptr: *const c_char) -> Result<&'a str, FfiStatus> {
    if ptr.is_null() {
        return Err(FfiStatus::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiStatus::InvalidUtf8)
}

/// Copy a caller-owned pair array into a map. A null array with length 0 is
/// the empty map.
///
/// # Safety
/// `pairs` must be null or point to `len` valid `FfiPair`s.
pub(crate) unsafe fn read_pairs(pairs: *const FfiPair, len: u32) -> Result<Headers, FfiStatus> {
    if len == 0 {
        return Ok(Headers::new());
    }
    if pairs.is_null() {
        return Err(FfiStatus::NullArg);
    }
    let slice = unsafe { std::slice::from_raw_parts(pairs, len as usize) };
    slice
        .iter()
        .map(|pair| {
            let key = unsafe { read_str(pair.key) }?;
            let value = unsafe { read_str(pair.value) }?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}
