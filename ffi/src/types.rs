//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The callback pair crosses the boundary as two C function pointers plus an
//! opaque `user_data` pointer handed back on every call. `CallbackEvents`
//! adapts that triple to the core `HttpEvents` trait. Status and state are
//! plain C enums with explicit discriminants.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use signal_http::{HttpConfig, HttpEvents, RequestError, RequestState, TrustPolicy};

/// Opaque handle to an `AsyncRequest`. C callers receive a pointer to this
/// and pass it back into every `signal_request_*` function.
pub struct FfiAsyncRequest {
    pub(crate) inner: signal_http::AsyncRequest,
}

/// Callback signature. `message` is only valid for the duration of the call.
pub type FfiCallback = extern "C" fn(user_data: *mut c_void, message: *const c_char);

/// Callback pair supplied at construction. Exactly one of the two is called,
/// once, from a background thread.
#[repr(C)]
pub struct FfiHttpEvents {
    pub user_data: *mut c_void,
    pub on_complete: Option<FfiCallback>,
    pub on_error: Option<FfiCallback>,
}

/// Optional transport settings. `timeout_ms == 0` and a null `origin` keep
/// the defaults (8000 ms, `https://appr.tc`).
#[repr(C)]
pub struct FfiHttpOptions {
    pub timeout_ms: u64,
    pub origin: *const c_char,
    pub trust_all: bool,
}

impl FfiHttpOptions {
    /// Returns `None` if `origin` is not valid UTF-8.
    pub(crate) fn to_config(&self) -> Option<HttpConfig> {
        let mut config = HttpConfig::default();
        if self.timeout_ms > 0 {
            config.timeout_ms = self.timeout_ms;
        }
        if !self.origin.is_null() {
            config.origin = unsafe { CStr::from_ptr(self.origin) }.to_str().ok()?.to_string();
        }
        config.trust = if self.trust_all {
            TrustPolicy::TrustAll
        } else {
            TrustPolicy::Verify
        };
        Some(config)
    }
}

/// Status codes returned by `signal_request_*` functions.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NullArg = 1,
    InvalidArg = 2,
    AlreadySent = 3,
    Spawn = 4,
    Panic = 5,
}

impl From<&RequestError> for FfiStatus {
    fn from(err: &RequestError) -> Self {
        match err {
            RequestError::AlreadySent => FfiStatus::AlreadySent,
            RequestError::Spawn(_) => FfiStatus::Spawn,
            RequestError::EmptyMethod
            | RequestError::InvalidMethod(_)
            | RequestError::EmptyUrl
            | RequestError::InvalidConfig(_) => FfiStatus::InvalidArg,
        }
    }
}

/// Request lifecycle as seen from C. `Unknown` is returned for a null handle.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiRequestState {
    Created = 0,
    Sent = 1,
    Completed = 2,
    Failed = 3,
    Unknown = 4,
}

impl From<RequestState> for FfiRequestState {
    fn from(state: RequestState) -> Self {
        match state {
            RequestState::Created => FfiRequestState::Created,
            RequestState::Sent => FfiRequestState::Sent,
            RequestState::Completed => FfiRequestState::Completed,
            RequestState::Failed => FfiRequestState::Failed,
        }
    }
}

/// `HttpEvents` backed by C function pointers.
pub(crate) struct CallbackEvents {
    user_data: *mut c_void,
    on_complete: FfiCallback,
    on_error: FfiCallback,
}

// SAFETY: the C caller promises `user_data` may be used from the worker
// thread; the library never dereferences it.
unsafe impl Send for CallbackEvents {}

impl CallbackEvents {
    /// Returns `None` if either callback is null.
    pub(crate) fn from_ffi(events: &FfiHttpEvents) -> Option<Self> {
        Some(Self {
            user_data: events.user_data,
            on_complete: events.on_complete?,
            on_error: events.on_error?,
        })
    }
}

impl HttpEvents for CallbackEvents {
    fn on_http_complete(&self, response: String) {
        let text = to_c_string(response);
        (self.on_complete)(self.user_data, text.as_ptr());
    }

    fn on_http_error(&self, message: String) {
        let text = to_c_string(message);
        (self.on_error)(self.user_data, text.as_ptr());
    }
}

/// C strings cannot hold NUL; strip any before handing text across.
fn to_c_string(text: String) -> CString {
    match CString::new(text) {
        Ok(c) => c,
        Err(e) => {
            let mut bytes = e.into_vec();
            bytes.retain(|&b| b != 0);
            CString::new(bytes).unwrap_or_default()
        }
    }
}
