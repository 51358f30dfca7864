//! C-ABI wrapper around `signal-http`.
//!
//! # Overview
//! Lets a host written in any language with a C FFI (the signaling app)
//! create a one-shot request, send it, and receive the outcome through C
//! function pointers, without linking Rust's HTTP stack directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Invalid arguments make constructors return null and other calls return
//!   a non-`Ok` `FfiStatus`; callbacks only ever report network outcomes.
//! - The C caller owns the request handle and must release it with
//!   `signal_request_free`. Freeing a sent request does not cancel it: the
//!   callback still fires, so `user_data` must outlive the request.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use signal_http::{AsyncRequest, HttpConfig, RequestState};

use types::*;

/// Borrow a C string as `&str`. Null or non-UTF-8 yields `None`.
fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Request lifecycle
// ---------------------------------------------------------------------------

/// Create a request with default transport settings.
///
/// `body` may be null (no body). Returns null if `method`, `url` or either
/// callback is null, or if the method or url is invalid.
/// The caller must free the returned pointer with `signal_request_free`.
#[unsafe(no_mangle)]
pub extern "C" fn signal_request_new(
    method: *const c_char,
    url: *const c_char,
    body: *const c_char,
    events: FfiHttpEvents,
) -> *mut FfiAsyncRequest {
    signal_request_new_with_options(method, url, body, events, std::ptr::null())
}

/// Create a request with explicit transport settings. `options` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn signal_request_new_with_options(
    method: *const c_char,
    url: *const c_char,
    body: *const c_char,
    events: FfiHttpEvents,
    options: *const FfiHttpOptions,
) -> *mut FfiAsyncRequest {
    catch_unwind(AssertUnwindSafe(|| {
        let (Some(method), Some(url)) = (c_str(method), c_str(url)) else {
            return std::ptr::null_mut();
        };
        let body = if body.is_null() {
            None
        } else {
            match c_str(body) {
                Some(b) => Some(b),
                None => return std::ptr::null_mut(),
            }
        };
        let Some(events) = CallbackEvents::from_ffi(&events) else {
            return std::ptr::null_mut();
        };
        let config = if options.is_null() {
            HttpConfig::default()
        } else {
            match unsafe { &*options }.to_config() {
                Some(config) => config,
                None => return std::ptr::null_mut(),
            }
        };

        match AsyncRequest::new(method, url, body, events) {
            Ok(req) => Box::into_raw(Box::new(FfiAsyncRequest {
                inner: req.with_config(config),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Set the `Content-Type` used when a body is sent. Only valid before send.
#[unsafe(no_mangle)]
pub extern "C" fn signal_request_set_content_type(
    req: *mut FfiAsyncRequest,
    content_type: *const c_char,
) -> FfiStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() || content_type.is_null() {
            return FfiStatus::NullArg;
        }
        let Some(content_type) = c_str(content_type) else {
            return FfiStatus::InvalidArg;
        };
        let req = unsafe { &mut *req };
        match req.inner.set_content_type(content_type) {
            Ok(()) => FfiStatus::Ok,
            Err(e) => FfiStatus::from(&e),
        }
    }))
    .unwrap_or(FfiStatus::Panic)
}

/// Start the request on a background thread and return immediately.
///
/// A second call on the same handle returns `AlreadySent`.
#[unsafe(no_mangle)]
pub extern "C" fn signal_request_send(req: *mut FfiAsyncRequest) -> FfiStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() {
            return FfiStatus::NullArg;
        }
        let req = unsafe { &mut *req };
        match req.inner.send() {
            Ok(()) => FfiStatus::Ok,
            Err(e) => FfiStatus::from(&e),
        }
    }))
    .unwrap_or(FfiStatus::Panic)
}

/// Current lifecycle state, or `Unknown` for a null handle.
#[unsafe(no_mangle)]
pub extern "C" fn signal_request_state(req: *const FfiAsyncRequest) -> FfiRequestState {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() {
            return FfiRequestState::Unknown;
        }
        let req = unsafe { &*req };
        req.inner.state().into()
    }))
    .unwrap_or(FfiRequestState::Unknown)
}

/// Free a request created by `signal_request_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn signal_request_free(req: *mut FfiAsyncRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        if req.inner.state() == RequestState::Sent {
            tracing::debug!(url = req.inner.descriptor().url(), "freeing in-flight request");
        }
    }));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
