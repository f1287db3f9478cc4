//! Error taxonomy and the thread-local last-error slot for the C boundary.
//!
//! Rust callers get a [`BridgeError`] through [`Result`]. The `ab_*`
//! exports cannot return one, so they store its message with
//! [`set_last_error`] and return a sentinel instead.
//!
//! **Ownership rules:**
//! - `ab_last_error()` returns a pointer owned by TLS. Do NOT free it.

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use thiserror::Error;

/// Errors raised by the wrappers and the engine.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A numeric-type, method or compute-mode selector outside the
    /// accepted set.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(isize),

    /// The handle names an object of another kind.
    #[error("Handle {handle} is not a {expected}")]
    WrongObject {
        handle: isize,
        expected: &'static str,
    },

    /// Parameter sub-objects are released together with their algorithm.
    #[error("Handle {handle} is owned by algorithm {owner}")]
    OwnedByAlgorithm { handle: isize, owner: isize },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown input id: {0}")]
    UnknownInput(i32),

    #[error("Runtime not initialized. Call init() first.")]
    NotInitialized,

    #[error("Handle limit reached: {0} live handles")]
    HandleLimit(usize),

    #[error("Handle counter overflow")]
    HandleOverflow,

    #[error("Registry lock poisoned")]
    Poisoned,

    /// Malformed argument at the C boundary.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message in thread-local storage.
pub fn set_last_error(msg: impl Into<String>) {
    let msg = msg.into();
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the thread-local error.
pub fn clear_last_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Copy of the last error message, if any.
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|s| s.to_string_lossy().into_owned())
    })
}

/// Get a pointer to the last error message, or null if none.
///
/// The returned pointer is valid until the next `ab_*` call.
/// Do NOT free this pointer.
#[no_mangle]
pub extern "C" fn ab_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        cell.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |s| s.as_ptr())
    })
}

/// Clear the last error message.
#[no_mangle]
pub extern "C" fn ab_last_error_clear() {
    clear_last_error();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn last_error_round_trips_through_the_c_pointer() {
        set_last_error("method unsupported");
        let ptr = ab_last_error();
        assert!(!ptr.is_null());
        let msg = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap();
        assert_eq!(msg, "method unsupported");

        ab_last_error_clear();
        assert!(ab_last_error().is_null());
        assert_eq!(last_error_message(), None);
    }

    #[test]
    fn messages_with_interior_nul_are_dropped() {
        set_last_error("bad\0message");
        assert_eq!(last_error_message(), None);
    }
}
