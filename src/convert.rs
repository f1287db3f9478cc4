//! C string helpers and the TLS buffer for string-returning exports.
//!
//! String-returning FFI functions write into a thread-local buffer so the
//! caller never has to free anything. The pointer stays valid until the
//! next string-returning call on the same thread; hosts copy it first.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::error::{BridgeError, Result};

thread_local! {
    /// Reusable buffer for returning C strings from FFI functions.
    static RETURN_BUF: RefCell<CString> = RefCell::new(CString::default());
}

/// Store a string in the TLS buffer and return a pointer to it.
pub fn set_return_str(s: String) -> *const c_char {
    RETURN_BUF.with(|cell| {
        let cstr =
            CString::new(s).unwrap_or_else(|_| c"<string contains null byte>".to_owned());
        *cell.borrow_mut() = cstr;
        cell.borrow().as_ptr()
    })
}

/// Convert a `*const c_char` argument to `&str`.
///
/// # Safety
/// The pointer must be null or valid and null-terminated.
pub unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(BridgeError::InvalidArgument("null string pointer".into()));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| BridgeError::InvalidArgument(format!("invalid UTF-8: {e}")))
}
