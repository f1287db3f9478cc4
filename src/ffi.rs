//! C ABI exports for foreign hosts.
//!
//! Every `ab_*` function follows this contract:
//!
//! 1. Clears the last error
//! 2. Performs the operation
//! 3. On error: stores message via `set_last_error`, returns sentinel
//! 4. On success: returns the result
//!
//! **Sentinel values:**
//! - Handle functions (`-> isize`): `0` means error
//! - Status functions (`-> i32`):   `-1` means error, `0` means success
//! - Value getters (`-> u64`/`f64`): `0` means error *or* a real zero,
//!   check `ab_last_error`
//! - String functions (`-> cstr`):  `""` means error
//!
//! **Memory:**
//! - Returned `cstr` pointers use a TLS buffer, valid until the next
//!   string-returning call on the same thread.
//! - Handles are opaque references into the registry. They MUST be freed
//!   with `ab_release` when no longer needed.

use std::os::raw::c_char;

use crate::config::BridgeConfig;
use crate::convert;
use crate::engine;
use crate::error::{clear_last_error, set_last_error, BridgeError, Result};
use crate::types::{
    ComputeMode, CountField, Handle, InputId, Precision, PredictionMethod, RealField,
};

// ==================== Internal Helpers ====================

/// Run closure, return handle (0 on error).
fn ffi_handle(f: impl FnOnce() -> Result<Handle>) -> isize {
    clear_last_error();
    match f() {
        Ok(h) => h.raw(),
        Err(e) => {
            set_last_error(e.to_string());
            0
        }
    }
}

/// Run closure, return status (0=ok, -1=error).
fn ffi_status(f: impl FnOnce() -> Result<()>) -> i32 {
    clear_last_error();
    match f() {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}

/// Run closure, return value (`T::default()` on error).
fn ffi_value<T: Default>(f: impl FnOnce() -> Result<T>) -> T {
    clear_last_error();
    match f() {
        Ok(v) => v,
        Err(e) => {
            set_last_error(e.to_string());
            T::default()
        }
    }
}

/// Run closure, return string via TLS buffer ("" on error).
fn ffi_str(f: impl FnOnce() -> Result<String>) -> *const c_char {
    clear_last_error();
    match f() {
        Ok(s) => convert::set_return_str(s),
        Err(e) => {
            set_last_error(e.to_string());
            convert::set_return_str(String::new())
        }
    }
}

fn arg_handle(raw: isize) -> Result<Handle> {
    Handle::from_raw(raw).ok_or(BridgeError::InvalidHandle(raw))
}

/// Method first, then precision.
fn arg_selectors(prec: i32, method: i32) -> Result<(Precision, PredictionMethod)> {
    let method = PredictionMethod::try_from(method)?;
    let precision = Precision::try_from(prec)?;
    Ok((precision, method))
}

// ==================== Lifecycle ====================

/// Initialize the runtime from `ALGOBRIDGE_*` environment variables.
///
/// Idempotent. Returns `0` on success, `-1` on error.
#[no_mangle]
pub extern "C" fn ab_init() -> i32 {
    ffi_status(crate::init)
}

/// Initialize the runtime from a JSON configuration object.
///
/// Returns `0` on success, `-1` on error.
///
/// # Safety
/// `json` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ab_init_json(json: *const c_char) -> i32 {
    ffi_status(|| {
        let text = unsafe { convert::cstr_to_str(json) }?;
        crate::init_with(&BridgeConfig::from_json(text)?)
    })
}

/// Drop every object. Returns the number dropped, `-1` on error.
#[no_mangle]
pub extern "C" fn ab_shutdown() -> i64 {
    clear_last_error();
    match crate::shutdown() {
        Ok(n) => n as i64,
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}

// ==================== Prediction algorithm ====================

/// Allocate a prediction algorithm. `prec`: 0 single, 1 double.
/// `method`: 0 default dense.
///
/// Returns `0` on error.
#[no_mangle]
pub extern "C" fn ab_prediction_init(prec: i32, method: i32) -> isize {
    ffi_handle(|| {
        let (precision, method) = arg_selectors(prec, method)?;
        engine::init(precision, method)
    })
}

/// Get the parameter sub-object of an algorithm.
///
/// Returns `0` on error.
#[no_mangle]
pub extern "C" fn ab_prediction_init_parameter(
    algorithm: isize,
    prec: i32,
    method: i32,
    cmode: i32,
) -> isize {
    ffi_handle(|| {
        let (precision, method) = arg_selectors(prec, method)?;
        let mode = ComputeMode::try_from(cmode)?;
        engine::init_parameter(arg_handle(algorithm)?, precision, method, mode)
    })
}

/// Deep-copy an algorithm into a new handle.
///
/// Returns `0` on error.
#[no_mangle]
pub extern "C" fn ab_prediction_clone(algorithm: isize, prec: i32, method: i32) -> isize {
    ffi_handle(|| {
        let (precision, method) = arg_selectors(prec, method)?;
        engine::clone(arg_handle(algorithm)?, precision, method)
    })
}

/// Precision of an algorithm. Returns `-1` on error.
#[no_mangle]
pub extern "C" fn ab_prediction_precision(algorithm: isize) -> i32 {
    clear_last_error();
    match arg_handle(algorithm).and_then(engine::precision_of) {
        Ok(p) => p.value(),
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}

/// Bind an input slot (`0` data, `1` model) to a handle.
///
/// Returns `0` on success, `-1` on error.
#[no_mangle]
pub extern "C" fn ab_prediction_set_input(algorithm: isize, id: i32, value: isize) -> i32 {
    ffi_status(|| {
        engine::set_input(
            arg_handle(algorithm)?,
            InputId::try_from(id)?,
            arg_handle(value)?,
        )
    })
}

/// Read an input slot. Returns `0` when unbound or on error.
#[no_mangle]
pub extern "C" fn ab_prediction_get_input(algorithm: isize, id: i32) -> isize {
    ffi_value(|| {
        let bound = engine::get_input(arg_handle(algorithm)?, InputId::try_from(id)?)?;
        Ok(bound.map_or(0, Handle::raw))
    })
}

// ==================== Layer parameter ====================

/// Allocate a fully-connected layer parameter.
///
/// Returns `0` on error.
#[no_mangle]
pub extern "C" fn ab_fc_parameter_init(n_outputs: u64, dim: u64) -> isize {
    ffi_handle(|| engine::init_layer_parameter(n_outputs, dim))
}

// ==================== Field access ====================

/// Read an integral field. Returns `0` on error, check `ab_last_error`.
#[no_mangle]
pub extern "C" fn ab_get_count(handle: isize, field: i32) -> u64 {
    ffi_value(|| engine::get_count(arg_handle(handle)?, CountField::try_from(field)?))
}

/// Returns `0` on success, `-1` on error.
#[no_mangle]
pub extern "C" fn ab_set_count(handle: isize, field: i32, value: u64) -> i32 {
    ffi_status(|| engine::set_count(arg_handle(handle)?, CountField::try_from(field)?, value))
}

/// Read a real field. Returns `0.0` on error, check `ab_last_error`.
#[no_mangle]
pub extern "C" fn ab_get_real(handle: isize, field: i32) -> f64 {
    ffi_value(|| engine::get_real(arg_handle(handle)?, RealField::try_from(field)?))
}

/// Returns `0` on success, `-1` on error.
#[no_mangle]
pub extern "C" fn ab_set_real(handle: isize, field: i32, value: f64) -> i32 {
    ffi_status(|| engine::set_real(arg_handle(handle)?, RealField::try_from(field)?, value))
}

/// Serialize an object to JSON. Returns via TLS buffer.
#[no_mangle]
pub extern "C" fn ab_to_json(handle: isize) -> *const c_char {
    ffi_str(|| Ok(engine::snapshot(arg_handle(handle)?)?.to_string()))
}

// ==================== Memory Management ====================

/// Release a handle. Releasing an algorithm also releases its parameter.
///
/// Returns `0` on success, `-1` on error.
#[no_mangle]
pub extern "C" fn ab_release(handle: isize) -> i32 {
    ffi_status(|| engine::release(arg_handle(handle)?))
}

/// Return the number of live handles (for debugging/diagnostics).
#[no_mangle]
pub extern "C" fn ab_handle_count() -> i64 {
    clear_last_error();
    match crate::registry::len() {
        Ok(n) => n as i64,
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}
