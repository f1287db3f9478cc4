use std::ffi::{CStr, CString};

use algobridge::error::ab_last_error;
use algobridge::ffi::*;

fn last_error() -> Option<String> {
    let ptr = ab_last_error();
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

fn setup() {
    assert_eq!(ab_init(), 0, "{:?}", last_error());
}

#[test]
fn prediction_lifecycle_through_the_c_abi() {
    setup();
    let alg = ab_prediction_init(1, 0);
    assert_ne!(alg, 0, "{:?}", last_error());
    assert_eq!(ab_prediction_precision(alg), 1);

    let param = ab_prediction_init_parameter(alg, 1, 0, 0);
    assert_ne!(param, 0);
    assert_eq!(ab_prediction_init_parameter(alg, 1, 0, 0), param);
    assert_eq!(ab_get_count(param, 2), 10);
    assert_eq!(ab_set_count(param, 2, 64), 0);
    assert_eq!(ab_get_count(param, 2), 64);
    assert_eq!(ab_set_real(param, 0, 0.125), 0);
    assert_eq!(ab_get_real(param, 0), 0.125);

    let copy = ab_prediction_clone(alg, 1, 0);
    assert_ne!(copy, 0);
    assert_ne!(copy, alg);
    let copy_param = ab_prediction_init_parameter(copy, 1, 0, 0);
    assert_eq!(ab_get_count(copy_param, 2), 64);

    assert_eq!(ab_release(alg), 0);
    assert_eq!(ab_release(copy), 0);
    assert!(last_error().is_none());
}

#[test]
fn rejected_selectors_return_sentinels() {
    setup();
    assert_eq!(ab_prediction_init(1, 3), 0);
    assert!(last_error().unwrap().contains("method"));

    // Method is checked before precision.
    assert_eq!(ab_prediction_init(9, 3), 0);
    assert!(last_error().unwrap().contains("method"));

    assert_eq!(ab_prediction_init(2, 0), 0);
    assert!(last_error().unwrap().contains("precision"));

    let alg = ab_prediction_init(0, 0);
    assert_eq!(ab_prediction_init_parameter(alg, 0, 0, 1), 0);
    assert!(last_error().unwrap().contains("compute mode"));
    assert_eq!(ab_prediction_init_parameter(alg, 1, 0, 0), 0);
    assert!(last_error().unwrap().starts_with("Invalid configuration"));
    assert_eq!(ab_release(alg), 0);
}

#[test]
fn success_clears_the_previous_error() {
    setup();
    assert_eq!(ab_release(0), -1);
    assert!(last_error().is_some());
    let fc = ab_fc_parameter_init(3, 1);
    assert_ne!(fc, 0);
    assert!(last_error().is_none());
    assert_eq!(ab_release(fc), 0);
}

#[test]
fn layer_parameter_fields() {
    setup();
    let fc = ab_fc_parameter_init(10, 1);
    assert_eq!(ab_get_count(fc, 0), 10);
    assert_eq!(ab_get_count(fc, 1), 1);
    assert_eq!(ab_set_count(fc, 1, 4), 0);
    assert_eq!(ab_get_count(fc, 1), 4);

    assert_eq!(ab_get_count(fc, 2), 0);
    assert!(last_error().unwrap().contains("max_iterations"));
    assert_eq!(ab_get_real(fc, 0), 0.0);
    assert!(last_error().is_some());
    assert_eq!(ab_get_count(fc, 99), 0);
    assert!(last_error().unwrap().contains("Unknown field"));

    let json = unsafe { CStr::from_ptr(ab_to_json(fc)) }.to_str().unwrap().to_owned();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["dim"], 4);

    assert_eq!(ab_release(fc), 0);
    assert_eq!(ab_get_count(fc, 0), 0);
    assert!(last_error().unwrap().contains("Invalid handle"));
    let empty = unsafe { CStr::from_ptr(ab_to_json(fc)) }.to_str().unwrap();
    assert_eq!(empty, "");
}

#[test]
fn input_slots() {
    setup();
    let alg = ab_prediction_init(0, 0);
    let data = ab_fc_parameter_init(1, 1);
    assert_eq!(ab_prediction_get_input(alg, 0), 0);
    assert!(last_error().is_none());
    assert_eq!(ab_prediction_set_input(alg, 0, data), 0);
    assert_eq!(ab_prediction_get_input(alg, 0), data);
    assert_eq!(ab_prediction_set_input(alg, 5, data), -1);
    assert_eq!(ab_prediction_set_input(alg, 1, 0), -1);
    assert_eq!(ab_prediction_get_input(data, 0), 0);
    assert!(last_error().unwrap().contains("not a prediction algorithm"));
    assert_eq!(ab_release(alg), 0);
    assert_eq!(ab_release(data), 0);
}

#[test]
fn owned_parameter_cannot_be_released_alone() {
    setup();
    let alg = ab_prediction_init(1, 0);
    let param = ab_prediction_init_parameter(alg, 1, 0, 0);
    assert_eq!(ab_release(param), -1);
    assert!(last_error().unwrap().contains("owned by algorithm"));
    assert_eq!(ab_release(alg), 0);
    assert_eq!(ab_release(param), -1);
}

#[test]
fn init_json_is_idempotent_and_validates_input() {
    setup();
    let config = CString::new(r#"{"max_handles": 4}"#).unwrap();
    assert_eq!(unsafe { ab_init_json(config.as_ptr()) }, 0);
    assert!(ab_handle_count() >= 0);

    let bad = CString::new(r#"{"max_handles": "four"}"#).unwrap();
    assert_eq!(unsafe { ab_init_json(bad.as_ptr()) }, -1);
    assert!(last_error().unwrap().starts_with("Configuration error"));
    assert_eq!(unsafe { ab_init_json(std::ptr::null()) }, -1);
}
