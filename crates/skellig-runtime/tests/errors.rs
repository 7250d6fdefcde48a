//! Error bridge: pending-exception bookkeeping, status/last-error
//! agreement, and the TypeError round trip out of a native callback.

mod common;

use common::*;
use skellig_abi::*;
use skellig_runtime::{ExceptionKind, RuntimeError, Value};
use std::ptr;

extern "C" fn throw_coded(env: napi_env, _info: napi_callback_info) -> napi_value {
    unsafe {
        skellig_shim::napi_throw_type_error(env, cstr!("E_ARG"), cstr!("bad"));
    }
    ptr::null_mut()
}

extern "C" fn register(env: napi_env, exports: napi_value) -> napi_value {
    let properties = &[napi_new_property!("throwCoded", throw_coded)];
    assert_napi_ok!(skellig_shim::napi_define_properties(
        env,
        exports,
        properties.len(),
        properties.as_ptr(),
    ));
    exports
}

#[test]
fn test_thrown_type_error_reaches_host_with_code() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "errors.node", register);
    let exports = rt.exports(env).unwrap();
    let thrower = rt.get_named(env, &exports, "throwCoded").unwrap();

    match rt.call(env, &thrower, Value::Undefined, &[]) {
        Err(RuntimeError::Exception(exc)) => {
            assert_eq!(exc.kind, ExceptionKind::TypeError);
            assert_eq!(exc.message, "bad");
            assert_eq!(exc.code.as_deref(), Some("E_ARG"));
        }
        other => panic!("expected TypeError, got {other:?}"),
    }
}

#[test]
fn test_is_exception_pending_tracks_throw_and_clear() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "errors.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    let mut pending = true;
    assert_napi_ok!(skellig_shim::napi_is_exception_pending(raw_env, &mut pending));
    assert!(!pending);

    assert_napi_ok!(skellig_shim::napi_throw_error(
        raw_env,
        ptr::null(),
        cstr!("boom")
    ));
    assert_napi_ok!(skellig_shim::napi_is_exception_pending(raw_env, &mut pending));
    assert!(pending);

    // Script-running entry points short-circuit while pending.
    let mut obj = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_object(raw_env, &mut obj));
    let mut out = ptr::null_mut();
    assert_napi_status!(
        skellig_shim::napi_get_named_property(raw_env, obj, cstr!("x"), &mut out),
        napi_pending_exception
    );

    let mut exception = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_get_and_clear_last_exception(
        raw_env,
        &mut exception
    ));
    let mut is_error = false;
    assert_napi_ok!(skellig_shim::napi_is_error(raw_env, exception, &mut is_error));
    assert!(is_error);

    assert_napi_ok!(skellig_shim::napi_is_exception_pending(raw_env, &mut pending));
    assert!(!pending);

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_last_error_matches_returned_status() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "errors.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    let mut string = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_string_utf8(
        raw_env,
        cstr!("not a number"),
        NAPI_AUTO_LENGTH,
        &mut string,
    ));
    let mut number = 0f64;
    assert_napi_status!(
        skellig_shim::napi_get_value_double(raw_env, string, &mut number),
        napi_number_expected
    );

    let mut info = ptr::null();
    assert_napi_ok!(skellig_shim::napi_get_last_error_info(raw_env, &mut info));
    let info = unsafe { &*info };
    assert_eq!(info.status_code, napi_number_expected);
    assert!(!info.error_message.is_null());

    // A succeeding call resets the record.
    let mut obj = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_object(raw_env, &mut obj));
    let mut info = ptr::null();
    assert_napi_ok!(skellig_shim::napi_get_last_error_info(raw_env, &mut info));
    assert_eq!(unsafe { &*info }.status_code, napi_ok);

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_throw_while_pending_is_rejected() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "errors.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    assert_napi_ok!(skellig_shim::napi_throw_error(
        raw_env,
        ptr::null(),
        cstr!("first")
    ));
    assert_napi_status!(
        skellig_shim::napi_throw_error(raw_env, ptr::null(), cstr!("second")),
        napi_pending_exception
    );

    let mut exception = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_get_and_clear_last_exception(
        raw_env,
        &mut exception
    ));
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_fatal_error_logs_and_returns() {
    let rt = runtime();
    unsafe {
        skellig_shim::napi_fatal_error(
            cstr!("test_location"),
            NAPI_AUTO_LENGTH,
            cstr!("survivable"),
            NAPI_AUTO_LENGTH,
        );
    }
    drop(rt);
}
