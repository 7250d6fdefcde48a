//! Promise scenario: create, settle once, observe from the host; a
//! second settlement fails.

mod common;

use common::*;
use skellig_abi::*;
use skellig_runtime::{ExceptionKind, RuntimeError};
use std::ptr;

extern "C" fn register(_env: napi_env, exports: napi_value) -> napi_value {
    exports
}

#[test]
fn test_resolved_promise_yields_value() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "promise.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    let mut deferred = ptr::null_mut();
    let mut promise = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_promise(
        raw_env,
        &mut deferred,
        &mut promise
    ));

    let mut is_promise = false;
    assert_napi_ok!(skellig_shim::napi_is_promise(raw_env, promise, &mut is_promise));
    assert!(is_promise);

    let promise_value = rt.value_of(env, promise).unwrap();

    let mut forty_two = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_int32(raw_env, 42, &mut forty_two));
    assert_napi_ok!(skellig_shim::napi_resolve_deferred(raw_env, deferred, forty_two));

    // Settling consumed the deferred; rejecting it again must fail.
    let mut error = ptr::null_mut();
    let mut message = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_string_utf8(
        raw_env,
        cstr!("late"),
        NAPI_AUTO_LENGTH,
        &mut message,
    ));
    assert_napi_ok!(skellig_shim::napi_create_error(
        raw_env,
        ptr::null_mut(),
        message,
        &mut error
    ));
    assert_napi_status!(
        skellig_shim::napi_reject_deferred(raw_env, deferred, error),
        napi_invalid_arg
    );

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));

    let value = rt.await_promise(env, &promise_value).unwrap();
    assert_eq!(value.as_number(), Some(42.0));

    rt.destroy_env(env).unwrap();
}

#[test]
fn test_rejected_promise_surfaces_as_exception() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "promise.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    let mut deferred = ptr::null_mut();
    let mut promise = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_promise(
        raw_env,
        &mut deferred,
        &mut promise
    ));
    let promise_value = rt.value_of(env, promise).unwrap();

    let mut message = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_string_utf8(
        raw_env,
        cstr!("denied"),
        NAPI_AUTO_LENGTH,
        &mut message,
    ));
    let mut error = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_type_error(
        raw_env,
        ptr::null_mut(),
        message,
        &mut error
    ));
    assert_napi_ok!(skellig_shim::napi_reject_deferred(raw_env, deferred, error));
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));

    match rt.await_promise(env, &promise_value) {
        Err(RuntimeError::Exception(exc)) => {
            assert_eq!(exc.kind, ExceptionKind::TypeError);
            assert_eq!(exc.message, "denied");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    rt.destroy_env(env).unwrap();
}

#[test]
fn test_pending_promise_times_out() {
    let mut rt = skellig_runtime::Runtime::new(
        skellig_runtime::RuntimeOptions {
            await_timeout_ms: 50,
            ..Default::default()
        },
    );
    let env = load_addon(&mut rt, "promise.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));
    let mut deferred = ptr::null_mut();
    let mut promise = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_promise(
        raw_env,
        &mut deferred,
        &mut promise
    ));
    let promise_value = rt.value_of(env, promise).unwrap();
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));

    match rt.await_promise(env, &promise_value) {
        Err(RuntimeError::PromisePending) => {}
        other => panic!("expected pending timeout, got {other:?}"),
    }

    rt.destroy_env(env).unwrap();
}
