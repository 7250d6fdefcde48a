//! Wrap lifecycle: the finalizer fires exactly once across collection and
//! environment teardown, and `napi_remove_wrap` surrenders without
//! finalizing.

mod common;

use common::*;
use skellig_abi::*;
use skellig_runtime::Value;
use std::os::raw::c_void;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

static FINALIZED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn count_finalize(_env: napi_env, data: *mut c_void, hint: *mut c_void) {
    assert_eq!(data, 0x5150 as *mut c_void);
    assert_eq!(hint, 0x1d0 as *mut c_void);
    FINALIZED.fetch_add(1, Ordering::SeqCst);
}

extern "C" fn register(_env: napi_env, exports: napi_value) -> napi_value {
    exports
}

#[test]
fn test_wrap_finalizer_runs_once_across_collection_and_teardown() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "wrap.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    let mut object = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_object(raw_env, &mut object));
    assert_napi_ok!(skellig_shim::napi_wrap(
        raw_env,
        object,
        0x5150 as *mut c_void,
        Some(count_finalize),
        0x1d0 as *mut c_void,
        ptr::null_mut(),
    ));

    let mut unwrapped = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_unwrap(raw_env, object, &mut unwrapped));
    assert_eq!(unwrapped, 0x5150 as *mut c_void);

    // Still reachable: a sweep must not fire the finalizer.
    assert_eq!(rt.collect(env), 0);
    assert_eq!(FINALIZED.load(Ordering::SeqCst), 0);

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    assert_eq!(rt.collect(env), 1);
    assert_eq!(FINALIZED.load(Ordering::SeqCst), 1);

    // Teardown must not fire it a second time.
    rt.destroy_env(env).unwrap();
    assert_eq!(FINALIZED.load(Ordering::SeqCst), 1);
}

static REMOVED_FINALIZED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn removed_finalize(_env: napi_env, _data: *mut c_void, _hint: *mut c_void) {
    REMOVED_FINALIZED.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_remove_wrap_detaches_without_finalizing() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "wrap.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    let mut object = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_object(raw_env, &mut object));
    assert_napi_ok!(skellig_shim::napi_wrap(
        raw_env,
        object,
        0xbeef as *mut c_void,
        Some(removed_finalize),
        ptr::null_mut(),
        ptr::null_mut(),
    ));

    // Double wrap is rejected.
    assert_napi_status!(
        skellig_shim::napi_wrap(
            raw_env,
            object,
            0xdead as *mut c_void,
            None,
            ptr::null_mut(),
            ptr::null_mut(),
        ),
        napi_invalid_arg
    );

    let mut recovered = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_remove_wrap(raw_env, object, &mut recovered));
    assert_eq!(recovered, 0xbeef as *mut c_void);

    // The association is gone.
    let mut unused = ptr::null_mut();
    assert_napi_status!(
        skellig_shim::napi_unwrap(raw_env, object, &mut unused),
        napi_invalid_arg
    );

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    rt.collect(env);
    rt.destroy_env(env).unwrap();
    assert_eq!(REMOVED_FINALIZED.load(Ordering::SeqCst), 0);
}

#[test]
fn test_wrapped_object_kept_alive_by_host_value() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "wrap.node", register);
    let raw_env = rt.raw_env(env);

    static KEPT_FINALIZED: AtomicUsize = AtomicUsize::new(0);
    extern "C" fn kept_finalize(_env: napi_env, _data: *mut c_void, _hint: *mut c_void) {
        KEPT_FINALIZED.fetch_add(1, Ordering::SeqCst);
    }

    let kept: Value;
    {
        let mut scope = ptr::null_mut();
        assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));
        let mut object = ptr::null_mut();
        assert_napi_ok!(skellig_shim::napi_create_object(raw_env, &mut object));
        assert_napi_ok!(skellig_shim::napi_wrap(
            raw_env,
            object,
            0x77 as *mut c_void,
            Some(kept_finalize),
            ptr::null_mut(),
            ptr::null_mut(),
        ));
        kept = rt.value_of(env, object).unwrap();
        assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    }

    // The host still holds the object; no collection happens.
    assert_eq!(rt.collect(env), 0);
    assert_eq!(KEPT_FINALIZED.load(Ordering::SeqCst), 0);

    drop(kept);
    assert_eq!(rt.collect(env), 1);
    assert_eq!(KEPT_FINALIZED.load(Ordering::SeqCst), 1);
    rt.destroy_env(env).unwrap();
    assert_eq!(KEPT_FINALIZED.load(Ordering::SeqCst), 1);
}
