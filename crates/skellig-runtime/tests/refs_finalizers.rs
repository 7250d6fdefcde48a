//! References, finalizers, cleanup hooks and instance data through the
//! ABI.

mod common;

use common::*;
use skellig_abi::*;
use std::os::raw::c_void;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

extern "C" fn register(_env: napi_env, exports: napi_value) -> napi_value {
    exports
}

#[test]
fn test_reference_ref_unref_round_trip() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "refs.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));
    let mut object = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_object(raw_env, &mut object));

    let mut reference = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_reference(
        raw_env,
        object,
        3,
        &mut reference
    ));

    let mut count = 0u32;
    for expected in [4, 5, 6] {
        assert_napi_ok!(skellig_shim::napi_reference_ref(raw_env, reference, &mut count));
        assert_eq!(count, expected);
    }
    for expected in [5, 4, 3] {
        assert_napi_ok!(skellig_shim::napi_reference_unref(raw_env, reference, &mut count));
        assert_eq!(count, expected);
    }

    assert_napi_ok!(skellig_shim::napi_delete_reference(raw_env, reference));
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_strong_reference_outlives_scope_weak_does_not() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "refs.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));
    let mut object = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_object(raw_env, &mut object));

    let mut strong = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_reference(raw_env, object, 1, &mut strong));
    let mut weak = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_reference(raw_env, object, 0, &mut weak));

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));

    let mut scope2 = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope2));

    // The strong reference pins the target; both references still see it.
    let mut from_strong = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_get_reference_value(
        raw_env,
        strong,
        &mut from_strong
    ));
    assert!(!from_strong.is_null());
    let mut from_weak = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_get_reference_value(raw_env, weak, &mut from_weak));
    assert!(!from_weak.is_null());

    // The scoped handle from the weak read also pins the target; drop it
    // before releasing the strong count.
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope2));

    // Dropping the strong count releases the target; the weak read turns
    // empty.
    let mut count = 1u32;
    assert_napi_ok!(skellig_shim::napi_reference_unref(raw_env, strong, &mut count));
    assert_eq!(count, 0);
    rt.collect(env);

    let mut scope3 = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope3));
    assert_napi_ok!(skellig_shim::napi_get_reference_value(raw_env, weak, &mut from_weak));
    assert!(from_weak.is_null());

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope3));
    rt.destroy_env(env).unwrap();
}

static DELETED_REF_FINALIZED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn deleted_ref_finalize(_env: napi_env, _data: *mut c_void, _hint: *mut c_void) {
    DELETED_REF_FINALIZED.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_explicit_reference_deletion_never_finalizes() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "refs.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));
    let mut object = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_object(raw_env, &mut object));

    let mut reference = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_add_finalizer(
        raw_env,
        object,
        ptr::null_mut(),
        deleted_ref_finalize,
        ptr::null_mut(),
        &mut reference,
    ));
    assert_napi_ok!(skellig_shim::napi_delete_reference(raw_env, reference));
    assert_eq!(DELETED_REF_FINALIZED.load(Ordering::SeqCst), 0);

    // The finalizer registration is independent of the reference: once
    // the object goes away it still runs, exactly once.
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    rt.collect(env);
    assert_eq!(DELETED_REF_FINALIZED.load(Ordering::SeqCst), 1);
    rt.destroy_env(env).unwrap();
    assert_eq!(DELETED_REF_FINALIZED.load(Ordering::SeqCst), 1);
}

static CLEANUP_ORDER: Mutex<Vec<i64>> = Mutex::new(Vec::new());

extern "C" fn record_cleanup(arg: *mut c_void) {
    CLEANUP_ORDER.lock().unwrap().push(arg as i64);
}

extern "C" fn removed_cleanup(_arg: *mut c_void) {
    panic!("removed cleanup hook must not run");
}

#[test]
fn test_cleanup_hooks_run_lifo_and_respect_removal() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "refs.node", register);
    let raw_env = rt.raw_env(env);

    assert_napi_ok!(skellig_shim::napi_add_env_cleanup_hook(
        raw_env,
        Some(record_cleanup),
        1 as *mut c_void
    ));
    assert_napi_ok!(skellig_shim::napi_add_env_cleanup_hook(
        raw_env,
        Some(removed_cleanup),
        2 as *mut c_void
    ));
    assert_napi_ok!(skellig_shim::napi_add_env_cleanup_hook(
        raw_env,
        Some(record_cleanup),
        3 as *mut c_void
    ));
    assert_napi_ok!(skellig_shim::napi_remove_env_cleanup_hook(
        raw_env,
        Some(removed_cleanup),
        2 as *mut c_void
    ));

    rt.destroy_env(env).unwrap();
    assert_eq!(CLEANUP_ORDER.lock().unwrap().as_slice(), &[3, 1]);
}

static INSTANCE_FINALIZED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn instance_finalize(_env: napi_env, data: *mut c_void, _hint: *mut c_void) {
    assert_eq!(data as usize, 0xabc);
    INSTANCE_FINALIZED.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_instance_data_round_trip_and_finalize() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "refs.node", register);
    let raw_env = rt.raw_env(env);

    assert_napi_ok!(skellig_shim::napi_set_instance_data(
        raw_env,
        0xabc as *mut c_void,
        Some(instance_finalize),
        ptr::null_mut(),
    ));
    let mut data = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_get_instance_data(raw_env, &mut data));
    assert_eq!(data as usize, 0xabc);

    rt.destroy_env(env).unwrap();
    assert_eq!(INSTANCE_FINALIZED.load(Ordering::SeqCst), 1);
}

static POSTED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn posted_finalize(_env: napi_env, data: *mut c_void, _hint: *mut c_void) {
    assert_eq!(data as usize, 7);
    POSTED.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_posted_finalizer_runs_on_pump() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "refs.node", register);
    let raw_env = rt.raw_env(env);

    assert_napi_ok!(skellig_shim::node_api_post_finalizer(
        raw_env,
        posted_finalize,
        7 as *mut c_void,
        ptr::null_mut(),
    ));
    assert_eq!(POSTED.load(Ordering::SeqCst), 0);
    rt.pump();
    assert_eq!(POSTED.load(Ordering::SeqCst), 1);
    rt.destroy_env(env).unwrap();
}
