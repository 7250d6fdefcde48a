//! Async work: execute off the host thread, complete on it, cancel only
//! before execution starts.

mod common;

use common::*;
use skellig_abi::*;
use std::os::raw::c_void;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

extern "C" fn register(_env: napi_env, exports: napi_value) -> napi_value {
    exports
}

static EXECUTED_ON: OnceLock<std::thread::ThreadId> = OnceLock::new();
static COMPLETED: AtomicUsize = AtomicUsize::new(0);
static COMPLETE_STATUS: AtomicUsize = AtomicUsize::new(usize::MAX);

extern "C" fn execute(_env: napi_env, data: *mut c_void) {
    assert_eq!(data as usize, 0x42);
    let _ = EXECUTED_ON.set(std::thread::current().id());
}

extern "C" fn complete(env: napi_env, status: napi_status, data: *mut c_void) {
    assert_eq!(data as usize, 0x42);
    COMPLETE_STATUS.store(status as usize, Ordering::SeqCst);
    COMPLETED.fetch_add(1, Ordering::SeqCst);
    // Completion runs inside a scope on the host thread: creating values
    // must work here.
    let mut value = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_int32(env, 1, &mut value));
}

fn make_work(
    raw_env: napi_env,
    data: usize,
    complete_cb: napi_async_complete_callback,
) -> napi_async_work {
    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));
    let mut resource_name = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_string_utf8(
        raw_env,
        cstr!("work-test"),
        NAPI_AUTO_LENGTH,
        &mut resource_name,
    ));
    let mut work = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_async_work(
        raw_env,
        ptr::null_mut(),
        resource_name,
        execute,
        Some(complete_cb),
        data as *mut c_void,
        &mut work,
    ));
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    work
}

#[test]
fn test_execute_runs_off_thread_and_complete_on_host() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "work.node", register);
    let raw_env = rt.raw_env(env);

    let work = make_work(raw_env, 0x42, complete);
    assert_napi_ok!(skellig_shim::napi_queue_async_work(raw_env, work));

    // Queueing twice is rejected.
    assert_napi_status!(
        skellig_shim::napi_queue_async_work(raw_env, work),
        napi_generic_failure
    );

    let mut spins = 0;
    while COMPLETED.load(Ordering::SeqCst) == 0 {
        if !rt.pump() {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        spins += 1;
        assert!(spins < 5000, "completion never arrived");
    }

    assert_eq!(COMPLETE_STATUS.load(Ordering::SeqCst), napi_ok as usize);
    let executed_on = EXECUTED_ON.get().expect("execute ran");
    assert_ne!(*executed_on, std::thread::current().id());

    assert_napi_ok!(skellig_shim::napi_delete_async_work(raw_env, work));
    rt.destroy_env(env).unwrap();
}

static CANCELLED_COMPLETED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn cancelled_complete(_env: napi_env, status: napi_status, _data: *mut c_void) {
    assert_eq!(status, napi_cancelled);
    CANCELLED_COMPLETED.fetch_add(1, Ordering::SeqCst);
}

extern "C" fn must_not_execute(_env: napi_env, _data: *mut c_void) {
    panic!("cancelled work must not execute");
}

#[test]
fn test_cancel_before_start_skips_execute() {
    let mut rt =
        skellig_runtime::Runtime::new(skellig_runtime::RuntimeOptions::default().with_worker_threads(1));
    let env = load_addon(&mut rt, "work.node", register);
    let raw_env = rt.raw_env(env);

    // One blocker job occupies the single worker so the second work item
    // is still queued when we cancel it.
    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));
    let mut resource_name = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_string_utf8(
        raw_env,
        cstr!("blocker"),
        NAPI_AUTO_LENGTH,
        &mut resource_name,
    ));
    unsafe extern "C" fn blocker_execute(_env: napi_env, _data: *mut c_void) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    let mut blocker = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_async_work(
        raw_env,
        ptr::null_mut(),
        resource_name,
        blocker_execute,
        None,
        ptr::null_mut(),
        &mut blocker,
    ));
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    assert_napi_ok!(skellig_shim::napi_queue_async_work(raw_env, blocker));

    let cancelled = {
        let mut scope = ptr::null_mut();
        assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));
        let mut resource_name = ptr::null_mut();
        assert_napi_ok!(skellig_shim::napi_create_string_utf8(
            raw_env,
            cstr!("cancelled"),
            NAPI_AUTO_LENGTH,
            &mut resource_name,
        ));
        let mut work = ptr::null_mut();
        assert_napi_ok!(skellig_shim::napi_create_async_work(
            raw_env,
            ptr::null_mut(),
            resource_name,
            must_not_execute,
            Some(cancelled_complete),
            ptr::null_mut(),
            &mut work,
        ));
        assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
        work
    };
    assert_napi_ok!(skellig_shim::napi_queue_async_work(raw_env, cancelled));
    assert_napi_ok!(skellig_shim::napi_cancel_async_work(raw_env, cancelled));

    let mut spins = 0;
    while CANCELLED_COMPLETED.load(Ordering::SeqCst) == 0 {
        if !rt.pump() {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        spins += 1;
        assert!(spins < 5000, "cancelled completion never arrived");
    }

    assert_napi_ok!(skellig_shim::napi_delete_async_work(raw_env, blocker));
    assert_napi_ok!(skellig_shim::napi_delete_async_work(raw_env, cancelled));
    rt.destroy_env(env).unwrap();
}
