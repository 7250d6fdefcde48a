//! Handle store and scope invariants through the ABI: stability,
//! balance, escape uniqueness, singleton identity, UTF-8 round trip.

mod common;

use common::*;
use skellig_abi::*;
use std::os::raw::c_char;
use std::ptr;

extern "C" fn register(_env: napi_env, exports: napi_value) -> napi_value {
    exports
}

#[test]
fn test_singleton_handle_identity() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "scopes.node", register);
    let raw_env = rt.raw_env(env);

    let mut undefined = ptr::null_mut();
    let mut null = ptr::null_mut();
    let mut truthy = ptr::null_mut();
    let mut falsy = ptr::null_mut();
    let mut global = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_get_undefined(raw_env, &mut undefined));
    assert_napi_ok!(skellig_shim::napi_get_null(raw_env, &mut null));
    assert_napi_ok!(skellig_shim::napi_get_boolean(raw_env, true, &mut truthy));
    assert_napi_ok!(skellig_shim::napi_get_boolean(raw_env, false, &mut falsy));
    assert_napi_ok!(skellig_shim::napi_get_global(raw_env, &mut global));

    assert_eq!(undefined as usize, 2);
    assert_eq!(null as usize, 3);
    assert_eq!(falsy as usize, 4);
    assert_eq!(truthy as usize, 5);
    assert_eq!(global as usize, 6);

    // Identical across a second environment.
    let env2 = load_addon(&mut rt, "scopes2.node", register);
    let raw_env2 = rt.raw_env(env2);
    let mut undefined2 = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_get_undefined(raw_env2, &mut undefined2));
    assert_eq!(undefined2 as usize, 2);

    rt.destroy_env(env2).unwrap();
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_handle_stays_valid_until_scope_closes() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "scopes.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    let mut value = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_double(raw_env, 1.25, &mut value));
    let mut read = 0f64;
    assert_napi_ok!(skellig_shim::napi_get_value_double(raw_env, value, &mut read));
    assert_eq!(read, 1.25);

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));

    // The handle is dead once its scope closed.
    let mut scope2 = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope2));
    assert_napi_status!(
        skellig_shim::napi_get_value_double(raw_env, value, &mut read),
        napi_invalid_arg
    );
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope2));
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_value_creation_requires_open_scope() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "scopes.node", register);
    let raw_env = rt.raw_env(env);

    let mut value = ptr::null_mut();
    assert_napi_status!(
        skellig_shim::napi_create_double(raw_env, 1.0, &mut value),
        napi_handle_scope_mismatch
    );
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_non_lifo_scope_close_fails() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "scopes.node", register);
    let raw_env = rt.raw_env(env);

    let mut outer = ptr::null_mut();
    let mut inner = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut outer));
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut inner));

    assert_napi_status!(
        skellig_shim::napi_close_handle_scope(raw_env, outer),
        napi_handle_scope_mismatch
    );
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, inner));
    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, outer));
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_escape_promotes_exactly_once() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "scopes.node", register);
    let raw_env = rt.raw_env(env);

    let mut outer = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut outer));

    let mut escapable = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_escapable_handle_scope(
        raw_env,
        &mut escapable
    ));

    let mut inner_value = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_double(raw_env, 7.0, &mut inner_value));

    let mut escaped = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_escape_handle(
        raw_env,
        escapable,
        inner_value,
        &mut escaped
    ));

    let mut second = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_double(raw_env, 8.0, &mut second));
    let mut escaped2 = ptr::null_mut();
    assert_napi_status!(
        skellig_shim::napi_escape_handle(raw_env, escapable, second, &mut escaped2),
        napi_escape_called_twice
    );

    assert_napi_ok!(skellig_shim::napi_close_escapable_handle_scope(
        raw_env, escapable
    ));

    // The promoted handle survived the escapable scope.
    let mut read = 0f64;
    assert_napi_ok!(skellig_shim::napi_get_value_double(raw_env, escaped, &mut read));
    assert_eq!(read, 7.0);
    // The original did not.
    assert_napi_status!(
        skellig_shim::napi_get_value_double(raw_env, inner_value, &mut read),
        napi_invalid_arg
    );

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, outer));
    rt.destroy_env(env).unwrap();
}

#[test]
fn test_utf8_round_trip_with_length_semantics() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "scopes.node", register);
    let raw_env = rt.raw_env(env);

    let mut scope = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_open_handle_scope(raw_env, &mut scope));

    let original = "grá agus síocháin";
    let c_original = std::ffi::CString::new(original).unwrap();
    let mut value = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_string_utf8(
        raw_env,
        c_original.as_ptr(),
        NAPI_AUTO_LENGTH,
        &mut value,
    ));

    // Null buffer queries the total byte length.
    let mut length = 0usize;
    assert_napi_ok!(skellig_shim::napi_get_value_string_utf8(
        raw_env,
        value,
        ptr::null_mut(),
        0,
        &mut length,
    ));
    assert_eq!(length, original.len());

    // A big enough buffer round-trips exactly.
    let mut buf = vec![0 as c_char; length + 1];
    let mut written = 0usize;
    assert_napi_ok!(skellig_shim::napi_get_value_string_utf8(
        raw_env,
        value,
        buf.as_mut_ptr(),
        buf.len(),
        &mut written,
    ));
    assert_eq!(written, original.len());
    let round_tripped = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
    assert_eq!(round_tripped.to_str().unwrap(), original);

    // A short buffer truncates at a character boundary and still
    // NUL-terminates.
    let mut small = [0 as c_char; 4];
    assert_napi_ok!(skellig_shim::napi_get_value_string_utf8(
        raw_env,
        value,
        small.as_mut_ptr(),
        small.len(),
        &mut written,
    ));
    assert!(written < 4);
    let truncated = unsafe { std::ffi::CStr::from_ptr(small.as_ptr()) };
    assert!(original.starts_with(truncated.to_str().unwrap()));

    assert_napi_ok!(skellig_shim::napi_close_handle_scope(raw_env, scope));
    rt.destroy_env(env).unwrap();
}
