//! Shared helpers for the simulated-add-on integration tests.
//!
//! Tests drive the runtime exactly the way a native add-on would: through
//! the C symbols the shim exports, with the registration context coming
//! from the host-facing `Runtime`.

#![allow(dead_code)]

use skellig_abi::{napi_env, napi_value};
use skellig_runtime::{Runtime, RuntimeOptions};

pub fn runtime() -> Runtime {
    Runtime::new(RuntimeOptions::default().with_worker_threads(2))
}

/// Registers a simulated add-on: runs `register` with the registration
/// context and completes with whatever it returns.
pub fn load_addon(
    rt: &mut Runtime,
    name: &str,
    register: unsafe extern "C" fn(napi_env, napi_value) -> napi_value,
) -> skellig_runtime::env::EnvId {
    let env = rt.create_env(name);
    let ctx = rt.registration(env).expect("registration context");
    let returned = unsafe { register(ctx.env, ctx.exports) };
    rt.complete_registration(env, returned)
        .expect("registration should succeed");
    env
}

macro_rules! cstr {
    ($s:literal) => {
        concat!($s, "\0").as_ptr().cast::<std::os::raw::c_char>()
    };
}

macro_rules! assert_napi_ok {
    ($call:expr) => {{
        assert_eq!(unsafe { $call }, skellig_abi::napi_ok);
    }};
}

macro_rules! assert_napi_status {
    ($call:expr, $status:expr) => {{
        assert_eq!(unsafe { $call }, $status);
    }};
}

macro_rules! napi_get_callback_info {
    ($env:expr, $callback_info:expr, $size:literal) => {{
        let mut args = [std::ptr::null_mut(); $size];
        let mut argc = $size;
        let mut this = std::ptr::null_mut();
        assert_eq!(
            unsafe {
                skellig_shim::napi_get_cb_info(
                    $env,
                    $callback_info,
                    &mut argc,
                    args.as_mut_ptr(),
                    &mut this,
                    std::ptr::null_mut(),
                )
            },
            skellig_abi::napi_ok,
        );
        (args, argc, this)
    }};
}

macro_rules! napi_new_property {
    ($name:literal, $value:expr) => {
        skellig_abi::napi_property_descriptor {
            utf8name: concat!($name, "\0").as_ptr().cast::<std::os::raw::c_char>(),
            name: std::ptr::null_mut(),
            method: Some($value),
            getter: None,
            setter: None,
            value: std::ptr::null_mut(),
            attributes: skellig_abi::napi_default_method,
            data: std::ptr::null_mut(),
        }
    };
}

pub(crate) use {assert_napi_ok, assert_napi_status, cstr, napi_get_callback_info, napi_new_property};
