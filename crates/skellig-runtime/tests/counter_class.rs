//! The counter-class scenario: `napi_define_class` with a wrapped native
//! struct, an instance method, an accessor pair and a static factory.

mod common;

use common::*;
use skellig_abi::*;
use skellig_runtime::Value;
use std::os::raw::c_void;
use std::ptr;

struct Counter {
    count: i32,
}

extern "C" fn finalize_counter(_env: napi_env, data: *mut c_void, _hint: *mut c_void) {
    drop(unsafe { Box::from_raw(data.cast::<Counter>()) });
}

extern "C" fn constructor(env: napi_env, info: napi_callback_info) -> napi_value {
    let mut new_target = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_get_new_target(env, info, &mut new_target));
    assert!(!new_target.is_null(), "constructed without new protocol");

    let (args, argc, this) = napi_get_callback_info!(env, info, 1);
    let initial = if argc >= 1 {
        let mut value = 0i32;
        assert_napi_ok!(skellig_shim::napi_get_value_int32(env, args[0], &mut value));
        value
    } else {
        0
    };

    let counter = Box::into_raw(Box::new(Counter { count: initial }));
    assert_napi_ok!(skellig_shim::napi_wrap(
        env,
        this,
        counter.cast(),
        Some(finalize_counter),
        ptr::null_mut(),
        ptr::null_mut(),
    ));
    this
}

unsafe fn unwrap_counter(env: napi_env, this: napi_value) -> *mut Counter {
    let mut raw = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_unwrap(env, this, &mut raw));
    raw.cast()
}

extern "C" fn increment(env: napi_env, info: napi_callback_info) -> napi_value {
    let (_args, _argc, this) = napi_get_callback_info!(env, info, 0);
    let counter = unsafe { unwrap_counter(env, this) };
    unsafe { (*counter).count += 1 };
    ptr::null_mut()
}

extern "C" fn get_value(env: napi_env, info: napi_callback_info) -> napi_value {
    let (_args, _argc, this) = napi_get_callback_info!(env, info, 0);
    let counter = unsafe { unwrap_counter(env, this) };
    let mut result = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_int32(
        env,
        unsafe { (*counter).count },
        &mut result
    ));
    result
}

extern "C" fn factory(env: napi_env, info: napi_callback_info) -> napi_value {
    let (_args, _argc, _this) = napi_get_callback_info!(env, info, 0);
    let mut result = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_create_int64(env, 64, &mut result));
    result
}

extern "C" fn register(env: napi_env, exports: napi_value) -> napi_value {
    let mut static_prop = napi_new_property!("factory", factory);
    static_prop.attributes = napi_static;

    let value_accessor = napi_property_descriptor {
        utf8name: cstr!("value"),
        name: ptr::null_mut(),
        method: None,
        getter: Some(get_value),
        setter: None,
        value: ptr::null_mut(),
        attributes: napi_enumerable,
        data: ptr::null_mut(),
    };

    let properties = &[
        napi_new_property!("increment", increment),
        value_accessor,
        static_prop,
    ];

    let mut constructor_value = ptr::null_mut();
    assert_napi_ok!(skellig_shim::napi_define_class(
        env,
        cstr!("Counter"),
        NAPI_AUTO_LENGTH,
        constructor,
        ptr::null_mut(),
        properties.len(),
        properties.as_ptr(),
        &mut constructor_value,
    ));
    assert_napi_ok!(skellig_shim::napi_set_named_property(
        env,
        exports,
        cstr!("Counter"),
        constructor_value,
    ));
    exports
}

#[test]
fn test_counter_increments_through_instance_methods() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "counter.node", register);
    let exports = rt.exports(env).unwrap();
    let class = rt.get_named(env, &exports, "Counter").unwrap();

    let instance = rt.construct(env, &class, &[Value::Number(0.0)]).unwrap();
    let increment = rt.get_named(env, &instance, "increment").unwrap();
    for _ in 0..3 {
        rt.call(env, &increment, instance.clone(), &[]).unwrap();
    }
    let value = rt.get_named(env, &instance, "value").unwrap();
    assert_eq!(value.as_number(), Some(3.0));
}

#[test]
fn test_counter_starts_from_constructor_argument() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "counter.node", register);
    let exports = rt.exports(env).unwrap();
    let class = rt.get_named(env, &exports, "Counter").unwrap();

    let instance = rt.construct(env, &class, &[Value::Number(40.0)]).unwrap();
    let increment = rt.get_named(env, &instance, "increment").unwrap();
    rt.call(env, &increment, instance.clone(), &[]).unwrap();
    rt.call(env, &increment, instance.clone(), &[]).unwrap();
    let value = rt.get_named(env, &instance, "value").unwrap();
    assert_eq!(value.as_number(), Some(42.0));
}

#[test]
fn test_static_factory_lives_on_constructor() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "counter.node", register);
    let exports = rt.exports(env).unwrap();
    let class = rt.get_named(env, &exports, "Counter").unwrap();

    let factory = rt.get_named(env, &class, "factory").unwrap();
    let result = rt.call(env, &factory, class.clone(), &[]).unwrap();
    assert_eq!(result.as_number(), Some(64.0));

    // Instances do not see static members.
    let instance = rt.construct(env, &class, &[Value::Number(0.0)]).unwrap();
    let missing = rt.get_named(env, &instance, "factory").unwrap();
    assert!(missing.strict_equals(&Value::Undefined));
}

#[test]
fn test_two_instances_have_independent_state() {
    let mut rt = runtime();
    let env = load_addon(&mut rt, "counter.node", register);
    let exports = rt.exports(env).unwrap();
    let class = rt.get_named(env, &exports, "Counter").unwrap();

    let a = rt.construct(env, &class, &[Value::Number(1.0)]).unwrap();
    let b = rt.construct(env, &class, &[Value::Number(10.0)]).unwrap();
    let increment = rt.get_named(env, &a, "increment").unwrap();
    rt.call(env, &increment, a.clone(), &[]).unwrap();

    let value_a = rt.get_named(env, &a, "value").unwrap();
    let value_b = rt.get_named(env, &b, "value").unwrap();
    assert_eq!(value_a.as_number(), Some(2.0));
    assert_eq!(value_b.as_number(), Some(10.0));
}
