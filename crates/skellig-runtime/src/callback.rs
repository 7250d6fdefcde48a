//! Callback trampoline and object property operations.
//!
//! The trampoline is the host-callable face of a native function: it opens
//! a handle scope, materializes the transient callback-info record whose
//! address becomes the `napi_callback_info`, invokes the native callback,
//! surfaces any pending exception, and closes the scope on every path.
//!
//! Property operations live here too because accessor properties re-enter
//! the trampoline: a `napi_get_property` on an accessor runs its getter.

use skellig_abi::{napi_callback_info, Error};
use std::os::raw::c_void;

use crate::context::{env_to_raw, with_env};
use crate::env::EnvId;
use crate::handles::HandleId;
use crate::value::{ObjectData, ObjectRef, Property, PropertyKey, PropertySlot, Value};

/// The transient record behind `napi_callback_info`. Stack-allocated for
/// the duration of one native callback invocation.
pub struct CallbackInfo {
    pub this: HandleId,
    pub args: Vec<HandleId>,
    pub data: *mut c_void,
    /// Zero when the callable was not invoked through the `new` protocol.
    pub new_target: HandleId,
}

impl CallbackInfo {
    pub fn as_raw(&mut self) -> napi_callback_info {
        std::ptr::from_mut(self).cast::<c_void>()
    }

    /// # Safety
    /// `raw` must be a pointer previously produced by [`Self::as_raw`]
    /// during a still-active callback invocation.
    pub unsafe fn from_raw<'a>(raw: napi_callback_info) -> Option<&'a Self> {
        unsafe { raw.cast::<Self>().as_ref() }
    }
}

fn callable_parts(callable: &Value) -> Result<(skellig_abi::napi_callback, *mut c_void), Error> {
    let obj = callable.as_object().ok_or(Error::FunctionExpected)?;
    let data = obj.borrow();
    let parts = data.callable.as_ref().ok_or(Error::FunctionExpected)?;
    Ok((parts.callback, parts.data))
}

/// Invokes a host-callable value with the given receiver and arguments.
///
/// On return with a pending exception the exception is left in the
/// environment slot and `Error::PendingException` is reported; callers on
/// the ABI path propagate the status, callers on the host path convert the
/// slot into a [`crate::error::HostException`].
pub fn invoke_callable(
    env_id: EnvId,
    callable: &Value,
    this: Value,
    args: &[Value],
    new_target: Option<&Value>,
) -> Result<Value, Error> {
    let (callback, data) = callable_parts(callable)?;
    let raw_env = env_to_raw(env_id);

    let (depth, mut info) = with_env(env_id, |env| -> Result<_, Error> {
        let depth = env.store.open_scope(false);
        let this = env.store.alloc_scoped(this)?;
        let mut arg_ids = Vec::with_capacity(args.len());
        for arg in args {
            arg_ids.push(env.store.alloc_scoped(arg.clone())?);
        }
        let new_target = match new_target {
            Some(target) => env.store.alloc_scoped(target.clone())?,
            None => 0,
        };
        Ok((
            depth,
            CallbackInfo {
                this,
                args: arg_ids,
                data,
                new_target,
            },
        ))
    })??;

    // No environment borrow is held across the native call.
    let returned = unsafe { callback(raw_env, info.as_raw()) };

    let result = with_env(env_id, |env| -> Result<Value, Error> {
        if env.has_exception() {
            return Err(Error::PendingException);
        }
        let value = match crate::context::value_from_raw(returned) {
            Some(id) => env.store.get_cloned(id).unwrap_or(Value::Undefined),
            None => Value::Undefined,
        };
        Ok(value)
    })?;

    with_env(env_id, |env| {
        let _ = env.store.close_scope(depth, false);
    })?;

    result
}

/// Constructs an instance of a class defined by `napi_define_class` (or a
/// plain native function used as a constructor).
pub fn construct_instance(
    env_id: EnvId,
    constructor: &Value,
    args: &[Value],
) -> Result<Value, Error> {
    let prototype = {
        let obj = constructor.as_object().ok_or(Error::FunctionExpected)?;
        let data = obj.borrow();
        let callable = data.callable.as_ref().ok_or(Error::FunctionExpected)?;
        callable.class_prototype.clone()
    };

    let instance = ObjectData::new();
    instance.borrow_mut().proto = prototype;
    let instance = Value::Object(instance);

    let returned = invoke_callable(
        env_id,
        constructor,
        instance.clone(),
        args,
        Some(constructor),
    )?;

    // A constructor returning an object overrides the allocated instance.
    if returned.is_object_like() {
        Ok(returned)
    } else {
        Ok(instance)
    }
}

fn find_property(object: &ObjectRef, key: &PropertyKey) -> Option<Property> {
    let mut current = object.clone();
    loop {
        let next = {
            let data = current.borrow();
            if let Some(prop) = data.props.get(key) {
                return Some(prop.clone());
            }
            data.proto.clone()?
        };
        current = next;
    }
}

/// Reads a property, running the getter of an accessor pair.
pub fn get_property_value(
    env_id: EnvId,
    object: &Value,
    key: &PropertyKey,
) -> Result<Value, Error> {
    let obj = object.as_object().ok_or(Error::ObjectExpected)?;

    if let PropertyKey::Str(name) = key {
        let data = obj.borrow();
        if let Some(elements) = &data.elements {
            if &**name == "length" {
                return Ok(Value::Number(elements.len() as f64));
            }
        }
    }

    match find_property(obj, key) {
        Some(Property {
            slot: PropertySlot::Value(value),
            ..
        }) => Ok(value),
        Some(Property {
            slot: PropertySlot::Accessor { getter, .. },
            ..
        }) => match getter {
            Some(getter) => invoke_callable(env_id, &getter, object.clone(), &[], None),
            None => Ok(Value::Undefined),
        },
        None => Ok(Value::Undefined),
    }
}

/// Writes a property, running the setter of an accessor pair. Writes to a
/// frozen object, or new properties on a sealed object, are silently
/// dropped as in sloppy-mode assignment.
pub fn set_property_value(
    env_id: EnvId,
    object: &Value,
    key: PropertyKey,
    value: Value,
) -> Result<(), Error> {
    let obj = object.as_object().ok_or(Error::ObjectExpected)?;

    let accessor_setter = match find_property(obj, &key) {
        Some(Property {
            slot: PropertySlot::Accessor { setter, .. },
            ..
        }) => Some(setter),
        _ => None,
    };
    if let Some(setter) = accessor_setter {
        if let Some(setter) = setter {
            invoke_callable(env_id, &setter, object.clone(), &[value], None)?;
        }
        return Ok(());
    }

    let mut data = obj.borrow_mut();
    if data.frozen {
        return Ok(());
    }
    if data.sealed && !data.props.contains_key(&key) {
        return Ok(());
    }
    match data.props.get_mut(&key) {
        Some(existing) => {
            if existing.writable() {
                existing.slot = PropertySlot::Value(value);
            }
        }
        None => {
            data.props.insert(
                key,
                Property {
                    slot: PropertySlot::Value(value),
                    attributes: skellig_abi::napi_default_jsproperty,
                },
            );
        }
    }
    Ok(())
}

pub fn has_property_value(object: &Value, key: &PropertyKey) -> Result<bool, Error> {
    let obj = object.as_object().ok_or(Error::ObjectExpected)?;
    if let PropertyKey::Str(name) = key {
        let data = obj.borrow();
        if data.elements.is_some() && &**name == "length" {
            return Ok(true);
        }
    }
    Ok(find_property(obj, key).is_some())
}

pub fn delete_property_value(object: &Value, key: &PropertyKey) -> Result<bool, Error> {
    let obj = object.as_object().ok_or(Error::ObjectExpected)?;
    let mut data = obj.borrow_mut();
    if data.frozen || data.sealed {
        return Ok(false);
    }
    Ok(data.props.shift_remove(key).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::register_env;
    use crate::dispatch::Dispatcher;
    use crate::env::Env;
    use crate::value::CallableData;
    use crate::workers::WorkerPool;
    use skellig_abi::{napi_env, napi_value};

    /// `Env` retains a pool handle clone, and `WorkerPool::drop` joins its
    /// worker threads, so the pool and dispatcher must outlive the
    /// environment and the caller must `unregister_env` before they drop
    /// (mirrors the teardown order in `Runtime::drop`).
    fn test_env() -> (EnvId, WorkerPool, Dispatcher) {
        let dispatcher = Dispatcher::new();
        let pool = WorkerPool::new(1);
        let id =
            register_env(|id, raw| Env::new(id, raw, "cb-test.node", dispatcher.sender(), pool.handle()));
        (id, pool, dispatcher)
    }

    unsafe extern "C" fn return_this(env: napi_env, info: napi_callback_info) -> napi_value {
        let info = unsafe { CallbackInfo::from_raw(info) }.unwrap();
        let _ = env;
        crate::context::value_to_raw(info.this)
    }

    #[test]
    fn test_trampoline_passes_this_through() {
        let (env_id, _pool, _dispatcher) = test_env();
        let func = Value::Object(ObjectData::new_function(CallableData {
            name: "returnThis".to_string(),
            callback: return_this,
            data: std::ptr::null_mut(),
            class_prototype: None,
        }));
        let receiver = Value::object();
        let result = invoke_callable(env_id, &func, receiver.clone(), &[], None).unwrap();
        assert!(result.strict_equals(&receiver));
        let open = with_env(env_id, |env| env.store.open_scopes()).unwrap();
        assert_eq!(open, 0);
        crate::context::unregister_env(env_id);
    }

    #[test]
    fn test_invoking_non_function_fails() {
        let (env_id, _pool, _dispatcher) = test_env();
        let result = invoke_callable(env_id, &Value::object(), Value::Undefined, &[], None);
        assert!(matches!(result, Err(Error::FunctionExpected)));
        crate::context::unregister_env(env_id);
    }

    #[test]
    fn test_data_properties_round_trip() {
        let (env_id, _pool, _dispatcher) = test_env();
        let obj = Value::object();
        set_property_value(env_id, &obj, PropertyKey::str("x"), Value::Number(4.0)).unwrap();
        let got = get_property_value(env_id, &obj, &PropertyKey::str("x")).unwrap();
        assert!(got.strict_equals(&Value::Number(4.0)));
        assert!(has_property_value(&obj, &PropertyKey::str("x")).unwrap());
        assert!(delete_property_value(&obj, &PropertyKey::str("x")).unwrap());
        assert!(!has_property_value(&obj, &PropertyKey::str("x")).unwrap());
        crate::context::unregister_env(env_id);
    }

    #[test]
    fn test_frozen_object_ignores_writes() {
        let (env_id, _pool, _dispatcher) = test_env();
        let obj = Value::object();
        set_property_value(env_id, &obj, PropertyKey::str("x"), Value::Number(1.0)).unwrap();
        obj.as_object().unwrap().borrow_mut().frozen = true;
        set_property_value(env_id, &obj, PropertyKey::str("x"), Value::Number(2.0)).unwrap();
        let got = get_property_value(env_id, &obj, &PropertyKey::str("x")).unwrap();
        assert!(got.strict_equals(&Value::Number(1.0)));
        crate::context::unregister_env(env_id);
    }

    #[test]
    fn test_array_length_is_synthesized() {
        let (env_id, _pool, _dispatcher) = test_env();
        let arr = Value::Object(ObjectData::new_array(3));
        let len = get_property_value(env_id, &arr, &PropertyKey::str("length")).unwrap();
        assert!(len.strict_equals(&Value::Number(3.0)));
        crate::context::unregister_env(env_id);
    }
}
