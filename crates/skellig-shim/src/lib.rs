//! Symbol shim: the only code an add-on links against.
//!
//! Every `napi_*` / `node_api_*` symbol is exported `#[no_mangle]` and
//! forwards through one process-global table pointer installed by
//! [`skellig_set_functions`]. With no table installed every producer
//! returns `napi_generic_failure`; query symbols degrade to a benign
//! default so probing callers keep working. The table layout lives in
//! `skellig-abi` and never crosses the add-on boundary.

#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]
#![warn(unsafe_op_in_unsafe_fn)]

use skellig_abi::*;
use std::sync::atomic::{AtomicPtr, Ordering};

static FUNCTIONS: AtomicPtr<NapiFunctions> = AtomicPtr::new(std::ptr::null_mut());

/// Installs the runtime's function table. The pointer must stay valid for
/// the rest of the process; the runtime leaks its table once at startup.
#[no_mangle]
pub extern "C" fn skellig_set_functions(functions: *const NapiFunctions) {
  FUNCTIONS.store(functions.cast_mut(), Ordering::SeqCst);
}

fn table() -> Option<&'static NapiFunctions> {
  // SAFETY: the installer guarantees the pointer is 'static once set.
  unsafe { FUNCTIONS.load(Ordering::SeqCst).as_ref() }
}

macro_rules! forward {
  // Producer: no table or no slot means generic failure.
  (fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> napi_status) => {
    #[no_mangle]
    pub unsafe extern "C" fn $name($($arg: $ty),*) -> napi_status {
      match table().and_then(|t| t.$name) {
        Some(slot) => unsafe { slot($($arg),*) },
        None => napi_generic_failure,
      }
    }
  };
  // Semantics-free symbol: absent slot still reports success.
  (fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> napi_status, missing ok) => {
    #[no_mangle]
    pub unsafe extern "C" fn $name($($arg: $ty),*) -> napi_status {
      match table() {
        None => napi_generic_failure,
        Some(t) => match t.$name {
          Some(slot) => unsafe { slot($($arg),*) },
          None => napi_ok,
        },
      }
    }
  };
  // Boolean query: absent slot answers false.
  (fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> napi_status, missing false -> $out:ident) => {
    #[no_mangle]
    pub unsafe extern "C" fn $name($($arg: $ty),*) -> napi_status {
      match table() {
        None => napi_generic_failure,
        Some(t) => match t.$name {
          Some(slot) => unsafe { slot($($arg),*) },
          None => {
            if !$out.is_null() {
              unsafe { *$out = false };
            }
            napi_ok
          }
        },
      }
    }
  };
  // Value query: absent slot answers the empty handle.
  (fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> napi_status, missing null -> $out:ident) => {
    #[no_mangle]
    pub unsafe extern "C" fn $name($($arg: $ty),*) -> napi_status {
      match table() {
        None => napi_generic_failure,
        Some(t) => match t.$name {
          Some(slot) => unsafe { slot($($arg),*) },
          None => {
            if !$out.is_null() {
              unsafe { *$out = std::ptr::null_mut() };
            }
            napi_ok
          }
        },
      }
    }
  };
}

// js_native_api: errors
forward!(fn napi_get_last_error_info(env: napi_env, result: *mut *const napi_extended_error_info) -> napi_status);
forward!(fn napi_is_exception_pending(env: napi_env, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_get_and_clear_last_exception(env: napi_env, result: *mut napi_value) -> napi_status, missing null -> result);
forward!(fn napi_throw(env: napi_env, error: napi_value) -> napi_status);
forward!(fn napi_throw_error(env: napi_env, code: *const c_char, msg: *const c_char) -> napi_status);
forward!(fn napi_throw_type_error(env: napi_env, code: *const c_char, msg: *const c_char) -> napi_status);
forward!(fn napi_throw_range_error(env: napi_env, code: *const c_char, msg: *const c_char) -> napi_status);
forward!(fn node_api_throw_syntax_error(env: napi_env, code: *const c_char, msg: *const c_char) -> napi_status);
forward!(fn napi_is_error(env: napi_env, value: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_create_error(env: napi_env, code: napi_value, msg: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_type_error(env: napi_env, code: napi_value, msg: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_range_error(env: napi_env, code: napi_value, msg: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn node_api_create_syntax_error(env: napi_env, code: napi_value, msg: napi_value, result: *mut napi_value) -> napi_status);

// js_native_api: singletons and primitives
forward!(fn napi_get_undefined(env: napi_env, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_null(env: napi_env, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_global(env: napi_env, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_boolean(env: napi_env, value: bool, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_object(env: napi_env, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_double(env: napi_env, value: f64, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_int32(env: napi_env, value: i32, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_uint32(env: napi_env, value: u32, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_int64(env: napi_env, value: i64, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_bigint_int64(env: napi_env, value: i64, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_bigint_uint64(env: napi_env, value: u64, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_bigint_words(env: napi_env, sign_bit: c_int, word_count: usize, words: *const u64, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_value_double(env: napi_env, value: napi_value, result: *mut f64) -> napi_status);
forward!(fn napi_get_value_int32(env: napi_env, value: napi_value, result: *mut i32) -> napi_status);
forward!(fn napi_get_value_uint32(env: napi_env, value: napi_value, result: *mut u32) -> napi_status);
forward!(fn napi_get_value_int64(env: napi_env, value: napi_value, result: *mut i64) -> napi_status);
forward!(fn napi_get_value_bool(env: napi_env, value: napi_value, result: *mut bool) -> napi_status);
forward!(fn napi_get_value_bigint_int64(env: napi_env, value: napi_value, result: *mut i64, lossless: *mut bool) -> napi_status);
forward!(fn napi_get_value_bigint_uint64(env: napi_env, value: napi_value, result: *mut u64, lossless: *mut bool) -> napi_status);
forward!(fn napi_get_value_bigint_words(env: napi_env, value: napi_value, sign_bit: *mut c_int, word_count: *mut usize, words: *mut u64) -> napi_status);
forward!(fn napi_typeof(env: napi_env, value: napi_value, result: *mut napi_valuetype) -> napi_status);

// js_native_api: strings and symbols
forward!(fn napi_create_string_latin1(env: napi_env, string: *const c_char, length: usize, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_string_utf8(env: napi_env, string: *const c_char, length: usize, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_string_utf16(env: napi_env, string: *const u16, length: usize, result: *mut napi_value) -> napi_status);
forward!(fn node_api_create_external_string_latin1(env: napi_env, string: *mut c_char, length: usize, finalize_callback: Option<napi_finalize>, finalize_hint: *mut c_void, result: *mut napi_value, copied: *mut bool) -> napi_status);
forward!(fn node_api_create_external_string_utf16(env: napi_env, string: *mut u16, length: usize, finalize_callback: Option<napi_finalize>, finalize_hint: *mut c_void, result: *mut napi_value, copied: *mut bool) -> napi_status);
forward!(fn node_api_create_property_key_utf16(env: napi_env, string: *const u16, length: usize, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_value_string_latin1(env: napi_env, value: napi_value, buf: *mut c_char, bufsize: usize, result: *mut usize) -> napi_status);
forward!(fn napi_get_value_string_utf8(env: napi_env, value: napi_value, buf: *mut c_char, bufsize: usize, result: *mut usize) -> napi_status);
forward!(fn napi_get_value_string_utf16(env: napi_env, value: napi_value, buf: *mut u16, bufsize: usize, result: *mut usize) -> napi_status);
forward!(fn napi_create_symbol(env: napi_env, description: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn node_api_symbol_for(env: napi_env, utf8description: *const c_char, length: usize, result: *mut napi_value) -> napi_status);

// js_native_api: coercion
forward!(fn napi_coerce_to_bool(env: napi_env, value: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_coerce_to_number(env: napi_env, value: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_coerce_to_object(env: napi_env, value: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_coerce_to_string(env: napi_env, value: napi_value, result: *mut napi_value) -> napi_status);

// js_native_api: objects and properties
forward!(fn napi_get_prototype(env: napi_env, object: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_property_names(env: napi_env, object: napi_value, result: *mut napi_value) -> napi_status, missing null -> result);
forward!(fn napi_get_all_property_names(env: napi_env, object: napi_value, key_mode: napi_key_collection_mode, key_filter: napi_key_filter, key_conversion: napi_key_conversion, result: *mut napi_value) -> napi_status, missing null -> result);
forward!(fn napi_set_property(env: napi_env, object: napi_value, key: napi_value, value: napi_value) -> napi_status);
forward!(fn napi_has_property(env: napi_env, object: napi_value, key: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_get_property(env: napi_env, object: napi_value, key: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_delete_property(env: napi_env, object: napi_value, key: napi_value, result: *mut bool) -> napi_status);
forward!(fn napi_has_own_property(env: napi_env, object: napi_value, key: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_set_named_property(env: napi_env, object: napi_value, utf8name: *const c_char, value: napi_value) -> napi_status);
forward!(fn napi_has_named_property(env: napi_env, object: napi_value, utf8name: *const c_char, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_get_named_property(env: napi_env, object: napi_value, utf8name: *const c_char, result: *mut napi_value) -> napi_status);
forward!(fn napi_set_element(env: napi_env, object: napi_value, index: u32, value: napi_value) -> napi_status);
forward!(fn napi_has_element(env: napi_env, object: napi_value, index: u32, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_get_element(env: napi_env, object: napi_value, index: u32, result: *mut napi_value) -> napi_status);
forward!(fn napi_delete_element(env: napi_env, object: napi_value, index: u32, result: *mut bool) -> napi_status);
forward!(fn napi_define_properties(env: napi_env, object: napi_value, property_count: usize, properties: *const napi_property_descriptor) -> napi_status);
forward!(fn napi_object_freeze(env: napi_env, object: napi_value) -> napi_status);
forward!(fn napi_object_seal(env: napi_env, object: napi_value) -> napi_status);
forward!(fn napi_strict_equals(env: napi_env, lhs: napi_value, rhs: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_type_tag_object(env: napi_env, object: napi_value, type_tag: *const napi_type_tag) -> napi_status);
forward!(fn napi_check_object_type_tag(env: napi_env, object: napi_value, type_tag: *const napi_type_tag, result: *mut bool) -> napi_status, missing false -> result);

// js_native_api: arrays
forward!(fn napi_create_array(env: napi_env, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_array_with_length(env: napi_env, length: usize, result: *mut napi_value) -> napi_status);
forward!(fn napi_is_array(env: napi_env, value: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_get_array_length(env: napi_env, value: napi_value, result: *mut u32) -> napi_status);

// js_native_api: functions, callbacks, classes
forward!(fn napi_create_function(env: napi_env, utf8name: *const c_char, length: usize, cb: napi_callback, data: *mut c_void, result: *mut napi_value) -> napi_status);
forward!(fn napi_call_function(env: napi_env, recv: napi_value, func: napi_value, argc: usize, argv: *const napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_new_instance(env: napi_env, constructor: napi_value, argc: usize, argv: *const napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_instanceof(env: napi_env, object: napi_value, constructor: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_get_cb_info(env: napi_env, cbinfo: napi_callback_info, argc: *mut usize, argv: *mut napi_value, this_arg: *mut napi_value, data: *mut *mut c_void) -> napi_status);
forward!(fn napi_get_new_target(env: napi_env, cbinfo: napi_callback_info, result: *mut napi_value) -> napi_status, missing null -> result);
forward!(fn napi_define_class(env: napi_env, utf8name: *const c_char, length: usize, constructor: napi_callback, callback_data: *mut c_void, property_count: usize, properties: *const napi_property_descriptor, result: *mut napi_value) -> napi_status);

// js_native_api: wrap and externals
forward!(fn napi_wrap(env: napi_env, js_object: napi_value, native_object: *mut c_void, finalize_cb: Option<napi_finalize>, finalize_hint: *mut c_void, result: *mut napi_ref) -> napi_status);
forward!(fn napi_unwrap(env: napi_env, js_object: napi_value, result: *mut *mut c_void) -> napi_status);
forward!(fn napi_remove_wrap(env: napi_env, js_object: napi_value, result: *mut *mut c_void) -> napi_status);
forward!(fn napi_create_external(env: napi_env, data: *mut c_void, finalize_cb: Option<napi_finalize>, finalize_hint: *mut c_void, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_value_external(env: napi_env, value: napi_value, result: *mut *mut c_void) -> napi_status);
forward!(fn napi_add_finalizer(env: napi_env, js_object: napi_value, finalize_data: *mut c_void, finalize_cb: napi_finalize, finalize_hint: *mut c_void, result: *mut napi_ref) -> napi_status);
forward!(fn node_api_post_finalizer(env: napi_env, finalize_cb: napi_finalize, finalize_data: *mut c_void, finalize_hint: *mut c_void) -> napi_status);

// js_native_api: references and scopes
forward!(fn napi_create_reference(env: napi_env, value: napi_value, initial_refcount: u32, result: *mut napi_ref) -> napi_status);
forward!(fn napi_delete_reference(env: napi_env, reference: napi_ref) -> napi_status);
forward!(fn napi_reference_ref(env: napi_env, reference: napi_ref, result: *mut u32) -> napi_status);
forward!(fn napi_reference_unref(env: napi_env, reference: napi_ref, result: *mut u32) -> napi_status);
forward!(fn napi_get_reference_value(env: napi_env, reference: napi_ref, result: *mut napi_value) -> napi_status, missing null -> result);
forward!(fn napi_open_handle_scope(env: napi_env, result: *mut napi_handle_scope) -> napi_status);
forward!(fn napi_close_handle_scope(env: napi_env, scope: napi_handle_scope) -> napi_status);
forward!(fn napi_open_escapable_handle_scope(env: napi_env, result: *mut napi_escapable_handle_scope) -> napi_status);
forward!(fn napi_close_escapable_handle_scope(env: napi_env, scope: napi_escapable_handle_scope) -> napi_status);
forward!(fn napi_escape_handle(env: napi_env, scope: napi_escapable_handle_scope, escapee: napi_value, result: *mut napi_value) -> napi_status);

// js_native_api: arraybuffers, typed arrays, dataviews
forward!(fn napi_is_arraybuffer(env: napi_env, value: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_create_arraybuffer(env: napi_env, byte_length: usize, data: *mut *mut c_void, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_external_arraybuffer(env: napi_env, external_data: *mut c_void, byte_length: usize, finalize_cb: Option<napi_finalize>, finalize_hint: *mut c_void, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_arraybuffer_info(env: napi_env, arraybuffer: napi_value, data: *mut *mut c_void, byte_length: *mut usize) -> napi_status);
forward!(fn napi_detach_arraybuffer(env: napi_env, arraybuffer: napi_value) -> napi_status);
forward!(fn napi_is_detached_arraybuffer(env: napi_env, value: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_is_typedarray(env: napi_env, value: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_create_typedarray(env: napi_env, array_type: napi_typedarray_type, length: usize, arraybuffer: napi_value, byte_offset: usize, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_typedarray_info(env: napi_env, typedarray: napi_value, array_type: *mut napi_typedarray_type, length: *mut usize, data: *mut *mut c_void, arraybuffer: *mut napi_value, byte_offset: *mut usize) -> napi_status);
forward!(fn napi_create_dataview(env: napi_env, byte_length: usize, arraybuffer: napi_value, byte_offset: usize, result: *mut napi_value) -> napi_status);
forward!(fn napi_is_dataview(env: napi_env, value: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_get_dataview_info(env: napi_env, dataview: napi_value, byte_length: *mut usize, data: *mut *mut c_void, arraybuffer: *mut napi_value, byte_offset: *mut usize) -> napi_status);

// js_native_api: promises, dates, misc
forward!(fn napi_create_promise(env: napi_env, deferred: *mut napi_deferred, promise: *mut napi_value) -> napi_status);
forward!(fn napi_resolve_deferred(env: napi_env, deferred: napi_deferred, resolution: napi_value) -> napi_status);
forward!(fn napi_reject_deferred(env: napi_env, deferred: napi_deferred, rejection: napi_value) -> napi_status);
forward!(fn napi_is_promise(env: napi_env, value: napi_value, is_promise: *mut bool) -> napi_status, missing false -> is_promise);
forward!(fn napi_create_date(env: napi_env, time: f64, result: *mut napi_value) -> napi_status);
forward!(fn napi_is_date(env: napi_env, value: napi_value, is_date: *mut bool) -> napi_status, missing false -> is_date);
forward!(fn napi_get_date_value(env: napi_env, value: napi_value, result: *mut f64) -> napi_status);
forward!(fn napi_run_script(env: napi_env, script: napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_version(env: napi_env, result: *mut u32) -> napi_status);
forward!(fn napi_adjust_external_memory(env: napi_env, change_in_bytes: i64, adjusted_value: *mut i64) -> napi_status);
forward!(fn napi_set_instance_data(env: napi_env, data: *mut c_void, finalize_cb: Option<napi_finalize>, finalize_hint: *mut c_void) -> napi_status);
forward!(fn napi_get_instance_data(env: napi_env, data: *mut *mut c_void) -> napi_status);

// node_api: module and env lifecycle
forward!(fn napi_add_env_cleanup_hook(env: napi_env, fun: Option<napi_cleanup_hook>, arg: *mut c_void) -> napi_status, missing ok);
forward!(fn napi_remove_env_cleanup_hook(env: napi_env, fun: Option<napi_cleanup_hook>, arg: *mut c_void) -> napi_status, missing ok);
forward!(fn napi_add_async_cleanup_hook(env: napi_env, hook: Option<napi_async_cleanup_hook>, arg: *mut c_void, remove_handle: *mut napi_async_cleanup_hook_handle) -> napi_status, missing ok);
forward!(fn napi_remove_async_cleanup_hook(remove_handle: napi_async_cleanup_hook_handle) -> napi_status, missing ok);
forward!(fn napi_fatal_exception(env: napi_env, err: napi_value) -> napi_status, missing ok);
forward!(fn napi_open_callback_scope(env: napi_env, resource_object: napi_value, context: napi_async_context, result: *mut napi_callback_scope) -> napi_status, missing ok);
forward!(fn napi_close_callback_scope(env: napi_env, scope: napi_callback_scope) -> napi_status, missing ok);
forward!(fn napi_async_init(env: napi_env, async_resource: napi_value, async_resource_name: napi_value, result: *mut napi_async_context) -> napi_status, missing ok);
forward!(fn napi_async_destroy(env: napi_env, async_context: napi_async_context) -> napi_status, missing ok);
forward!(fn napi_make_callback(env: napi_env, async_context: napi_async_context, recv: napi_value, func: napi_value, argc: usize, argv: *const napi_value, result: *mut napi_value) -> napi_status);
forward!(fn napi_get_node_version(env: napi_env, version: *mut *const napi_node_version) -> napi_status);
forward!(fn napi_get_uv_event_loop(env: napi_env, uv_loop: *mut *mut c_void) -> napi_status, missing ok);
forward!(fn node_api_get_module_file_name(env: napi_env, result: *mut *const c_char) -> napi_status);

// node_api: buffers
forward!(fn napi_create_buffer(env: napi_env, length: usize, data: *mut *mut c_void, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_external_buffer(env: napi_env, length: usize, data: *mut c_void, finalize_cb: Option<napi_finalize>, finalize_hint: *mut c_void, result: *mut napi_value) -> napi_status);
forward!(fn napi_create_buffer_copy(env: napi_env, length: usize, data: *const c_void, result_data: *mut *mut c_void, result: *mut napi_value) -> napi_status);
forward!(fn napi_is_buffer(env: napi_env, value: napi_value, result: *mut bool) -> napi_status, missing false -> result);
forward!(fn napi_get_buffer_info(env: napi_env, value: napi_value, data: *mut *mut c_void, length: *mut usize) -> napi_status);

// node_api: async work
forward!(fn napi_create_async_work(env: napi_env, async_resource: napi_value, async_resource_name: napi_value, execute: napi_async_execute_callback, complete: Option<napi_async_complete_callback>, data: *mut c_void, result: *mut napi_async_work) -> napi_status);
forward!(fn napi_delete_async_work(env: napi_env, work: napi_async_work) -> napi_status);
forward!(fn napi_queue_async_work(env: napi_env, work: napi_async_work) -> napi_status);
forward!(fn napi_cancel_async_work(env: napi_env, work: napi_async_work) -> napi_status);

// node_api: thread-safe functions
forward!(fn napi_create_threadsafe_function(env: napi_env, func: napi_value, async_resource: napi_value, async_resource_name: napi_value, max_queue_size: usize, initial_thread_count: usize, thread_finalize_data: *mut c_void, thread_finalize_cb: Option<napi_finalize>, context: *mut c_void, call_js_cb: Option<napi_threadsafe_function_call_js>, result: *mut napi_threadsafe_function) -> napi_status);
forward!(fn napi_get_threadsafe_function_context(func: napi_threadsafe_function, result: *mut *mut c_void) -> napi_status);
forward!(fn napi_call_threadsafe_function(func: napi_threadsafe_function, data: *mut c_void, is_blocking: napi_threadsafe_function_call_mode) -> napi_status);
forward!(fn napi_acquire_threadsafe_function(func: napi_threadsafe_function) -> napi_status);
forward!(fn napi_release_threadsafe_function(func: napi_threadsafe_function, mode: napi_threadsafe_function_release_mode) -> napi_status);
forward!(fn napi_ref_threadsafe_function(env: napi_env, func: napi_threadsafe_function) -> napi_status);
forward!(fn napi_unref_threadsafe_function(env: napi_env, func: napi_threadsafe_function) -> napi_status);

/// `napi_module_register` returns void; a missing table is a silent no-op.
#[no_mangle]
pub unsafe extern "C" fn napi_module_register(module: *mut napi_module) {
  if let Some(slot) = table().and_then(|t| t.napi_module_register) {
    unsafe { slot(module) };
  }
}

/// `napi_fatal_error` returns void; with no table there is nowhere to
/// log, so it degrades to a no-op rather than aborting.
#[no_mangle]
pub unsafe extern "C" fn napi_fatal_error(
  location: *const c_char,
  location_len: usize,
  message: *const c_char,
  message_len: usize,
) {
  if let Some(slot) = table().and_then(|t| t.napi_fatal_error) {
    unsafe { slot(location, location_len, message, message_len) };
  }
}
