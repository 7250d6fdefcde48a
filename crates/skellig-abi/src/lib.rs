//! Node-API ABI vocabulary.
//!
//! Everything a native add-on sees across the C boundary lives here: the
//! `napi_status` / `napi_valuetype` / `napi_typedarray_type` enumerations
//! (value-for-value per the Node-API headers), the descriptor and info
//! structs, the callback typedefs, and the function-pointer table through
//! which the shim reaches the runtime.
//!
//! Handle-bearing types (`napi_value`, `napi_ref`, scopes) are opaque
//! pointer-sized identifiers; their encoding is owned by the runtime and is
//! not part of the external contract.

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

pub use std::os::raw::c_char;
pub use std::os::raw::c_int;
pub use std::os::raw::c_void;

pub type napi_status = i32;
pub type napi_env = *mut c_void;
pub type napi_value = *mut c_void;
pub type napi_callback_info = *mut c_void;
pub type napi_deferred = *mut c_void;
pub type napi_ref = *mut c_void;
pub type napi_threadsafe_function = *mut c_void;
pub type napi_handle_scope = *mut c_void;
pub type napi_escapable_handle_scope = *mut c_void;
pub type napi_callback_scope = *mut c_void;
pub type napi_async_context = *mut c_void;
pub type napi_async_cleanup_hook_handle = *mut c_void;
pub type napi_async_work = *mut c_void;

/// Passed as the length of a NUL-terminated string argument.
pub const NAPI_AUTO_LENGTH: usize = usize::MAX;

/// The NAPI version this runtime reports through `napi_get_version`.
pub const NAPI_VERSION: u32 = 8;

pub const napi_ok: napi_status = 0;
pub const napi_invalid_arg: napi_status = 1;
pub const napi_object_expected: napi_status = 2;
pub const napi_string_expected: napi_status = 3;
pub const napi_name_expected: napi_status = 4;
pub const napi_function_expected: napi_status = 5;
pub const napi_number_expected: napi_status = 6;
pub const napi_boolean_expected: napi_status = 7;
pub const napi_array_expected: napi_status = 8;
pub const napi_generic_failure: napi_status = 9;
pub const napi_pending_exception: napi_status = 10;
pub const napi_cancelled: napi_status = 11;
pub const napi_escape_called_twice: napi_status = 12;
pub const napi_handle_scope_mismatch: napi_status = 13;
pub const napi_callback_scope_mismatch: napi_status = 14;
pub const napi_queue_full: napi_status = 15;
pub const napi_closing: napi_status = 16;
pub const napi_bigint_expected: napi_status = 17;
pub const napi_date_expected: napi_status = 18;
pub const napi_arraybuffer_expected: napi_status = 19;
pub const napi_detachable_arraybuffer_expected: napi_status = 20;
pub const napi_would_deadlock: napi_status = 21;
pub const napi_no_external_buffers_allowed: napi_status = 22;
pub const napi_cannot_run_js: napi_status = 23;

/// Runtime-internal error carrying exactly one status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
  InvalidArg,
  ObjectExpected,
  StringExpected,
  NameExpected,
  FunctionExpected,
  NumberExpected,
  BooleanExpected,
  ArrayExpected,
  GenericFailure,
  PendingException,
  Cancelled,
  EscapeCalledTwice,
  HandleScopeMismatch,
  CallbackScopeMismatch,
  QueueFull,
  Closing,
  BigIntExpected,
  DateExpected,
  ArrayBufferExpected,
  DetachableArraybufferExpected,
  WouldDeadlock,
  NoExternalBuffersAllowed,
  CannotRunJs,
}

pub type Result = std::result::Result<(), Error>;

impl From<Error> for napi_status {
  fn from(error: Error) -> Self {
    match error {
      Error::InvalidArg => napi_invalid_arg,
      Error::ObjectExpected => napi_object_expected,
      Error::StringExpected => napi_string_expected,
      Error::NameExpected => napi_name_expected,
      Error::FunctionExpected => napi_function_expected,
      Error::NumberExpected => napi_number_expected,
      Error::BooleanExpected => napi_boolean_expected,
      Error::ArrayExpected => napi_array_expected,
      Error::GenericFailure => napi_generic_failure,
      Error::PendingException => napi_pending_exception,
      Error::Cancelled => napi_cancelled,
      Error::EscapeCalledTwice => napi_escape_called_twice,
      Error::HandleScopeMismatch => napi_handle_scope_mismatch,
      Error::CallbackScopeMismatch => napi_callback_scope_mismatch,
      Error::QueueFull => napi_queue_full,
      Error::Closing => napi_closing,
      Error::BigIntExpected => napi_bigint_expected,
      Error::DateExpected => napi_date_expected,
      Error::ArrayBufferExpected => napi_arraybuffer_expected,
      Error::DetachableArraybufferExpected => napi_detachable_arraybuffer_expected,
      Error::WouldDeadlock => napi_would_deadlock,
      Error::NoExternalBuffersAllowed => napi_no_external_buffers_allowed,
      Error::CannotRunJs => napi_cannot_run_js,
    }
  }
}

pub type napi_valuetype = i32;

pub const napi_undefined: napi_valuetype = 0;
pub const napi_null: napi_valuetype = 1;
pub const napi_boolean: napi_valuetype = 2;
pub const napi_number: napi_valuetype = 3;
pub const napi_string: napi_valuetype = 4;
pub const napi_symbol: napi_valuetype = 5;
pub const napi_object: napi_valuetype = 6;
pub const napi_function: napi_valuetype = 7;
pub const napi_external: napi_valuetype = 8;
pub const napi_bigint: napi_valuetype = 9;

pub type napi_typedarray_type = i32;

pub const napi_int8_array: napi_typedarray_type = 0;
pub const napi_uint8_array: napi_typedarray_type = 1;
pub const napi_uint8_clamped_array: napi_typedarray_type = 2;
pub const napi_int16_array: napi_typedarray_type = 3;
pub const napi_uint16_array: napi_typedarray_type = 4;
pub const napi_int32_array: napi_typedarray_type = 5;
pub const napi_uint32_array: napi_typedarray_type = 6;
pub const napi_float32_array: napi_typedarray_type = 7;
pub const napi_float64_array: napi_typedarray_type = 8;
pub const napi_bigint64_array: napi_typedarray_type = 9;
pub const napi_biguint64_array: napi_typedarray_type = 10;

pub type napi_threadsafe_function_release_mode = i32;

pub const napi_tsfn_release: napi_threadsafe_function_release_mode = 0;
pub const napi_tsfn_abort: napi_threadsafe_function_release_mode = 1;

pub type napi_threadsafe_function_call_mode = i32;

pub const napi_tsfn_nonblocking: napi_threadsafe_function_call_mode = 0;
pub const napi_tsfn_blocking: napi_threadsafe_function_call_mode = 1;

pub type napi_key_collection_mode = i32;

pub const napi_key_include_prototypes: napi_key_collection_mode = 0;
pub const napi_key_own_only: napi_key_collection_mode = 1;

pub type napi_key_filter = i32;

pub const napi_key_all_properties: napi_key_filter = 0;
pub const napi_key_writable: napi_key_filter = 1;
pub const napi_key_enumerable: napi_key_filter = 1 << 1;
pub const napi_key_configurable: napi_key_filter = 1 << 2;
pub const napi_key_skip_strings: napi_key_filter = 1 << 3;
pub const napi_key_skip_symbols: napi_key_filter = 1 << 4;

pub type napi_key_conversion = i32;

pub const napi_key_keep_numbers: napi_key_conversion = 0;
pub const napi_key_numbers_to_strings: napi_key_conversion = 1;

pub type napi_property_attributes = i32;

pub const napi_default: napi_property_attributes = 0;
pub const napi_writable: napi_property_attributes = 1 << 0;
pub const napi_enumerable: napi_property_attributes = 1 << 1;
pub const napi_configurable: napi_property_attributes = 1 << 2;
pub const napi_static: napi_property_attributes = 1 << 10;
pub const napi_default_method: napi_property_attributes = napi_writable | napi_configurable;
pub const napi_default_jsproperty: napi_property_attributes =
  napi_writable | napi_enumerable | napi_configurable;

pub type napi_callback =
  unsafe extern "C" fn(env: napi_env, info: napi_callback_info) -> napi_value;

pub type napi_finalize =
  unsafe extern "C" fn(env: napi_env, data: *mut c_void, finalize_hint: *mut c_void);

pub type napi_cleanup_hook = unsafe extern "C" fn(data: *mut c_void);

pub type napi_async_cleanup_hook =
  unsafe extern "C" fn(handle: napi_async_cleanup_hook_handle, data: *mut c_void);

pub type napi_async_execute_callback = unsafe extern "C" fn(env: napi_env, data: *mut c_void);

pub type napi_async_complete_callback =
  unsafe extern "C" fn(env: napi_env, status: napi_status, data: *mut c_void);

pub type napi_threadsafe_function_call_js = unsafe extern "C" fn(
  env: napi_env,
  js_callback: napi_value,
  context: *mut c_void,
  data: *mut c_void,
);

pub type napi_addon_register_func =
  unsafe extern "C" fn(env: napi_env, exports: napi_value) -> napi_value;

#[repr(C)]
#[derive(Debug, Clone)]
pub struct napi_module {
  pub nm_version: i32,
  pub nm_flags: u32,
  pub nm_filename: *const c_char,
  pub nm_register_func: napi_addon_register_func,
  pub nm_modname: *const c_char,
  pub nm_priv: *mut c_void,
  pub reserved: [*mut c_void; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct napi_property_descriptor {
  pub utf8name: *const c_char,
  pub name: napi_value,
  pub method: Option<napi_callback>,
  pub getter: Option<napi_callback>,
  pub setter: Option<napi_callback>,
  pub value: napi_value,
  pub attributes: napi_property_attributes,
  pub data: *mut c_void,
}

#[repr(C)]
#[derive(Debug)]
pub struct napi_extended_error_info {
  pub error_message: *const c_char,
  pub engine_reserved: *mut c_void,
  pub engine_error_code: i32,
  pub status_code: napi_status,
}

#[repr(C)]
#[derive(Debug)]
pub struct napi_node_version {
  pub major: u32,
  pub minor: u32,
  pub patch: u32,
  pub release: *const c_char,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct napi_type_tag {
  pub lower: u64,
  pub upper: u64,
}

/// The function-pointer table the runtime installs into the shim.
///
/// One field per exported symbol. The layout is private to this workspace:
/// add-ons link against the shim's exported symbols, never against this
/// record. A `None` slot makes the shim fall back to its per-kind default.
#[derive(Default)]
pub struct NapiFunctions {
  // js_native_api: environment and error queries
  pub napi_get_last_error_info: Option<
    unsafe extern "C" fn(napi_env, *mut *const napi_extended_error_info) -> napi_status,
  >,
  pub napi_is_exception_pending: Option<unsafe extern "C" fn(napi_env, *mut bool) -> napi_status>,
  pub napi_get_and_clear_last_exception:
    Option<unsafe extern "C" fn(napi_env, *mut napi_value) -> napi_status>,
  pub napi_throw: Option<unsafe extern "C" fn(napi_env, napi_value) -> napi_status>,
  pub napi_throw_error:
    Option<unsafe extern "C" fn(napi_env, *const c_char, *const c_char) -> napi_status>,
  pub napi_throw_type_error:
    Option<unsafe extern "C" fn(napi_env, *const c_char, *const c_char) -> napi_status>,
  pub napi_throw_range_error:
    Option<unsafe extern "C" fn(napi_env, *const c_char, *const c_char) -> napi_status>,
  pub node_api_throw_syntax_error:
    Option<unsafe extern "C" fn(napi_env, *const c_char, *const c_char) -> napi_status>,
  pub napi_is_error: Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_create_error:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut napi_value) -> napi_status>,
  pub napi_create_type_error:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut napi_value) -> napi_status>,
  pub napi_create_range_error:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut napi_value) -> napi_status>,
  pub node_api_create_syntax_error:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut napi_value) -> napi_status>,

  // js_native_api: singletons and primitives
  pub napi_get_undefined: Option<unsafe extern "C" fn(napi_env, *mut napi_value) -> napi_status>,
  pub napi_get_null: Option<unsafe extern "C" fn(napi_env, *mut napi_value) -> napi_status>,
  pub napi_get_global: Option<unsafe extern "C" fn(napi_env, *mut napi_value) -> napi_status>,
  pub napi_get_boolean:
    Option<unsafe extern "C" fn(napi_env, bool, *mut napi_value) -> napi_status>,
  pub napi_create_double:
    Option<unsafe extern "C" fn(napi_env, f64, *mut napi_value) -> napi_status>,
  pub napi_create_int32:
    Option<unsafe extern "C" fn(napi_env, i32, *mut napi_value) -> napi_status>,
  pub napi_create_uint32:
    Option<unsafe extern "C" fn(napi_env, u32, *mut napi_value) -> napi_status>,
  pub napi_create_int64:
    Option<unsafe extern "C" fn(napi_env, i64, *mut napi_value) -> napi_status>,
  pub napi_create_bigint_int64:
    Option<unsafe extern "C" fn(napi_env, i64, *mut napi_value) -> napi_status>,
  pub napi_create_bigint_uint64:
    Option<unsafe extern "C" fn(napi_env, u64, *mut napi_value) -> napi_status>,
  pub napi_create_bigint_words: Option<
    unsafe extern "C" fn(napi_env, c_int, usize, *const u64, *mut napi_value) -> napi_status,
  >,
  pub napi_get_value_double: Option<unsafe extern "C" fn(napi_env, napi_value, *mut f64) -> napi_status>,
  pub napi_get_value_int32: Option<unsafe extern "C" fn(napi_env, napi_value, *mut i32) -> napi_status>,
  pub napi_get_value_uint32: Option<unsafe extern "C" fn(napi_env, napi_value, *mut u32) -> napi_status>,
  pub napi_get_value_int64: Option<unsafe extern "C" fn(napi_env, napi_value, *mut i64) -> napi_status>,
  pub napi_get_value_bool: Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_get_value_bigint_int64:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut i64, *mut bool) -> napi_status>,
  pub napi_get_value_bigint_uint64:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut u64, *mut bool) -> napi_status>,
  pub napi_get_value_bigint_words: Option<
    unsafe extern "C" fn(napi_env, napi_value, *mut c_int, *mut usize, *mut u64) -> napi_status,
  >,
  pub napi_typeof:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_valuetype) -> napi_status>,

  // js_native_api: strings and symbols
  pub napi_create_string_latin1:
    Option<unsafe extern "C" fn(napi_env, *const c_char, usize, *mut napi_value) -> napi_status>,
  pub napi_create_string_utf8:
    Option<unsafe extern "C" fn(napi_env, *const c_char, usize, *mut napi_value) -> napi_status>,
  pub napi_create_string_utf16:
    Option<unsafe extern "C" fn(napi_env, *const u16, usize, *mut napi_value) -> napi_status>,
  pub node_api_create_external_string_latin1: Option<
    unsafe extern "C" fn(
      napi_env,
      *mut c_char,
      usize,
      Option<napi_finalize>,
      *mut c_void,
      *mut napi_value,
      *mut bool,
    ) -> napi_status,
  >,
  pub node_api_create_external_string_utf16: Option<
    unsafe extern "C" fn(
      napi_env,
      *mut u16,
      usize,
      Option<napi_finalize>,
      *mut c_void,
      *mut napi_value,
      *mut bool,
    ) -> napi_status,
  >,
  pub node_api_create_property_key_utf16:
    Option<unsafe extern "C" fn(napi_env, *const u16, usize, *mut napi_value) -> napi_status>,
  pub napi_get_value_string_latin1: Option<
    unsafe extern "C" fn(napi_env, napi_value, *mut c_char, usize, *mut usize) -> napi_status,
  >,
  pub napi_get_value_string_utf8: Option<
    unsafe extern "C" fn(napi_env, napi_value, *mut c_char, usize, *mut usize) -> napi_status,
  >,
  pub napi_get_value_string_utf16:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut u16, usize, *mut usize) -> napi_status>,
  pub napi_create_symbol:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_value) -> napi_status>,
  pub node_api_symbol_for:
    Option<unsafe extern "C" fn(napi_env, *const c_char, usize, *mut napi_value) -> napi_status>,

  // js_native_api: coercion
  pub napi_coerce_to_bool:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_value) -> napi_status>,
  pub napi_coerce_to_number:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_value) -> napi_status>,
  pub napi_coerce_to_object:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_value) -> napi_status>,
  pub napi_coerce_to_string:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_value) -> napi_status>,

  // js_native_api: objects and properties
  pub napi_create_object: Option<unsafe extern "C" fn(napi_env, *mut napi_value) -> napi_status>,
  pub napi_get_prototype:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_value) -> napi_status>,
  pub napi_get_property_names:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_value) -> napi_status>,
  pub napi_get_all_property_names: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_value,
      napi_key_collection_mode,
      napi_key_filter,
      napi_key_conversion,
      *mut napi_value,
    ) -> napi_status,
  >,
  pub napi_set_property:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, napi_value) -> napi_status>,
  pub napi_has_property:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut bool) -> napi_status>,
  pub napi_get_property:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut napi_value) -> napi_status>,
  pub napi_delete_property:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut bool) -> napi_status>,
  pub napi_has_own_property:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut bool) -> napi_status>,
  pub napi_set_named_property:
    Option<unsafe extern "C" fn(napi_env, napi_value, *const c_char, napi_value) -> napi_status>,
  pub napi_has_named_property:
    Option<unsafe extern "C" fn(napi_env, napi_value, *const c_char, *mut bool) -> napi_status>,
  pub napi_get_named_property: Option<
    unsafe extern "C" fn(napi_env, napi_value, *const c_char, *mut napi_value) -> napi_status,
  >,
  pub napi_set_element:
    Option<unsafe extern "C" fn(napi_env, napi_value, u32, napi_value) -> napi_status>,
  pub napi_has_element:
    Option<unsafe extern "C" fn(napi_env, napi_value, u32, *mut bool) -> napi_status>,
  pub napi_get_element:
    Option<unsafe extern "C" fn(napi_env, napi_value, u32, *mut napi_value) -> napi_status>,
  pub napi_delete_element:
    Option<unsafe extern "C" fn(napi_env, napi_value, u32, *mut bool) -> napi_status>,
  pub napi_define_properties: Option<
    unsafe extern "C" fn(napi_env, napi_value, usize, *const napi_property_descriptor)
      -> napi_status,
  >,
  pub napi_object_freeze: Option<unsafe extern "C" fn(napi_env, napi_value) -> napi_status>,
  pub napi_object_seal: Option<unsafe extern "C" fn(napi_env, napi_value) -> napi_status>,
  pub napi_strict_equals:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut bool) -> napi_status>,
  pub napi_type_tag_object:
    Option<unsafe extern "C" fn(napi_env, napi_value, *const napi_type_tag) -> napi_status>,
  pub napi_check_object_type_tag: Option<
    unsafe extern "C" fn(napi_env, napi_value, *const napi_type_tag, *mut bool) -> napi_status,
  >,

  // js_native_api: arrays
  pub napi_create_array: Option<unsafe extern "C" fn(napi_env, *mut napi_value) -> napi_status>,
  pub napi_create_array_with_length:
    Option<unsafe extern "C" fn(napi_env, usize, *mut napi_value) -> napi_status>,
  pub napi_is_array: Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_get_array_length:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut u32) -> napi_status>,

  // js_native_api: functions, callbacks, classes
  pub napi_create_function: Option<
    unsafe extern "C" fn(
      napi_env,
      *const c_char,
      usize,
      napi_callback,
      *mut c_void,
      *mut napi_value,
    ) -> napi_status,
  >,
  pub napi_call_function: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_value,
      napi_value,
      usize,
      *const napi_value,
      *mut napi_value,
    ) -> napi_status,
  >,
  pub napi_new_instance: Option<
    unsafe extern "C" fn(napi_env, napi_value, usize, *const napi_value, *mut napi_value)
      -> napi_status,
  >,
  pub napi_instanceof:
    Option<unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut bool) -> napi_status>,
  pub napi_get_cb_info: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_callback_info,
      *mut usize,
      *mut napi_value,
      *mut napi_value,
      *mut *mut c_void,
    ) -> napi_status,
  >,
  pub napi_get_new_target:
    Option<unsafe extern "C" fn(napi_env, napi_callback_info, *mut napi_value) -> napi_status>,
  pub napi_define_class: Option<
    unsafe extern "C" fn(
      napi_env,
      *const c_char,
      usize,
      napi_callback,
      *mut c_void,
      usize,
      *const napi_property_descriptor,
      *mut napi_value,
    ) -> napi_status,
  >,

  // js_native_api: wrap and externals
  pub napi_wrap: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_value,
      *mut c_void,
      Option<napi_finalize>,
      *mut c_void,
      *mut napi_ref,
    ) -> napi_status,
  >,
  pub napi_unwrap:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut *mut c_void) -> napi_status>,
  pub napi_remove_wrap:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut *mut c_void) -> napi_status>,
  pub napi_create_external: Option<
    unsafe extern "C" fn(
      napi_env,
      *mut c_void,
      Option<napi_finalize>,
      *mut c_void,
      *mut napi_value,
    ) -> napi_status,
  >,
  pub napi_get_value_external:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut *mut c_void) -> napi_status>,
  pub napi_add_finalizer: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_value,
      *mut c_void,
      napi_finalize,
      *mut c_void,
      *mut napi_ref,
    ) -> napi_status,
  >,
  pub node_api_post_finalizer:
    Option<unsafe extern "C" fn(napi_env, napi_finalize, *mut c_void, *mut c_void) -> napi_status>,

  // js_native_api: references and scopes
  pub napi_create_reference:
    Option<unsafe extern "C" fn(napi_env, napi_value, u32, *mut napi_ref) -> napi_status>,
  pub napi_delete_reference: Option<unsafe extern "C" fn(napi_env, napi_ref) -> napi_status>,
  pub napi_reference_ref:
    Option<unsafe extern "C" fn(napi_env, napi_ref, *mut u32) -> napi_status>,
  pub napi_reference_unref:
    Option<unsafe extern "C" fn(napi_env, napi_ref, *mut u32) -> napi_status>,
  pub napi_get_reference_value:
    Option<unsafe extern "C" fn(napi_env, napi_ref, *mut napi_value) -> napi_status>,
  pub napi_open_handle_scope:
    Option<unsafe extern "C" fn(napi_env, *mut napi_handle_scope) -> napi_status>,
  pub napi_close_handle_scope:
    Option<unsafe extern "C" fn(napi_env, napi_handle_scope) -> napi_status>,
  pub napi_open_escapable_handle_scope:
    Option<unsafe extern "C" fn(napi_env, *mut napi_escapable_handle_scope) -> napi_status>,
  pub napi_close_escapable_handle_scope:
    Option<unsafe extern "C" fn(napi_env, napi_escapable_handle_scope) -> napi_status>,
  pub napi_escape_handle: Option<
    unsafe extern "C" fn(napi_env, napi_escapable_handle_scope, napi_value, *mut napi_value)
      -> napi_status,
  >,

  // js_native_api: arraybuffers, typed arrays, dataviews
  pub napi_is_arraybuffer:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_create_arraybuffer:
    Option<unsafe extern "C" fn(napi_env, usize, *mut *mut c_void, *mut napi_value) -> napi_status>,
  pub napi_create_external_arraybuffer: Option<
    unsafe extern "C" fn(
      napi_env,
      *mut c_void,
      usize,
      Option<napi_finalize>,
      *mut c_void,
      *mut napi_value,
    ) -> napi_status,
  >,
  pub napi_get_arraybuffer_info:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut *mut c_void, *mut usize) -> napi_status>,
  pub napi_detach_arraybuffer: Option<unsafe extern "C" fn(napi_env, napi_value) -> napi_status>,
  pub napi_is_detached_arraybuffer:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_is_typedarray:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_create_typedarray: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_typedarray_type,
      usize,
      napi_value,
      usize,
      *mut napi_value,
    ) -> napi_status,
  >,
  pub napi_get_typedarray_info: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_value,
      *mut napi_typedarray_type,
      *mut usize,
      *mut *mut c_void,
      *mut napi_value,
      *mut usize,
    ) -> napi_status,
  >,
  pub napi_create_dataview: Option<
    unsafe extern "C" fn(napi_env, usize, napi_value, usize, *mut napi_value) -> napi_status,
  >,
  pub napi_is_dataview:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_get_dataview_info: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_value,
      *mut usize,
      *mut *mut c_void,
      *mut napi_value,
      *mut usize,
    ) -> napi_status,
  >,

  // js_native_api: promises, dates, misc
  pub napi_create_promise:
    Option<unsafe extern "C" fn(napi_env, *mut napi_deferred, *mut napi_value) -> napi_status>,
  pub napi_resolve_deferred:
    Option<unsafe extern "C" fn(napi_env, napi_deferred, napi_value) -> napi_status>,
  pub napi_reject_deferred:
    Option<unsafe extern "C" fn(napi_env, napi_deferred, napi_value) -> napi_status>,
  pub napi_is_promise:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_create_date: Option<unsafe extern "C" fn(napi_env, f64, *mut napi_value) -> napi_status>,
  pub napi_is_date: Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_get_date_value:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut f64) -> napi_status>,
  pub napi_run_script:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut napi_value) -> napi_status>,
  pub napi_get_version: Option<unsafe extern "C" fn(napi_env, *mut u32) -> napi_status>,
  pub napi_adjust_external_memory:
    Option<unsafe extern "C" fn(napi_env, i64, *mut i64) -> napi_status>,
  pub napi_set_instance_data: Option<
    unsafe extern "C" fn(napi_env, *mut c_void, Option<napi_finalize>, *mut c_void) -> napi_status,
  >,
  pub napi_get_instance_data:
    Option<unsafe extern "C" fn(napi_env, *mut *mut c_void) -> napi_status>,

  // node_api: module and env lifecycle
  pub napi_module_register: Option<unsafe extern "C" fn(*mut napi_module)>,
  pub napi_add_env_cleanup_hook:
    Option<unsafe extern "C" fn(napi_env, Option<napi_cleanup_hook>, *mut c_void) -> napi_status>,
  pub napi_remove_env_cleanup_hook:
    Option<unsafe extern "C" fn(napi_env, Option<napi_cleanup_hook>, *mut c_void) -> napi_status>,
  pub napi_add_async_cleanup_hook: Option<
    unsafe extern "C" fn(
      napi_env,
      Option<napi_async_cleanup_hook>,
      *mut c_void,
      *mut napi_async_cleanup_hook_handle,
    ) -> napi_status,
  >,
  pub napi_remove_async_cleanup_hook:
    Option<unsafe extern "C" fn(napi_async_cleanup_hook_handle) -> napi_status>,
  pub napi_fatal_exception: Option<unsafe extern "C" fn(napi_env, napi_value) -> napi_status>,
  pub napi_fatal_error:
    Option<unsafe extern "C" fn(*const c_char, usize, *const c_char, usize)>,
  pub napi_open_callback_scope: Option<
    unsafe extern "C" fn(napi_env, napi_value, napi_async_context, *mut napi_callback_scope)
      -> napi_status,
  >,
  pub napi_close_callback_scope:
    Option<unsafe extern "C" fn(napi_env, napi_callback_scope) -> napi_status>,
  pub napi_async_init: Option<
    unsafe extern "C" fn(napi_env, napi_value, napi_value, *mut napi_async_context) -> napi_status,
  >,
  pub napi_async_destroy:
    Option<unsafe extern "C" fn(napi_env, napi_async_context) -> napi_status>,
  pub napi_make_callback: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_async_context,
      napi_value,
      napi_value,
      usize,
      *const napi_value,
      *mut napi_value,
    ) -> napi_status,
  >,
  pub napi_get_node_version:
    Option<unsafe extern "C" fn(napi_env, *mut *const napi_node_version) -> napi_status>,
  pub napi_get_uv_event_loop:
    Option<unsafe extern "C" fn(napi_env, *mut *mut c_void) -> napi_status>,
  pub node_api_get_module_file_name:
    Option<unsafe extern "C" fn(napi_env, *mut *const c_char) -> napi_status>,

  // node_api: buffers
  pub napi_create_buffer:
    Option<unsafe extern "C" fn(napi_env, usize, *mut *mut c_void, *mut napi_value) -> napi_status>,
  pub napi_create_external_buffer: Option<
    unsafe extern "C" fn(
      napi_env,
      usize,
      *mut c_void,
      Option<napi_finalize>,
      *mut c_void,
      *mut napi_value,
    ) -> napi_status,
  >,
  pub napi_create_buffer_copy: Option<
    unsafe extern "C" fn(napi_env, usize, *const c_void, *mut *mut c_void, *mut napi_value)
      -> napi_status,
  >,
  pub napi_is_buffer: Option<unsafe extern "C" fn(napi_env, napi_value, *mut bool) -> napi_status>,
  pub napi_get_buffer_info:
    Option<unsafe extern "C" fn(napi_env, napi_value, *mut *mut c_void, *mut usize) -> napi_status>,

  // node_api: async work
  pub napi_create_async_work: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_value,
      napi_value,
      napi_async_execute_callback,
      Option<napi_async_complete_callback>,
      *mut c_void,
      *mut napi_async_work,
    ) -> napi_status,
  >,
  pub napi_delete_async_work: Option<unsafe extern "C" fn(napi_env, napi_async_work) -> napi_status>,
  pub napi_queue_async_work: Option<unsafe extern "C" fn(napi_env, napi_async_work) -> napi_status>,
  pub napi_cancel_async_work: Option<unsafe extern "C" fn(napi_env, napi_async_work) -> napi_status>,

  // node_api: thread-safe functions
  pub napi_create_threadsafe_function: Option<
    unsafe extern "C" fn(
      napi_env,
      napi_value,
      napi_value,
      napi_value,
      usize,
      usize,
      *mut c_void,
      Option<napi_finalize>,
      *mut c_void,
      Option<napi_threadsafe_function_call_js>,
      *mut napi_threadsafe_function,
    ) -> napi_status,
  >,
  pub napi_get_threadsafe_function_context:
    Option<unsafe extern "C" fn(napi_threadsafe_function, *mut *mut c_void) -> napi_status>,
  pub napi_call_threadsafe_function: Option<
    unsafe extern "C" fn(
      napi_threadsafe_function,
      *mut c_void,
      napi_threadsafe_function_call_mode,
    ) -> napi_status,
  >,
  pub napi_acquire_threadsafe_function:
    Option<unsafe extern "C" fn(napi_threadsafe_function) -> napi_status>,
  pub napi_release_threadsafe_function: Option<
    unsafe extern "C" fn(napi_threadsafe_function, napi_threadsafe_function_release_mode)
      -> napi_status,
  >,
  pub napi_ref_threadsafe_function:
    Option<unsafe extern "C" fn(napi_env, napi_threadsafe_function) -> napi_status>,
  pub napi_unref_threadsafe_function:
    Option<unsafe extern "C" fn(napi_env, napi_threadsafe_function) -> napi_status>,
}
