//! The ABI surface: slot implementations and the table that carries them.
//!
//! `function_table` populates every slot of [`NapiFunctions`]; the runtime
//! installs the filled record into the shim once at startup. Keep the
//! listing exhaustive — an add-on resolves symbols at load time, and a
//! missing slot degrades to the shim's default behavior.

pub mod js_native_api;
pub mod node_api;
pub mod util;

use skellig_abi::NapiFunctions;

pub fn function_table() -> NapiFunctions {
  NapiFunctions {
    // js_native_api.rs slots
    napi_get_last_error_info: Some(js_native_api::napi_get_last_error_info),
    napi_is_exception_pending: Some(js_native_api::napi_is_exception_pending),
    napi_get_and_clear_last_exception: Some(js_native_api::napi_get_and_clear_last_exception),
    napi_throw: Some(js_native_api::napi_throw),
    napi_throw_error: Some(js_native_api::napi_throw_error),
    napi_throw_type_error: Some(js_native_api::napi_throw_type_error),
    napi_throw_range_error: Some(js_native_api::napi_throw_range_error),
    node_api_throw_syntax_error: Some(js_native_api::node_api_throw_syntax_error),
    napi_is_error: Some(js_native_api::napi_is_error),
    napi_create_error: Some(js_native_api::napi_create_error),
    napi_create_type_error: Some(js_native_api::napi_create_type_error),
    napi_create_range_error: Some(js_native_api::napi_create_range_error),
    node_api_create_syntax_error: Some(js_native_api::node_api_create_syntax_error),
    napi_get_undefined: Some(js_native_api::napi_get_undefined),
    napi_get_null: Some(js_native_api::napi_get_null),
    napi_get_global: Some(js_native_api::napi_get_global),
    napi_get_boolean: Some(js_native_api::napi_get_boolean),
    napi_create_double: Some(js_native_api::napi_create_double),
    napi_create_int32: Some(js_native_api::napi_create_int32),
    napi_create_uint32: Some(js_native_api::napi_create_uint32),
    napi_create_int64: Some(js_native_api::napi_create_int64),
    napi_create_bigint_int64: Some(js_native_api::napi_create_bigint_int64),
    napi_create_bigint_uint64: Some(js_native_api::napi_create_bigint_uint64),
    napi_create_bigint_words: Some(js_native_api::napi_create_bigint_words),
    napi_get_value_double: Some(js_native_api::napi_get_value_double),
    napi_get_value_int32: Some(js_native_api::napi_get_value_int32),
    napi_get_value_uint32: Some(js_native_api::napi_get_value_uint32),
    napi_get_value_int64: Some(js_native_api::napi_get_value_int64),
    napi_get_value_bool: Some(js_native_api::napi_get_value_bool),
    napi_get_value_bigint_int64: Some(js_native_api::napi_get_value_bigint_int64),
    napi_get_value_bigint_uint64: Some(js_native_api::napi_get_value_bigint_uint64),
    napi_get_value_bigint_words: Some(js_native_api::napi_get_value_bigint_words),
    napi_typeof: Some(js_native_api::napi_typeof),
    napi_create_string_latin1: Some(js_native_api::napi_create_string_latin1),
    napi_create_string_utf8: Some(js_native_api::napi_create_string_utf8),
    napi_create_string_utf16: Some(js_native_api::napi_create_string_utf16),
    node_api_create_external_string_latin1: Some(
      js_native_api::node_api_create_external_string_latin1,
    ),
    node_api_create_external_string_utf16: Some(
      js_native_api::node_api_create_external_string_utf16,
    ),
    node_api_create_property_key_utf16: Some(js_native_api::node_api_create_property_key_utf16),
    napi_get_value_string_latin1: Some(js_native_api::napi_get_value_string_latin1),
    napi_get_value_string_utf8: Some(js_native_api::napi_get_value_string_utf8),
    napi_get_value_string_utf16: Some(js_native_api::napi_get_value_string_utf16),
    napi_create_symbol: Some(js_native_api::napi_create_symbol),
    node_api_symbol_for: Some(js_native_api::node_api_symbol_for),
    napi_coerce_to_bool: Some(js_native_api::napi_coerce_to_bool),
    napi_coerce_to_number: Some(js_native_api::napi_coerce_to_number),
    napi_coerce_to_object: Some(js_native_api::napi_coerce_to_object),
    napi_coerce_to_string: Some(js_native_api::napi_coerce_to_string),
    napi_create_object: Some(js_native_api::napi_create_object),
    napi_get_prototype: Some(js_native_api::napi_get_prototype),
    napi_get_property_names: Some(js_native_api::napi_get_property_names),
    napi_get_all_property_names: Some(js_native_api::napi_get_all_property_names),
    napi_set_property: Some(js_native_api::napi_set_property),
    napi_has_property: Some(js_native_api::napi_has_property),
    napi_get_property: Some(js_native_api::napi_get_property),
    napi_delete_property: Some(js_native_api::napi_delete_property),
    napi_has_own_property: Some(js_native_api::napi_has_own_property),
    napi_set_named_property: Some(js_native_api::napi_set_named_property),
    napi_has_named_property: Some(js_native_api::napi_has_named_property),
    napi_get_named_property: Some(js_native_api::napi_get_named_property),
    napi_set_element: Some(js_native_api::napi_set_element),
    napi_has_element: Some(js_native_api::napi_has_element),
    napi_get_element: Some(js_native_api::napi_get_element),
    napi_delete_element: Some(js_native_api::napi_delete_element),
    napi_define_properties: Some(js_native_api::napi_define_properties),
    napi_object_freeze: Some(js_native_api::napi_object_freeze),
    napi_object_seal: Some(js_native_api::napi_object_seal),
    napi_strict_equals: Some(js_native_api::napi_strict_equals),
    napi_type_tag_object: Some(js_native_api::napi_type_tag_object),
    napi_check_object_type_tag: Some(js_native_api::napi_check_object_type_tag),
    napi_create_array: Some(js_native_api::napi_create_array),
    napi_create_array_with_length: Some(js_native_api::napi_create_array_with_length),
    napi_is_array: Some(js_native_api::napi_is_array),
    napi_get_array_length: Some(js_native_api::napi_get_array_length),
    napi_create_function: Some(js_native_api::napi_create_function),
    napi_call_function: Some(js_native_api::napi_call_function),
    napi_new_instance: Some(js_native_api::napi_new_instance),
    napi_instanceof: Some(js_native_api::napi_instanceof),
    napi_get_cb_info: Some(js_native_api::napi_get_cb_info),
    napi_get_new_target: Some(js_native_api::napi_get_new_target),
    napi_define_class: Some(js_native_api::napi_define_class),
    napi_wrap: Some(js_native_api::napi_wrap),
    napi_unwrap: Some(js_native_api::napi_unwrap),
    napi_remove_wrap: Some(js_native_api::napi_remove_wrap),
    napi_create_external: Some(js_native_api::napi_create_external),
    napi_get_value_external: Some(js_native_api::napi_get_value_external),
    napi_add_finalizer: Some(js_native_api::napi_add_finalizer),
    node_api_post_finalizer: Some(js_native_api::node_api_post_finalizer),
    napi_create_reference: Some(js_native_api::napi_create_reference),
    napi_delete_reference: Some(js_native_api::napi_delete_reference),
    napi_reference_ref: Some(js_native_api::napi_reference_ref),
    napi_reference_unref: Some(js_native_api::napi_reference_unref),
    napi_get_reference_value: Some(js_native_api::napi_get_reference_value),
    napi_open_handle_scope: Some(js_native_api::napi_open_handle_scope),
    napi_close_handle_scope: Some(js_native_api::napi_close_handle_scope),
    napi_open_escapable_handle_scope: Some(js_native_api::napi_open_escapable_handle_scope),
    napi_close_escapable_handle_scope: Some(js_native_api::napi_close_escapable_handle_scope),
    napi_escape_handle: Some(js_native_api::napi_escape_handle),
    napi_is_arraybuffer: Some(js_native_api::napi_is_arraybuffer),
    napi_create_arraybuffer: Some(js_native_api::napi_create_arraybuffer),
    napi_create_external_arraybuffer: Some(js_native_api::napi_create_external_arraybuffer),
    napi_get_arraybuffer_info: Some(js_native_api::napi_get_arraybuffer_info),
    napi_detach_arraybuffer: Some(js_native_api::napi_detach_arraybuffer),
    napi_is_detached_arraybuffer: Some(js_native_api::napi_is_detached_arraybuffer),
    napi_is_typedarray: Some(js_native_api::napi_is_typedarray),
    napi_create_typedarray: Some(js_native_api::napi_create_typedarray),
    napi_get_typedarray_info: Some(js_native_api::napi_get_typedarray_info),
    napi_create_dataview: Some(js_native_api::napi_create_dataview),
    napi_is_dataview: Some(js_native_api::napi_is_dataview),
    napi_get_dataview_info: Some(js_native_api::napi_get_dataview_info),
    napi_create_promise: Some(js_native_api::napi_create_promise),
    napi_resolve_deferred: Some(js_native_api::napi_resolve_deferred),
    napi_reject_deferred: Some(js_native_api::napi_reject_deferred),
    napi_is_promise: Some(js_native_api::napi_is_promise),
    napi_create_date: Some(js_native_api::napi_create_date),
    napi_is_date: Some(js_native_api::napi_is_date),
    napi_get_date_value: Some(js_native_api::napi_get_date_value),
    napi_run_script: Some(js_native_api::napi_run_script),
    napi_get_version: Some(js_native_api::napi_get_version),
    napi_adjust_external_memory: Some(js_native_api::napi_adjust_external_memory),
    napi_set_instance_data: Some(js_native_api::napi_set_instance_data),
    napi_get_instance_data: Some(js_native_api::napi_get_instance_data),
    // node_api.rs slots
    napi_module_register: Some(node_api::napi_module_register),
    napi_add_env_cleanup_hook: Some(node_api::napi_add_env_cleanup_hook),
    napi_remove_env_cleanup_hook: Some(node_api::napi_remove_env_cleanup_hook),
    napi_add_async_cleanup_hook: Some(node_api::napi_add_async_cleanup_hook),
    napi_remove_async_cleanup_hook: Some(node_api::napi_remove_async_cleanup_hook),
    napi_fatal_exception: Some(node_api::napi_fatal_exception),
    napi_fatal_error: Some(node_api::napi_fatal_error),
    napi_open_callback_scope: Some(node_api::napi_open_callback_scope),
    napi_close_callback_scope: Some(node_api::napi_close_callback_scope),
    napi_async_init: Some(node_api::napi_async_init),
    napi_async_destroy: Some(node_api::napi_async_destroy),
    napi_make_callback: Some(node_api::napi_make_callback),
    napi_get_node_version: Some(node_api::napi_get_node_version),
    napi_get_uv_event_loop: Some(node_api::napi_get_uv_event_loop),
    node_api_get_module_file_name: Some(node_api::node_api_get_module_file_name),
    napi_create_buffer: Some(node_api::napi_create_buffer),
    napi_create_external_buffer: Some(node_api::napi_create_external_buffer),
    napi_create_buffer_copy: Some(node_api::napi_create_buffer_copy),
    napi_is_buffer: Some(node_api::napi_is_buffer),
    napi_get_buffer_info: Some(node_api::napi_get_buffer_info),
    napi_create_async_work: Some(node_api::napi_create_async_work),
    napi_delete_async_work: Some(node_api::napi_delete_async_work),
    napi_queue_async_work: Some(node_api::napi_queue_async_work),
    napi_cancel_async_work: Some(node_api::napi_cancel_async_work),
    napi_create_threadsafe_function: Some(node_api::napi_create_threadsafe_function),
    napi_get_threadsafe_function_context: Some(node_api::napi_get_threadsafe_function_context),
    napi_call_threadsafe_function: Some(node_api::napi_call_threadsafe_function),
    napi_acquire_threadsafe_function: Some(node_api::napi_acquire_threadsafe_function),
    napi_release_threadsafe_function: Some(node_api::napi_release_threadsafe_function),
    napi_ref_threadsafe_function: Some(node_api::napi_ref_threadsafe_function),
    napi_unref_threadsafe_function: Some(node_api::napi_unref_threadsafe_function),
  }
}
