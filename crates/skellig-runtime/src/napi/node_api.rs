//! The node_api surface: module/env lifecycle, buffers, async work and
//! thread-safe functions.
//!
//! The handful of symbols whose Node semantics have no counterpart here
//! (async contexts, callback scopes, the libuv loop getter, module
//! self-registration) return `ok` with a non-null sentinel so add-ons that
//! check for error propagation keep working.

use napi_sym::napi_sym;
use skellig_abi::*;
use std::mem::ManuallyDrop;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::async_work::AsyncWork;
use crate::callback;
use crate::context::{value_from_raw, value_to_raw};
use crate::dispatch::SendPtr;
use crate::napi::util;
use crate::tsfn::Tsfn;
use crate::value::{BufferData, TypedArrayData, Value};
use crate::{check_arg, check_env, check_no_pending};

/// Whether `napi_fatal_error` should abort the process (Node parity) or
/// log and return (the survivable default). Set from `RuntimeOptions`.
pub static ABORT_ON_FATAL: AtomicBool = AtomicBool::new(false);

/// Non-null sentinel written into outputs of the semantics-free stubs.
const SENTINEL: *mut c_void = 1 as *mut c_void;

struct AsyncHookToken {
  env: crate::env::EnvId,
  id: usize,
}

// --- module and env lifecycle ---

/// Self-registration is a Node-ism; add-ons loaded here are registered
/// through `napi_register_module_v1` by the loader.
pub unsafe extern "C" fn napi_module_register(module: *mut napi_module) {
  let _ = module;
  log::debug!("napi_module_register ignored (loader-driven registration)");
}

#[napi_sym]
fn napi_add_env_cleanup_hook(
  env: napi_env,
  fun: Option<napi_cleanup_hook>,
  arg: *mut c_void,
) -> Result {
  let env = check_env!(env);
  env.with(|e| e.add_cleanup_hook(fun, arg))
}

#[napi_sym]
fn napi_remove_env_cleanup_hook(
  env: napi_env,
  fun: Option<napi_cleanup_hook>,
  arg: *mut c_void,
) -> Result {
  let env = check_env!(env);
  env.with(|e| e.remove_cleanup_hook(fun, arg))
}

#[napi_sym]
fn napi_add_async_cleanup_hook(
  env: napi_env,
  hook: Option<napi_async_cleanup_hook>,
  arg: *mut c_void,
  remove_handle: *mut napi_async_cleanup_hook_handle,
) -> Result {
  let env = check_env!(env);
  let token = Box::into_raw(Box::new(AsyncHookToken { env: env.id, id: 0 }));
  let id = env.with(|e| e.add_async_cleanup_hook(hook, arg, token.cast()))?;
  unsafe { (*token).id = id };
  unsafe { util::write_out(remove_handle, token.cast()) };
  Ok(())
}

pub unsafe extern "C" fn napi_remove_async_cleanup_hook(
  remove_handle: napi_async_cleanup_hook_handle,
) -> napi_status {
  if remove_handle.is_null() {
    return napi_invalid_arg;
  }
  let token = unsafe { Box::from_raw(remove_handle.cast::<AsyncHookToken>()) };
  match crate::context::with_env(token.env, |e| e.remove_async_cleanup_hook(token.id)) {
    Ok(true) => napi_ok,
    Ok(false) | Err(_) => napi_invalid_arg,
  }
}

/// Routes to the host's uncaught-exception channel; the host drains it
/// through the runtime.
#[napi_sym]
fn napi_fatal_exception(env: napi_env, err: napi_value) -> Result {
  let env = check_env!(env);
  let error = env.get(err)?;
  log::error!("fatal exception raised by add-on (env {})", env.id);
  env.with(|e| e.uncaught.push(error))
}

pub unsafe extern "C" fn napi_fatal_error(
  location: *const c_char,
  location_len: usize,
  message: *const c_char,
  message_len: usize,
) {
  let read = |ptr: *const c_char, len: usize| -> String {
    if ptr.is_null() {
      String::new()
    } else {
      unsafe { util::read_utf8(ptr, len) }.unwrap_or_default()
    }
  };
  let location = read(location, location_len);
  let message = read(message, message_len);
  log::error!("napi fatal error [{location}]: {message}");
  if ABORT_ON_FATAL.load(Ordering::SeqCst) {
    std::process::abort();
  }
}

#[napi_sym]
fn napi_open_callback_scope(
  env: napi_env,
  resource_object: napi_value,
  context: napi_async_context,
  result: *mut napi_callback_scope,
) -> Result {
  let _env = check_env!(env);
  let _ = (resource_object, context);
  check_arg!(result);
  unsafe { *result = SENTINEL };
  Ok(())
}

#[napi_sym]
fn napi_close_callback_scope(env: napi_env, scope: napi_callback_scope) -> Result {
  let _env = check_env!(env);
  let _ = scope;
  Ok(())
}

#[napi_sym]
fn napi_async_init(
  env: napi_env,
  async_resource: napi_value,
  async_resource_name: napi_value,
  result: *mut napi_async_context,
) -> Result {
  let _env = check_env!(env);
  let _ = (async_resource, async_resource_name);
  check_arg!(result);
  unsafe { *result = SENTINEL };
  Ok(())
}

#[napi_sym]
fn napi_async_destroy(env: napi_env, async_context: napi_async_context) -> Result {
  let _env = check_env!(env);
  let _ = async_context;
  Ok(())
}

/// Same call path as `napi_call_function`; the async context carries no
/// semantics here.
#[napi_sym]
fn napi_make_callback(
  env: napi_env,
  async_context: napi_async_context,
  recv: napi_value,
  func: napi_value,
  argc: usize,
  argv: *const napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let _ = async_context;
  if argc > 0 {
    check_arg!(argv);
  }
  let receiver = match value_from_raw(recv) {
    Some(id) => env.with(|e| e.get_value(id))??,
    None => Value::Undefined,
  };
  let function = env.get(func)?;
  let mut args = Vec::with_capacity(argc);
  for index in 0..argc {
    let raw = unsafe { *argv.add(index) };
    args.push(env.get(raw)?);
  }
  let returned = callback::invoke_callable(env.id, &function, receiver, &args, None)?;
  if !result.is_null() {
    let id = env.alloc(returned)?;
    unsafe { *result = value_to_raw(id) };
  }
  Ok(())
}

struct VersionCell(napi_node_version);

// The record only carries a pointer to the static release string.
unsafe impl Sync for VersionCell {}

static NODE_VERSION: VersionCell = VersionCell(napi_node_version {
  major: 18,
  minor: 18,
  patch: 0,
  release: b"node\0".as_ptr().cast::<c_char>(),
});

#[napi_sym]
fn napi_get_node_version(env: napi_env, version: *mut *const napi_node_version) -> Result {
  let _env = check_env!(env);
  check_arg!(version);
  unsafe { *version = &NODE_VERSION.0 };
  Ok(())
}

/// Sentinel only: there is no libuv loop to hand out, but callers probe
/// this pointer for null to detect failure.
#[napi_sym]
fn napi_get_uv_event_loop(env: napi_env, uv_loop: *mut *mut c_void) -> Result {
  let env = check_env!(env);
  check_arg!(uv_loop);
  unsafe { *uv_loop = env.raw };
  Ok(())
}

#[napi_sym]
fn node_api_get_module_file_name(env: napi_env, result: *mut *const c_char) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let ptr = env.with(|e| e.file_name.as_ptr())?;
  unsafe { *result = ptr };
  Ok(())
}

// --- buffers ---

#[napi_sym]
fn napi_create_buffer(
  env: napi_env,
  length: usize,
  data: *mut *mut c_void,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let buffer = BufferData::owned(vec![0; length]);
  unsafe { util::write_out(data, buffer.borrow_mut().as_ptr().cast()) };
  let view = Value::TypedArray(std::rc::Rc::new(TypedArrayData {
    kind: napi_uint8_array,
    buffer,
    byte_offset: 0,
    length,
    node_buffer: true,
  }));
  let id = env.alloc(view)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_buffer_copy(
  env: napi_env,
  length: usize,
  data: *const c_void,
  result_data: *mut *mut c_void,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  if length > 0 {
    check_arg!(data);
  }
  let bytes = unsafe { std::slice::from_raw_parts(data.cast::<u8>(), length) }.to_vec();
  let buffer = BufferData::owned(bytes);
  unsafe { util::write_out(result_data, buffer.borrow_mut().as_ptr().cast()) };
  let view = Value::TypedArray(std::rc::Rc::new(TypedArrayData {
    kind: napi_uint8_array,
    buffer,
    byte_offset: 0,
    length,
    node_buffer: true,
  }));
  let id = env.alloc(view)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_external_buffer(
  env: napi_env,
  length: usize,
  data: *mut c_void,
  finalize_cb: Option<napi_finalize>,
  finalize_hint: *mut c_void,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  check_arg!(data);
  let buffer = BufferData::external(data.cast(), length);
  let view = Value::TypedArray(std::rc::Rc::new(TypedArrayData {
    kind: napi_uint8_array,
    buffer,
    byte_offset: 0,
    length,
    node_buffer: true,
  }));
  if let Some(finalize) = finalize_cb {
    env.with(|e| e.add_finalizer(&view, finalize, data, finalize_hint, false))?;
  }
  let id = env.alloc(view)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_is_buffer(env: napi_env, value: napi_value, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let is_buffer = match env.get(value)? {
    Value::TypedArray(view) => view.node_buffer || view.kind == napi_uint8_array,
    _ => false,
  };
  unsafe { *result = is_buffer };
  Ok(())
}

#[napi_sym]
fn napi_get_buffer_info(
  env: napi_env,
  value: napi_value,
  data: *mut *mut c_void,
  length: *mut usize,
) -> Result {
  let env = check_env!(env);
  let view = match env.get(value)? {
    Value::TypedArray(view) => view,
    _ => Err(Error::InvalidArg)?,
  };
  unsafe {
    util::write_out(length, view.length);
    if !data.is_null() {
      let mut buffer = view.buffer.borrow_mut();
      let base = buffer.as_ptr();
      *data = if base.is_null() {
        std::ptr::null_mut()
      } else {
        base.add(view.byte_offset).cast()
      };
    }
  }
  Ok(())
}

// --- async work ---

#[napi_sym]
fn napi_create_async_work(
  env: napi_env,
  async_resource: napi_value,
  async_resource_name: napi_value,
  execute: napi_async_execute_callback,
  complete: Option<napi_async_complete_callback>,
  data: *mut c_void,
  result: *mut napi_async_work,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let _ = async_resource;
  let resource_name = match value_from_raw(async_resource_name) {
    Some(id) => match env.with(|e| e.get_value(id))?? {
      Value::String(s) => s.to_string(),
      _ => String::new(),
    },
    None => String::new(),
  };
  let work = env.with(|e| {
    AsyncWork::new(
      e.id,
      SendPtr(e.raw),
      execute,
      complete,
      SendPtr(data),
      resource_name,
      e.dispatch.clone(),
    )
  })?;
  unsafe { *result = Arc::into_raw(work) as napi_async_work };
  Ok(())
}

#[napi_sym]
fn napi_delete_async_work(env: napi_env, work: napi_async_work) -> Result {
  let _env = check_env!(env);
  check_arg!(work);
  drop(unsafe { Arc::from_raw(work.cast::<AsyncWork>()) });
  Ok(())
}

#[napi_sym]
fn napi_queue_async_work(env: napi_env, work: napi_async_work) -> Result {
  let env = check_env!(env);
  check_arg!(work);
  let work = unsafe { ManuallyDrop::new(Arc::from_raw(work.cast::<AsyncWork>())) };
  if !work.mark_queued() {
    return Err(Error::GenericFailure);
  }
  let job = Arc::clone(&work);
  env.with(|e| e.pool.submit(Box::new(move || job.run())))
}

#[napi_sym]
fn napi_cancel_async_work(env: napi_env, work: napi_async_work) -> Result {
  let _env = check_env!(env);
  check_arg!(work);
  let work = unsafe { ManuallyDrop::new(Arc::from_raw(work.cast::<AsyncWork>())) };
  if work.cancel() {
    Ok(())
  } else {
    Err(Error::GenericFailure)
  }
}

// --- thread-safe functions ---

unsafe fn tsfn_from_raw(
  func: napi_threadsafe_function,
) -> Option<ManuallyDrop<Arc<Tsfn>>> {
  if func.is_null() {
    None
  } else {
    Some(ManuallyDrop::new(unsafe { Arc::from_raw(func.cast::<Tsfn>()) }))
  }
}

#[napi_sym]
fn napi_create_threadsafe_function(
  env: napi_env,
  func: napi_value,
  async_resource: napi_value,
  async_resource_name: napi_value,
  max_queue_size: usize,
  initial_thread_count: usize,
  thread_finalize_data: *mut c_void,
  thread_finalize_cb: Option<napi_finalize>,
  context: *mut c_void,
  call_js_cb: Option<napi_threadsafe_function_call_js>,
  result: *mut napi_threadsafe_function,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let _ = (async_resource, async_resource_name);
  if initial_thread_count == 0 {
    return Err(Error::InvalidArg);
  }
  let callable = match value_from_raw(func) {
    Some(id) => {
      let value = env.with(|e| e.get_value(id))??;
      if value.type_of() != napi_function {
        return Err(Error::FunctionExpected);
      }
      Some(env.with(|e| e.store.alloc_pinned(value))?)
    }
    None => {
      if call_js_cb.is_none() {
        return Err(Error::InvalidArg);
      }
      None
    }
  };
  let tsfn = env.with(|e| {
    let tsfn = Tsfn::new(
      e.id,
      callable,
      SendPtr(context),
      call_js_cb,
      thread_finalize_cb,
      SendPtr(thread_finalize_data),
      max_queue_size,
      initial_thread_count,
      e.dispatch.clone(),
    );
    e.tsfns.push(tsfn.clone());
    e.active_tsfns += 1;
    tsfn
  })?;
  unsafe { *result = Arc::into_raw(tsfn) as napi_threadsafe_function };
  Ok(())
}

pub unsafe extern "C" fn napi_get_threadsafe_function_context(
  func: napi_threadsafe_function,
  result: *mut *mut c_void,
) -> napi_status {
  let Some(tsfn) = (unsafe { tsfn_from_raw(func) }) else {
    return napi_invalid_arg;
  };
  if result.is_null() {
    return napi_invalid_arg;
  }
  unsafe { *result = tsfn.context().0 };
  napi_ok
}

pub unsafe extern "C" fn napi_call_threadsafe_function(
  func: napi_threadsafe_function,
  data: *mut c_void,
  is_blocking: napi_threadsafe_function_call_mode,
) -> napi_status {
  let Some(tsfn) = (unsafe { tsfn_from_raw(func) }) else {
    return napi_invalid_arg;
  };
  tsfn.call(SendPtr(data), is_blocking)
}

pub unsafe extern "C" fn napi_acquire_threadsafe_function(
  func: napi_threadsafe_function,
) -> napi_status {
  let Some(tsfn) = (unsafe { tsfn_from_raw(func) }) else {
    return napi_invalid_arg;
  };
  tsfn.acquire()
}

pub unsafe extern "C" fn napi_release_threadsafe_function(
  func: napi_threadsafe_function,
  mode: napi_threadsafe_function_release_mode,
) -> napi_status {
  let Some(tsfn) = (unsafe { tsfn_from_raw(func) }) else {
    return napi_invalid_arg;
  };
  tsfn.release(mode)
}

#[napi_sym]
fn napi_ref_threadsafe_function(env: napi_env, func: napi_threadsafe_function) -> Result {
  let env = check_env!(env);
  check_arg!(func);
  let tsfn = unsafe { tsfn_from_raw(func) }.ok_or(Error::InvalidArg)?;
  if !tsfn.set_referenced(true) {
    env.with(|e| e.active_tsfns += 1)?;
  }
  Ok(())
}

#[napi_sym]
fn napi_unref_threadsafe_function(env: napi_env, func: napi_threadsafe_function) -> Result {
  let env = check_env!(env);
  check_arg!(func);
  let tsfn = unsafe { tsfn_from_raw(func) }.ok_or(Error::InvalidArg)?;
  if tsfn.set_referenced(false) {
    env.with(|e| e.active_tsfns = e.active_tsfns.saturating_sub(1))?;
  }
  Ok(())
}
