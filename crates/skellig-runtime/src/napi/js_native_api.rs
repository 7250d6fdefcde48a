//! The js_native_api surface: every value, object, reference, scope and
//! error entry point of NAPI v8, implemented against the handle store.
//!
//! Each `#[napi_sym]` function becomes a `pub unsafe extern "C" fn` slot
//! through the `napi_wrap!` preamble; the table in `napi::mod` wires them
//! into the shim.

use napi_sym::napi_sym;
use skellig_abi::*;
use std::rc::Rc;

use crate::callback::{self, CallbackInfo};
use crate::context::{value_from_raw, value_to_raw};
use crate::env::{DeferredSlot, Env};
use crate::error::ExceptionKind;
use crate::handles::{ID_FALSE, ID_GLOBAL, ID_NULL, ID_TRUE, ID_UNDEFINED};
use crate::napi::util::{self, EnvRef};
use crate::refs::RefId;
use crate::value::{
  number_to_display, BufferData, BufferStorage, CallableData, DataViewData, ObjectData,
  PromiseState, Property, PropertyKey, PropertySlot, SymbolData, TypedArrayData, Value,
};
use crate::{check_arg, check_env, check_no_pending};

fn ref_to_raw(id: RefId) -> napi_ref {
  (id + 1) as napi_ref
}

fn ref_from_raw(raw: napi_ref) -> std::result::Result<RefId, Error> {
  if raw.is_null() {
    Err(Error::InvalidArg)
  } else {
    Ok(raw as usize - 1)
  }
}

fn property_key(value: &Value) -> std::result::Result<PropertyKey, Error> {
  match value {
    Value::String(s) => Ok(PropertyKey::Str(s.clone())),
    Value::Symbol(s) => Ok(PropertyKey::Sym(s.clone())),
    Value::Number(n) => Ok(PropertyKey::str(&number_to_display(*n))),
    _ => Err(Error::NameExpected),
  }
}

// --- singletons and primitives ---

/// Reads the stored error record; deliberately bypasses the preamble so
/// the record set by the previous entry point survives this query.
pub unsafe extern "C" fn napi_get_last_error_info(
  env: napi_env,
  result: *mut *const napi_extended_error_info,
) -> napi_status {
  let Ok(env) = EnvRef::resolve(env) else {
    return napi_invalid_arg;
  };
  if result.is_null() {
    return napi_invalid_arg;
  }
  match env.with(|e| e.last_error.info_ptr()) {
    Ok(ptr) => {
      unsafe { *result = ptr };
      napi_ok
    }
    Err(_) => napi_invalid_arg,
  }
}

#[napi_sym]
fn napi_get_undefined(env: napi_env, result: *mut napi_value) -> Result {
  let _env = check_env!(env);
  check_arg!(result);
  unsafe { *result = value_to_raw(ID_UNDEFINED) };
  Ok(())
}

#[napi_sym]
fn napi_get_null(env: napi_env, result: *mut napi_value) -> Result {
  let _env = check_env!(env);
  check_arg!(result);
  unsafe { *result = value_to_raw(ID_NULL) };
  Ok(())
}

#[napi_sym]
fn napi_get_global(env: napi_env, result: *mut napi_value) -> Result {
  let _env = check_env!(env);
  check_arg!(result);
  unsafe { *result = value_to_raw(ID_GLOBAL) };
  Ok(())
}

#[napi_sym]
fn napi_get_boolean(env: napi_env, value: bool, result: *mut napi_value) -> Result {
  let _env = check_env!(env);
  check_arg!(result);
  unsafe { *result = value_to_raw(if value { ID_TRUE } else { ID_FALSE }) };
  Ok(())
}

#[napi_sym]
fn napi_create_object(env: napi_env, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::object())?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_double(env: napi_env, value: f64, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::Number(value))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_int32(env: napi_env, value: i32, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::Number(f64::from(value)))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_uint32(env: napi_env, value: u32, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::Number(f64::from(value)))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_int64(env: napi_env, value: i64, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::Number(value as f64))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_bigint_int64(env: napi_env, value: i64, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::BigInt(i128::from(value)))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_bigint_uint64(env: napi_env, value: u64, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::BigInt(i128::from(value)))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

/// BigInt content is held in an i128; magnitudes beyond two words are
/// rejected rather than silently truncated.
#[napi_sym]
fn napi_create_bigint_words(
  env: napi_env,
  sign_bit: c_int,
  word_count: usize,
  words: *const u64,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  if word_count > 0 {
    check_arg!(words);
  }
  if word_count > 2 {
    return Err(Error::InvalidArg);
  }
  let mut magnitude: u128 = 0;
  for index in 0..word_count {
    let word = unsafe { *words.add(index) };
    magnitude |= u128::from(word) << (64 * index);
  }
  let value = if sign_bit != 0 {
    if magnitude > i128::MAX as u128 + 1 {
      return Err(Error::InvalidArg);
    }
    (magnitude as i128).wrapping_neg()
  } else {
    if magnitude > i128::MAX as u128 {
      return Err(Error::InvalidArg);
    }
    magnitude as i128
  };
  let id = env.alloc(Value::BigInt(value))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_typeof(env: napi_env, value: napi_value, result: *mut napi_valuetype) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(value)?;
  unsafe { *result = value.type_of() };
  Ok(())
}

#[napi_sym]
fn napi_get_value_double(env: napi_env, value: napi_value, result: *mut f64) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let n = util::expect_number(&env.get(value)?)?;
  unsafe { *result = n };
  Ok(())
}

#[napi_sym]
fn napi_get_value_int32(env: napi_env, value: napi_value, result: *mut i32) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let n = util::expect_number(&env.get(value)?)?;
  unsafe { *result = if n.is_finite() { n as i64 as i32 } else { 0 } };
  Ok(())
}

#[napi_sym]
fn napi_get_value_uint32(env: napi_env, value: napi_value, result: *mut u32) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let n = util::expect_number(&env.get(value)?)?;
  unsafe { *result = if n.is_finite() { n as i64 as u32 } else { 0 } };
  Ok(())
}

#[napi_sym]
fn napi_get_value_int64(env: napi_env, value: napi_value, result: *mut i64) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let n = util::expect_number(&env.get(value)?)?;
  unsafe { *result = if n.is_finite() { n as i64 } else { 0 } };
  Ok(())
}

#[napi_sym]
fn napi_get_value_bool(env: napi_env, value: napi_value, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let b = util::expect_bool(&env.get(value)?)?;
  unsafe { *result = b };
  Ok(())
}

#[napi_sym]
fn napi_get_value_bigint_int64(
  env: napi_env,
  value: napi_value,
  result: *mut i64,
  lossless: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  check_arg!(lossless);
  let n = util::expect_bigint(&env.get(value)?)?;
  unsafe {
    *lossless = i64::try_from(n).is_ok();
    *result = n as i64;
  }
  Ok(())
}

#[napi_sym]
fn napi_get_value_bigint_uint64(
  env: napi_env,
  value: napi_value,
  result: *mut u64,
  lossless: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  check_arg!(lossless);
  let n = util::expect_bigint(&env.get(value)?)?;
  unsafe {
    *lossless = u64::try_from(n).is_ok();
    *result = n as u64;
  }
  Ok(())
}

#[napi_sym]
fn napi_get_value_bigint_words(
  env: napi_env,
  value: napi_value,
  sign_bit: *mut c_int,
  word_count: *mut usize,
  words: *mut u64,
) -> Result {
  let env = check_env!(env);
  check_arg!(word_count);
  let n = util::expect_bigint(&env.get(value)?)?;
  let magnitude = n.unsigned_abs();
  let needed = if magnitude == 0 {
    0
  } else if magnitude >> 64 == 0 {
    1
  } else {
    2
  };
  if words.is_null() {
    unsafe { *word_count = needed };
    return Ok(());
  }
  let capacity = unsafe { *word_count };
  let count = needed.min(capacity);
  for index in 0..count {
    unsafe { *words.add(index) = (magnitude >> (64 * index)) as u64 };
  }
  unsafe {
    *word_count = needed;
    util::write_out(sign_bit, i32::from(n < 0));
  }
  Ok(())
}

// --- strings and symbols ---

#[napi_sym]
fn napi_create_string_utf8(
  env: napi_env,
  string: *const c_char,
  length: usize,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let s = unsafe { util::read_utf8(string, length)? };
  let id = env.alloc(Value::string(&s))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_string_latin1(
  env: napi_env,
  string: *const c_char,
  length: usize,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  check_arg!(string);
  let bytes = if length == NAPI_AUTO_LENGTH {
    unsafe { std::ffi::CStr::from_ptr(string) }.to_bytes()
  } else {
    unsafe { std::slice::from_raw_parts(string.cast::<u8>(), length) }
  };
  let s: String = bytes.iter().map(|&b| b as char).collect();
  let id = env.alloc(Value::string(&s))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_string_utf16(
  env: napi_env,
  string: *const u16,
  length: usize,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let s = unsafe { util::read_utf16(string, length)? };
  let id = env.alloc(Value::string(&s))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

/// External string creators copy into owned storage; the finalizer runs
/// immediately and `copied` reports true.
#[napi_sym]
fn node_api_create_external_string_latin1(
  env: napi_env,
  string: *mut c_char,
  length: usize,
  finalize_callback: Option<napi_finalize>,
  finalize_hint: *mut c_void,
  result: *mut napi_value,
  copied: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  check_arg!(string);
  let bytes = if length == NAPI_AUTO_LENGTH {
    unsafe { std::ffi::CStr::from_ptr(string) }.to_bytes()
  } else {
    unsafe { std::slice::from_raw_parts(string.cast::<u8>(), length) }
  };
  let s: String = bytes.iter().map(|&b| b as char).collect();
  let id = env.alloc(Value::string(&s))?;
  if let Some(finalize) = finalize_callback {
    unsafe { finalize(env.raw, string.cast(), finalize_hint) };
  }
  unsafe {
    *result = value_to_raw(id);
    util::write_out(copied, true);
  }
  Ok(())
}

#[napi_sym]
fn node_api_create_external_string_utf16(
  env: napi_env,
  string: *mut u16,
  length: usize,
  finalize_callback: Option<napi_finalize>,
  finalize_hint: *mut c_void,
  result: *mut napi_value,
  copied: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let s = unsafe { util::read_utf16(string, length)? };
  let id = env.alloc(Value::string(&s))?;
  if let Some(finalize) = finalize_callback {
    unsafe { finalize(env.raw, string.cast(), finalize_hint) };
  }
  unsafe {
    *result = value_to_raw(id);
    util::write_out(copied, true);
  }
  Ok(())
}

#[napi_sym]
fn node_api_create_property_key_utf16(
  env: napi_env,
  string: *const u16,
  length: usize,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let s = unsafe { util::read_utf16(string, length)? };
  let id = env.alloc(Value::string(&s))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_get_value_string_utf8(
  env: napi_env,
  value: napi_value,
  buf: *mut c_char,
  bufsize: usize,
  result: *mut usize,
) -> Result {
  let env = check_env!(env);
  let s = util::expect_string(&env.get(value)?)?;
  unsafe { util::copy_utf8(&s, buf, bufsize, result) }
}

#[napi_sym]
fn napi_get_value_string_latin1(
  env: napi_env,
  value: napi_value,
  buf: *mut c_char,
  bufsize: usize,
  result: *mut usize,
) -> Result {
  let env = check_env!(env);
  let s = util::expect_string(&env.get(value)?)?;
  let bytes: Vec<u8> = s
    .chars()
    .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
    .collect();
  if buf.is_null() {
    check_arg!(result);
    unsafe { *result = bytes.len() };
    return Ok(());
  }
  if bufsize == 0 {
    unsafe { util::write_out(result, 0) };
    return Ok(());
  }
  let end = bytes.len().min(bufsize - 1);
  unsafe {
    std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), end);
    *buf.add(end) = 0;
    util::write_out(result, end);
  }
  Ok(())
}

#[napi_sym]
fn napi_get_value_string_utf16(
  env: napi_env,
  value: napi_value,
  buf: *mut u16,
  bufsize: usize,
  result: *mut usize,
) -> Result {
  let env = check_env!(env);
  let s = util::expect_string(&env.get(value)?)?;
  unsafe { util::copy_utf16(&s, buf, bufsize, result) }
}

#[napi_sym]
fn napi_create_symbol(env: napi_env, description: napi_value, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let description = match value_from_raw(description) {
    Some(id) => match env.with(|e| e.get_value(id))?? {
      Value::String(s) => Some(s.to_string()),
      Value::Undefined => None,
      _ => return Err(Error::StringExpected),
    },
    None => None,
  };
  let id = env.alloc(Value::Symbol(Rc::new(SymbolData { description })))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn node_api_symbol_for(
  env: napi_env,
  utf8description: *const c_char,
  length: usize,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let description = unsafe { util::read_utf8(utf8description, length)? };
  let symbol = env.with(|e| e.symbol_for(&description))?;
  let id = env.alloc(Value::Symbol(symbol))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

// --- errors and exceptions ---

fn create_error_value(
  env: EnvRef,
  kind: ExceptionKind,
  code: napi_value,
  msg: napi_value,
) -> std::result::Result<Value, Error> {
  let message = env.get(msg)?;
  if !matches!(message, Value::String(_)) {
    return Err(Error::StringExpected);
  }
  let code = match value_from_raw(code) {
    Some(id) => Some(env.with(|e| e.get_value(id))??),
    None => None,
  };
  Ok(Env::make_error(kind, code, message))
}

#[napi_sym]
fn napi_create_error(
  env: napi_env,
  code: napi_value,
  msg: napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let error = create_error_value(env, ExceptionKind::Error, code, msg)?;
  let id = env.alloc(error)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_type_error(
  env: napi_env,
  code: napi_value,
  msg: napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let error = create_error_value(env, ExceptionKind::TypeError, code, msg)?;
  let id = env.alloc(error)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_range_error(
  env: napi_env,
  code: napi_value,
  msg: napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let error = create_error_value(env, ExceptionKind::RangeError, code, msg)?;
  let id = env.alloc(error)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn node_api_create_syntax_error(
  env: napi_env,
  code: napi_value,
  msg: napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let error = create_error_value(env, ExceptionKind::SyntaxError, code, msg)?;
  let id = env.alloc(error)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_throw(env: napi_env, error: napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let value = env.get(error)?;
  env.throw(value)
}

fn throw_with(env: EnvRef, kind: ExceptionKind, code: *const c_char, msg: *const c_char) -> Result {
  if env.has_pending()? {
    return Err(Error::PendingException);
  }
  check_arg!(msg);
  let message = unsafe { util::read_utf8(msg, NAPI_AUTO_LENGTH)? };
  let code = if code.is_null() {
    None
  } else {
    Some(Value::string(&unsafe {
      util::read_utf8(code, NAPI_AUTO_LENGTH)?
    }))
  };
  let error = Env::make_error(kind, code, Value::string(&message));
  env.throw(error)
}

#[napi_sym]
fn napi_throw_error(env: napi_env, code: *const c_char, msg: *const c_char) -> Result {
  let env = check_env!(env);
  throw_with(env, ExceptionKind::Error, code, msg)
}

#[napi_sym]
fn napi_throw_type_error(env: napi_env, code: *const c_char, msg: *const c_char) -> Result {
  let env = check_env!(env);
  throw_with(env, ExceptionKind::TypeError, code, msg)
}

#[napi_sym]
fn napi_throw_range_error(env: napi_env, code: *const c_char, msg: *const c_char) -> Result {
  let env = check_env!(env);
  throw_with(env, ExceptionKind::RangeError, code, msg)
}

#[napi_sym]
fn node_api_throw_syntax_error(env: napi_env, code: *const c_char, msg: *const c_char) -> Result {
  let env = check_env!(env);
  throw_with(env, ExceptionKind::SyntaxError, code, msg)
}

#[napi_sym]
fn napi_is_error(env: napi_env, value: napi_value, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(value)?;
  let is_error = match value.as_object() {
    Some(obj) => obj.borrow().error_kind.is_some(),
    None => false,
  };
  unsafe { *result = is_error };
  Ok(())
}

#[napi_sym]
fn napi_is_exception_pending(env: napi_env, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let pending = env.has_pending()?;
  unsafe { *result = pending };
  Ok(())
}

#[napi_sym]
fn napi_get_and_clear_last_exception(env: napi_env, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  match env.with(|e| e.take_exception())? {
    Some(value) => {
      let id = env.alloc(value)?;
      unsafe { *result = value_to_raw(id) };
    }
    None => unsafe { *result = value_to_raw(ID_UNDEFINED) },
  }
  Ok(())
}

// --- coercion ---

#[napi_sym]
fn napi_coerce_to_bool(env: napi_env, value: napi_value, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let truthy = env.get(value)?.truthy();
  unsafe { *result = value_to_raw(if truthy { ID_TRUE } else { ID_FALSE }) };
  Ok(())
}

#[napi_sym]
fn napi_coerce_to_number(env: napi_env, value: napi_value, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let value = env.get(value)?;
  let n = match &value {
    Value::Number(n) | Value::Date(n) => *n,
    Value::Bool(b) => {
      if *b {
        1.0
      } else {
        0.0
      }
    }
    Value::Null => 0.0,
    Value::BigInt(n) => *n as f64,
    Value::String(s) => {
      let trimmed = s.trim();
      if trimmed.is_empty() {
        0.0
      } else {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
      }
    }
    _ => f64::NAN,
  };
  let id = env.alloc(Value::Number(n))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_coerce_to_string(env: napi_env, value: napi_value, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let s = env.get(value)?.to_display_string();
  let id = env.alloc(Value::string(&s))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

/// Object coercion of a primitive yields a fresh plain object; there is
/// no wrapper-class machinery to imitate.
#[napi_sym]
fn napi_coerce_to_object(env: napi_env, value: napi_value, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let value = env.get(value)?;
  let coerced = match &value {
    Value::Undefined | Value::Null => return Err(Error::ObjectExpected),
    other if other.is_object_like() => other.clone(),
    _ => Value::object(),
  };
  let id = env.alloc(coerced)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

// --- objects and properties ---

#[napi_sym]
fn napi_get_prototype(env: napi_env, object: napi_value, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(object)?;
  let obj = value.as_object().ok_or(Error::ObjectExpected)?;
  let proto = obj.borrow().proto.clone();
  match proto {
    Some(proto) => {
      let id = env.alloc(Value::Object(proto))?;
      unsafe { *result = value_to_raw(id) };
    }
    None => unsafe { *result = value_to_raw(ID_NULL) },
  }
  Ok(())
}

#[napi_sym]
fn napi_set_property(
  env: napi_env,
  object: napi_value,
  key: napi_value,
  value: napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let object = env.get(object)?;
  let key = property_key(&env.get(key)?)?;
  let value = env.get(value)?;
  callback::set_property_value(env.id, &object, key, value)
}

#[napi_sym]
fn napi_get_property(
  env: napi_env,
  object: napi_value,
  key: napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let object = env.get(object)?;
  let key = property_key(&env.get(key)?)?;
  let value = callback::get_property_value(env.id, &object, &key)?;
  let id = env.alloc(value)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_has_property(
  env: napi_env,
  object: napi_value,
  key: napi_value,
  result: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let object = env.get(object)?;
  let key = property_key(&env.get(key)?)?;
  let has = callback::has_property_value(&object, &key)?;
  unsafe { *result = has };
  Ok(())
}

#[napi_sym]
fn napi_delete_property(
  env: napi_env,
  object: napi_value,
  key: napi_value,
  result: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let object = env.get(object)?;
  let key = property_key(&env.get(key)?)?;
  let deleted = callback::delete_property_value(&object, &key)?;
  unsafe { util::write_out(result, deleted) };
  Ok(())
}

#[napi_sym]
fn napi_has_own_property(
  env: napi_env,
  object: napi_value,
  key: napi_value,
  result: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let object = env.get(object)?;
  let key = property_key(&env.get(key)?)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let has = obj.borrow().props.contains_key(&key);
  unsafe { *result = has };
  Ok(())
}

#[napi_sym]
fn napi_set_named_property(
  env: napi_env,
  object: napi_value,
  utf8name: *const c_char,
  value: napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let name = unsafe { util::read_utf8(utf8name, NAPI_AUTO_LENGTH)? };
  let object = env.get(object)?;
  let value = env.get(value)?;
  callback::set_property_value(env.id, &object, PropertyKey::str(&name), value)
}

#[napi_sym]
fn napi_get_named_property(
  env: napi_env,
  object: napi_value,
  utf8name: *const c_char,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let name = unsafe { util::read_utf8(utf8name, NAPI_AUTO_LENGTH)? };
  let object = env.get(object)?;
  let value = callback::get_property_value(env.id, &object, &PropertyKey::str(&name))?;
  let id = env.alloc(value)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_has_named_property(
  env: napi_env,
  object: napi_value,
  utf8name: *const c_char,
  result: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let name = unsafe { util::read_utf8(utf8name, NAPI_AUTO_LENGTH)? };
  let object = env.get(object)?;
  let has = callback::has_property_value(&object, &PropertyKey::str(&name))?;
  unsafe { *result = has };
  Ok(())
}

#[napi_sym]
fn napi_set_element(env: napi_env, object: napi_value, index: u32, value: napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let object = env.get(object)?;
  let value = env.get(value)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let handled = {
    let mut data = obj.borrow_mut();
    if data.frozen {
      return Ok(());
    }
    match &mut data.elements {
      Some(elements) => {
        let index = index as usize;
        if index >= elements.len() {
          elements.resize(index + 1, Value::Undefined);
        }
        elements[index] = value.clone();
        true
      }
      None => false,
    }
  };
  if handled {
    return Ok(());
  }
  callback::set_property_value(env.id, &object, PropertyKey::str(&index.to_string()), value)
}

#[napi_sym]
fn napi_get_element(
  env: napi_env,
  object: napi_value,
  index: u32,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let object = env.get(object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let element = {
    let data = obj.borrow();
    data
      .elements
      .as_ref()
      .map(|elements| elements.get(index as usize).cloned().unwrap_or(Value::Undefined))
  };
  let value = match element {
    Some(value) => value,
    None => {
      callback::get_property_value(env.id, &object, &PropertyKey::str(&index.to_string()))?
    }
  };
  let id = env.alloc(value)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_has_element(env: napi_env, object: napi_value, index: u32, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let object = env.get(object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let has = {
    let data = obj.borrow();
    match &data.elements {
      Some(elements) => (index as usize) < elements.len(),
      None => data.props.contains_key(&PropertyKey::str(&index.to_string())),
    }
  };
  unsafe { *result = has };
  Ok(())
}

#[napi_sym]
fn napi_delete_element(env: napi_env, object: napi_value, index: u32, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let object = env.get(object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let deleted = {
    let mut data = obj.borrow_mut();
    if data.frozen || data.sealed {
      false
    } else {
      match &mut data.elements {
        Some(elements) => {
          let index = index as usize;
          if index < elements.len() {
            // JS delete leaves a hole; the length is unchanged.
            elements[index] = Value::Undefined;
            true
          } else {
            true
          }
        }
        None => data
          .props
          .shift_remove(&PropertyKey::str(&index.to_string()))
          .is_some(),
      }
    }
  };
  unsafe { util::write_out(result, deleted) };
  Ok(())
}

fn apply_descriptor(
  env: EnvRef,
  target: &Value,
  descriptor: &napi_property_descriptor,
) -> Result {
  let key = if descriptor.utf8name.is_null() {
    let name_id = value_from_raw(descriptor.name).ok_or(Error::NameExpected)?;
    let name = env.with(|e| e.get_value(name_id))??;
    property_key(&name)?
  } else {
    PropertyKey::str(&unsafe { util::read_utf8(descriptor.utf8name, NAPI_AUTO_LENGTH)? })
  };

  let attributes = descriptor.attributes & !napi_static;
  let name_for_callable = match &key {
    PropertyKey::Str(s) => s.to_string(),
    PropertyKey::Sym(_) => String::new(),
  };

  let slot = if let Some(method) = descriptor.method {
    PropertySlot::Value(Value::Object(ObjectData::new_function(CallableData {
      name: name_for_callable,
      callback: method,
      data: descriptor.data,
      class_prototype: None,
    })))
  } else if descriptor.getter.is_some() || descriptor.setter.is_some() {
    let make = |cb: napi_callback, prefix: &str| {
      Value::Object(ObjectData::new_function(CallableData {
        name: format!("{prefix}{name_for_callable}"),
        callback: cb,
        data: descriptor.data,
        class_prototype: None,
      }))
    };
    PropertySlot::Accessor {
      getter: descriptor.getter.map(|cb| make(cb, "get ")),
      setter: descriptor.setter.map(|cb| make(cb, "set ")),
    }
  } else {
    let value_id = value_from_raw(descriptor.value).ok_or(Error::InvalidArg)?;
    PropertySlot::Value(env.with(|e| e.get_value(value_id))??)
  };

  let obj = target.as_object().ok_or(Error::ObjectExpected)?;
  obj
    .borrow_mut()
    .props
    .insert(key, Property { slot, attributes });
  Ok(())
}

#[napi_sym]
fn napi_define_properties(
  env: napi_env,
  object: napi_value,
  property_count: usize,
  properties: *const napi_property_descriptor,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  if property_count > 0 {
    check_arg!(properties);
  }
  let object = env.get(object)?;
  for index in 0..property_count {
    let descriptor = unsafe { &*properties.add(index) };
    apply_descriptor(env, &object, descriptor)?;
  }
  Ok(())
}

#[napi_sym]
fn napi_get_property_names(env: napi_env, object: napi_value, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let object = env.get(object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let names = {
    let data = obj.borrow();
    let mut names: Vec<Value> = Vec::new();
    if let Some(elements) = &data.elements {
      for index in 0..elements.len() {
        names.push(Value::string(&index.to_string()));
      }
    }
    for (key, prop) in &data.props {
      if let PropertyKey::Str(s) = key {
        if prop.enumerable() {
          names.push(Value::String(s.clone()));
        }
      }
    }
    names
  };
  let array = ObjectData::new_array(0);
  array.borrow_mut().elements = Some(names);
  let id = env.alloc(Value::Object(array))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_get_all_property_names(
  env: napi_env,
  object: napi_value,
  key_mode: napi_key_collection_mode,
  key_filter: napi_key_filter,
  key_conversion: napi_key_conversion,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let object = env.get(object)?;
  let mut current = object.as_object().ok_or(Error::ObjectExpected)?.clone();
  let mut names: Vec<Value> = Vec::new();
  let mut seen: Vec<PropertyKey> = Vec::new();
  loop {
    {
      let data = current.borrow();
      if let Some(elements) = &data.elements {
        for index in 0..elements.len() {
          if key_filter & napi_key_skip_strings == 0 {
            if key_conversion == napi_key_numbers_to_strings {
              names.push(Value::string(&index.to_string()));
            } else {
              names.push(Value::Number(index as f64));
            }
          }
        }
      }
      for (key, prop) in &data.props {
        if seen.contains(key) {
          continue;
        }
        match key {
          PropertyKey::Str(_) if key_filter & napi_key_skip_strings != 0 => continue,
          PropertyKey::Sym(_) if key_filter & napi_key_skip_symbols != 0 => continue,
          _ => {}
        }
        if key_filter & napi_key_writable != 0 && !prop.writable() {
          continue;
        }
        if key_filter & napi_key_enumerable != 0 && !prop.enumerable() {
          continue;
        }
        if key_filter & napi_key_configurable != 0 && !prop.configurable() {
          continue;
        }
        seen.push(key.clone());
        match key {
          PropertyKey::Str(s) => names.push(Value::String(s.clone())),
          PropertyKey::Sym(s) => names.push(Value::Symbol(s.clone())),
        }
      }
      if key_mode == napi_key_own_only {
        break;
      }
      match data.proto.clone() {
        Some(proto) => {
          drop(data);
          current = proto;
        }
        None => break,
      }
    }
  }
  let array = ObjectData::new_array(0);
  array.borrow_mut().elements = Some(names);
  let id = env.alloc(Value::Object(array))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_object_freeze(env: napi_env, object: napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let object = env.get(object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let mut data = obj.borrow_mut();
  data.frozen = true;
  data.sealed = true;
  Ok(())
}

#[napi_sym]
fn napi_object_seal(env: napi_env, object: napi_value) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  let object = env.get(object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  obj.borrow_mut().sealed = true;
  Ok(())
}

#[napi_sym]
fn napi_strict_equals(
  env: napi_env,
  lhs: napi_value,
  rhs: napi_value,
  result: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let lhs = env.get(lhs)?;
  let rhs = env.get(rhs)?;
  unsafe { *result = lhs.strict_equals(&rhs) };
  Ok(())
}

#[napi_sym]
fn napi_type_tag_object(env: napi_env, object: napi_value, type_tag: *const napi_type_tag) -> Result {
  let env = check_env!(env);
  check_arg!(type_tag);
  let object = env.get(object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let mut data = obj.borrow_mut();
  if data.type_tag.is_some() {
    return Err(Error::InvalidArg);
  }
  data.type_tag = Some(unsafe { *type_tag });
  Ok(())
}

#[napi_sym]
fn napi_check_object_type_tag(
  env: napi_env,
  object: napi_value,
  type_tag: *const napi_type_tag,
  result: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_arg!(type_tag);
  check_arg!(result);
  let object = env.get(object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let matches = obj.borrow().type_tag == Some(unsafe { *type_tag });
  unsafe { *result = matches };
  Ok(())
}

// --- arrays ---

#[napi_sym]
fn napi_create_array(env: napi_env, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::Object(ObjectData::new_array(0)))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_array_with_length(env: napi_env, length: usize, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::Object(ObjectData::new_array(length)))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_is_array(env: napi_env, value: napi_value, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(value)?;
  let is_array = value
    .as_object()
    .is_some_and(|obj| obj.borrow().is_array());
  unsafe { *result = is_array };
  Ok(())
}

#[napi_sym]
fn napi_get_array_length(env: napi_env, value: napi_value, result: *mut u32) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(value)?;
  let obj = value.as_object().ok_or(Error::ArrayExpected)?;
  let data = obj.borrow();
  let elements = data.elements.as_ref().ok_or(Error::ArrayExpected)?;
  unsafe { *result = elements.len() as u32 };
  Ok(())
}

// --- functions, callbacks, classes ---

#[napi_sym]
fn napi_create_function(
  env: napi_env,
  utf8name: *const c_char,
  length: usize,
  cb: napi_callback,
  data: *mut c_void,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let name = if utf8name.is_null() {
    String::new()
  } else {
    unsafe { util::read_utf8(utf8name, length)? }
  };
  let function = ObjectData::new_function(CallableData {
    name,
    callback: cb,
    data,
    class_prototype: None,
  });
  let id = env.alloc(Value::Object(function))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_call_function(
  env: napi_env,
  recv: napi_value,
  func: napi_value,
  argc: usize,
  argv: *const napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
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

#[napi_sym]
fn napi_new_instance(
  env: napi_env,
  constructor: napi_value,
  argc: usize,
  argv: *const napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  if argc > 0 {
    check_arg!(argv);
  }
  let constructor = env.get(constructor)?;
  let mut args = Vec::with_capacity(argc);
  for index in 0..argc {
    let raw = unsafe { *argv.add(index) };
    args.push(env.get(raw)?);
  }
  let instance = callback::construct_instance(env.id, &constructor, &args)?;
  let id = env.alloc(instance)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

/// Preserved short-circuit: any non-null object "is an instance" of any
/// function. Real prototype-chain walking is out of scope.
#[napi_sym]
fn napi_instanceof(
  env: napi_env,
  object: napi_value,
  constructor: napi_value,
  result: *mut bool,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  let constructor = env.get(constructor)?;
  if constructor.type_of() != napi_function {
    return Err(Error::FunctionExpected);
  }
  let object = env.get(object)?;
  unsafe { *result = object.is_object_like() };
  Ok(())
}

#[napi_sym]
fn napi_get_cb_info(
  env: napi_env,
  cbinfo: napi_callback_info,
  argc: *mut usize,
  argv: *mut napi_value,
  this_arg: *mut napi_value,
  data: *mut *mut c_void,
) -> Result {
  let _env = check_env!(env);
  check_arg!(cbinfo);
  let info = unsafe { CallbackInfo::from_raw(cbinfo) }.ok_or(Error::InvalidArg)?;
  if !argv.is_null() {
    check_arg!(argc);
    let capacity = unsafe { *argc };
    for index in 0..capacity {
      let id = info.args.get(index).copied().unwrap_or(ID_UNDEFINED);
      unsafe { *argv.add(index) = value_to_raw(id) };
    }
  }
  unsafe {
    util::write_out(argc, info.args.len());
    util::write_out(this_arg, value_to_raw(info.this));
    util::write_out(data, info.data);
  }
  Ok(())
}

#[napi_sym]
fn napi_get_new_target(
  env: napi_env,
  cbinfo: napi_callback_info,
  result: *mut napi_value,
) -> Result {
  let _env = check_env!(env);
  check_arg!(cbinfo);
  check_arg!(result);
  let info = unsafe { CallbackInfo::from_raw(cbinfo) }.ok_or(Error::InvalidArg)?;
  unsafe {
    *result = if info.new_target == 0 {
      std::ptr::null_mut()
    } else {
      value_to_raw(info.new_target)
    };
  }
  Ok(())
}

#[napi_sym]
fn napi_define_class(
  env: napi_env,
  utf8name: *const c_char,
  length: usize,
  constructor: napi_callback,
  callback_data: *mut c_void,
  property_count: usize,
  properties: *const napi_property_descriptor,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_no_pending!(env);
  check_arg!(result);
  if property_count > 0 {
    check_arg!(properties);
  }
  let name = if utf8name.is_null() {
    String::new()
  } else {
    unsafe { util::read_utf8(utf8name, length)? }
  };

  let prototype = ObjectData::new();
  let class = ObjectData::new_function(CallableData {
    name,
    callback: constructor,
    data: callback_data,
    class_prototype: Some(prototype.clone()),
  });
  let class_value = Value::Object(class);
  let prototype_value = Value::Object(prototype);

  for index in 0..property_count {
    let descriptor = unsafe { &*properties.add(index) };
    let target = if descriptor.attributes & napi_static != 0 {
      &class_value
    } else {
      &prototype_value
    };
    apply_descriptor(env, target, descriptor)?;
  }

  let id = env.alloc(class_value)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

// --- wrap and externals ---

#[napi_sym]
fn napi_wrap(
  env: napi_env,
  js_object: napi_value,
  native_object: *mut c_void,
  finalize_cb: Option<napi_finalize>,
  finalize_hint: *mut c_void,
  result: *mut napi_ref,
) -> Result {
  let env = check_env!(env);
  let object = env.get(js_object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  {
    let mut data = obj.borrow_mut();
    if data.wrap.is_some() {
      return Err(Error::InvalidArg);
    }
    data.wrap = Some(native_object);
  }
  if let Some(finalize) = finalize_cb {
    env.with(|e| e.add_finalizer(&object, finalize, native_object, finalize_hint, true))?;
  }
  if !result.is_null() {
    if finalize_cb.is_none() {
      return Err(Error::InvalidArg);
    }
    let ref_id = env.with(|e| e.create_reference(object.clone(), 0))?;
    unsafe { *result = ref_to_raw(ref_id) };
  }
  Ok(())
}

#[napi_sym]
fn napi_unwrap(env: napi_env, js_object: napi_value, result: *mut *mut c_void) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let object = env.get(js_object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let wrap = obj.borrow().wrap.ok_or(Error::InvalidArg)?;
  unsafe { *result = wrap };
  Ok(())
}

#[napi_sym]
fn napi_remove_wrap(env: napi_env, js_object: napi_value, result: *mut *mut c_void) -> Result {
  let env = check_env!(env);
  let object = env.get(js_object)?;
  let obj = object.as_object().ok_or(Error::ObjectExpected)?;
  let wrap = obj.borrow_mut().wrap.take().ok_or(Error::InvalidArg)?;
  // The association is surrendered: the finalizer is detached, not run.
  env.with(|e| e.remove_wrap_finalizer(&object))?;
  unsafe { util::write_out(result, wrap) };
  Ok(())
}

#[napi_sym]
fn napi_create_external(
  env: napi_env,
  data: *mut c_void,
  finalize_cb: Option<napi_finalize>,
  finalize_hint: *mut c_void,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let external = Value::External(Rc::new(crate::value::ExternalData { data }));
  if let Some(finalize) = finalize_cb {
    env.with(|e| e.add_finalizer(&external, finalize, data, finalize_hint, false))?;
  }
  let id = env.alloc(external)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_get_value_external(env: napi_env, value: napi_value, result: *mut *mut c_void) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  match env.get(value)? {
    Value::External(external) => {
      unsafe { *result = external.data };
      Ok(())
    }
    _ => Err(Error::InvalidArg),
  }
}

/// Queues a finalizer onto the dispatch pump instead of running it
/// inline; it fires on the host thread at the next service point.
#[napi_sym]
fn node_api_post_finalizer(
  env: napi_env,
  finalize_cb: napi_finalize,
  finalize_data: *mut c_void,
  finalize_hint: *mut c_void,
) -> Result {
  let env = check_env!(env);
  let tx = env.with(|e| e.dispatch.clone())?;
  let _ = tx.send(crate::dispatch::DispatchItem::PostedFinalizer {
    env: env.id,
    cb: finalize_cb,
    data: crate::dispatch::SendPtr(finalize_data),
    hint: crate::dispatch::SendPtr(finalize_hint),
  });
  Ok(())
}

#[napi_sym]
fn napi_add_finalizer(
  env: napi_env,
  js_object: napi_value,
  finalize_data: *mut c_void,
  finalize_cb: napi_finalize,
  finalize_hint: *mut c_void,
  result: *mut napi_ref,
) -> Result {
  let env = check_env!(env);
  let object = env.get(js_object)?;
  if !object.is_object_like() {
    return Err(Error::ObjectExpected);
  }
  env.with(|e| e.add_finalizer(&object, finalize_cb, finalize_data, finalize_hint, false))?;
  if !result.is_null() {
    let ref_id = env.with(|e| e.create_reference(object, 0))?;
    unsafe { *result = ref_to_raw(ref_id) };
  }
  Ok(())
}

// --- references and scopes ---

#[napi_sym]
fn napi_create_reference(
  env: napi_env,
  value: napi_value,
  initial_refcount: u32,
  result: *mut napi_ref,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(value)?;
  let ref_id = env.with(|e| e.create_reference(value, initial_refcount))?;
  unsafe { *result = ref_to_raw(ref_id) };
  Ok(())
}

#[napi_sym]
fn napi_delete_reference(env: napi_env, reference: napi_ref) -> Result {
  let env = check_env!(env);
  let ref_id = ref_from_raw(reference)?;
  env.with(|e| e.delete_reference(ref_id))?
}

#[napi_sym]
fn napi_reference_ref(env: napi_env, reference: napi_ref, result: *mut u32) -> Result {
  let env = check_env!(env);
  let ref_id = ref_from_raw(reference)?;
  let count = env.with(|e| e.reference_ref(ref_id))??;
  unsafe { util::write_out(result, count) };
  Ok(())
}

#[napi_sym]
fn napi_reference_unref(env: napi_env, reference: napi_ref, result: *mut u32) -> Result {
  let env = check_env!(env);
  let ref_id = ref_from_raw(reference)?;
  let count = env.with(|e| e.reference_unref(ref_id))??;
  unsafe { util::write_out(result, count) };
  Ok(())
}

#[napi_sym]
fn napi_get_reference_value(env: napi_env, reference: napi_ref, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let ref_id = ref_from_raw(reference)?;
  let handle = env.with(|e| e.reference_value(ref_id))??;
  unsafe {
    *result = if handle == 0 {
      std::ptr::null_mut()
    } else {
      value_to_raw(handle)
    };
  }
  Ok(())
}

#[napi_sym]
fn napi_open_handle_scope(env: napi_env, result: *mut napi_handle_scope) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let depth = env.with(|e| e.store.open_scope(false))?;
  unsafe { *result = depth as napi_handle_scope };
  Ok(())
}

#[napi_sym]
fn napi_close_handle_scope(env: napi_env, scope: napi_handle_scope) -> Result {
  let env = check_env!(env);
  check_arg!(scope);
  let depth = scope as usize;
  env.with(|e| e.store.close_scope(depth, false))?
}

#[napi_sym]
fn napi_open_escapable_handle_scope(
  env: napi_env,
  result: *mut napi_escapable_handle_scope,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let depth = env.with(|e| e.store.open_scope(true))?;
  unsafe { *result = depth as napi_escapable_handle_scope };
  Ok(())
}

#[napi_sym]
fn napi_close_escapable_handle_scope(
  env: napi_env,
  scope: napi_escapable_handle_scope,
) -> Result {
  let env = check_env!(env);
  check_arg!(scope);
  let depth = scope as usize;
  env.with(|e| e.store.close_scope(depth, true))?
}

#[napi_sym]
fn napi_escape_handle(
  env: napi_env,
  scope: napi_escapable_handle_scope,
  escapee: napi_value,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(scope);
  check_arg!(result);
  let depth = scope as usize;
  let escapee = value_from_raw(escapee).ok_or(Error::InvalidArg)?;
  let id = env.with(|e| e.store.escape(depth, escapee))??;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

// --- arraybuffers, typed arrays, dataviews ---

#[napi_sym]
fn napi_is_arraybuffer(env: napi_env, value: napi_value, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(value)?;
  unsafe { *result = matches!(value, Value::ArrayBuffer(_)) };
  Ok(())
}

#[napi_sym]
fn napi_create_arraybuffer(
  env: napi_env,
  byte_length: usize,
  data: *mut *mut c_void,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let buffer = BufferData::owned(vec![0; byte_length]);
  unsafe { util::write_out(data, buffer.borrow_mut().as_ptr().cast()) };
  let id = env.alloc(Value::ArrayBuffer(buffer))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_create_external_arraybuffer(
  env: napi_env,
  external_data: *mut c_void,
  byte_length: usize,
  finalize_cb: Option<napi_finalize>,
  finalize_hint: *mut c_void,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let buffer = BufferData::external(external_data.cast(), byte_length);
  let value = Value::ArrayBuffer(buffer);
  if let Some(finalize) = finalize_cb {
    env.with(|e| e.add_finalizer(&value, finalize, external_data, finalize_hint, false))?;
  }
  let id = env.alloc(value)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_get_arraybuffer_info(
  env: napi_env,
  arraybuffer: napi_value,
  data: *mut *mut c_void,
  byte_length: *mut usize,
) -> Result {
  let env = check_env!(env);
  match env.get(arraybuffer)? {
    Value::ArrayBuffer(buffer) => {
      let mut buffer = buffer.borrow_mut();
      unsafe {
        util::write_out(data, buffer.as_ptr().cast());
        util::write_out(byte_length, buffer.len());
      }
      Ok(())
    }
    _ => Err(Error::ArrayBufferExpected),
  }
}

#[napi_sym]
fn napi_detach_arraybuffer(env: napi_env, arraybuffer: napi_value) -> Result {
  let env = check_env!(env);
  match env.get(arraybuffer)? {
    Value::ArrayBuffer(buffer) => {
      let mut buffer = buffer.borrow_mut();
      match buffer.storage {
        BufferStorage::Owned(_) | BufferStorage::Detached => {
          buffer.storage = BufferStorage::Detached;
          Ok(())
        }
        BufferStorage::External { .. } => Err(Error::DetachableArraybufferExpected),
      }
    }
    _ => Err(Error::DetachableArraybufferExpected),
  }
}

#[napi_sym]
fn napi_is_detached_arraybuffer(env: napi_env, value: napi_value, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let detached = match env.get(value)? {
    Value::ArrayBuffer(buffer) => buffer.borrow().is_detached(),
    _ => false,
  };
  unsafe { *result = detached };
  Ok(())
}

#[napi_sym]
fn napi_is_typedarray(env: napi_env, value: napi_value, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(value)?;
  unsafe { *result = matches!(value, Value::TypedArray(_)) };
  Ok(())
}

#[napi_sym]
fn napi_create_typedarray(
  env: napi_env,
  array_type: napi_typedarray_type,
  length: usize,
  arraybuffer: napi_value,
  byte_offset: usize,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  if !(napi_int8_array..=napi_biguint64_array).contains(&array_type) {
    return Err(Error::InvalidArg);
  }
  let buffer = match env.get(arraybuffer)? {
    Value::ArrayBuffer(buffer) => buffer,
    _ => return Err(Error::ArrayBufferExpected),
  };
  let element_size = TypedArrayData::element_size(array_type);
  if byte_offset % element_size != 0 {
    return Err(Error::InvalidArg);
  }
  if byte_offset + length * element_size > buffer.borrow().len() {
    return Err(Error::InvalidArg);
  }
  let view = Value::TypedArray(Rc::new(TypedArrayData {
    kind: array_type,
    buffer,
    byte_offset,
    length,
    node_buffer: false,
  }));
  let id = env.alloc(view)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_get_typedarray_info(
  env: napi_env,
  typedarray: napi_value,
  array_type: *mut napi_typedarray_type,
  length: *mut usize,
  data: *mut *mut c_void,
  arraybuffer: *mut napi_value,
  byte_offset: *mut usize,
) -> Result {
  let env = check_env!(env);
  let view = match env.get(typedarray)? {
    Value::TypedArray(view) => view,
    _ => Err(Error::InvalidArg)?,
  };
  unsafe {
    util::write_out(array_type, view.kind);
    util::write_out(length, view.length);
    util::write_out(byte_offset, view.byte_offset);
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
  if !arraybuffer.is_null() {
    let id = env.alloc(Value::ArrayBuffer(view.buffer.clone()))?;
    unsafe { *arraybuffer = value_to_raw(id) };
  }
  Ok(())
}

#[napi_sym]
fn napi_create_dataview(
  env: napi_env,
  byte_length: usize,
  arraybuffer: napi_value,
  byte_offset: usize,
  result: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let buffer = match env.get(arraybuffer)? {
    Value::ArrayBuffer(buffer) => buffer,
    _ => return Err(Error::ArrayBufferExpected),
  };
  if byte_offset + byte_length > buffer.borrow().len() {
    return Err(Error::InvalidArg);
  }
  let view = Value::DataView(Rc::new(DataViewData {
    buffer,
    byte_offset,
    byte_length,
  }));
  let id = env.alloc(view)?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_is_dataview(env: napi_env, value: napi_value, result: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let value = env.get(value)?;
  unsafe { *result = matches!(value, Value::DataView(_)) };
  Ok(())
}

#[napi_sym]
fn napi_get_dataview_info(
  env: napi_env,
  dataview: napi_value,
  byte_length: *mut usize,
  data: *mut *mut c_void,
  arraybuffer: *mut napi_value,
  byte_offset: *mut usize,
) -> Result {
  let env = check_env!(env);
  let view = match env.get(dataview)? {
    Value::DataView(view) => view,
    _ => Err(Error::InvalidArg)?,
  };
  unsafe {
    util::write_out(byte_length, view.byte_length);
    util::write_out(byte_offset, view.byte_offset);
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
  if !arraybuffer.is_null() {
    let id = env.alloc(Value::ArrayBuffer(view.buffer.clone()))?;
    unsafe { *arraybuffer = value_to_raw(id) };
  }
  Ok(())
}

// --- promises, dates, misc ---

#[napi_sym]
fn napi_create_promise(
  env: napi_env,
  deferred: *mut napi_deferred,
  promise: *mut napi_value,
) -> Result {
  let env = check_env!(env);
  check_arg!(deferred);
  check_arg!(promise);
  let state = Rc::new(std::cell::RefCell::new(PromiseState::Pending));
  let slot = env.with(|e| {
    e.deferreds.push(DeferredSlot {
      promise: state.clone(),
      settled: false,
    });
    e.deferreds.len() - 1
  })?;
  let id = env.alloc(Value::Promise(state))?;
  unsafe {
    *deferred = (slot + 1) as napi_deferred;
    *promise = value_to_raw(id);
  }
  Ok(())
}

fn settle_deferred(
  env: EnvRef,
  deferred: napi_deferred,
  resolution: napi_value,
  reject: bool,
) -> Result {
  if deferred.is_null() {
    return Err(Error::InvalidArg);
  }
  let slot = deferred as usize - 1;
  let resolution = env.get(resolution)?;
  env.with(|e| {
    let entry = e.deferreds.get_mut(slot).ok_or(Error::InvalidArg)?;
    if entry.settled {
      return Err(Error::InvalidArg);
    }
    entry.settled = true;
    *entry.promise.borrow_mut() = if reject {
      PromiseState::Rejected(resolution)
    } else {
      PromiseState::Fulfilled(resolution)
    };
    Ok(())
  })?
}

#[napi_sym]
fn napi_resolve_deferred(env: napi_env, deferred: napi_deferred, resolution: napi_value) -> Result {
  let env = check_env!(env);
  settle_deferred(env, deferred, resolution, false)
}

#[napi_sym]
fn napi_reject_deferred(env: napi_env, deferred: napi_deferred, rejection: napi_value) -> Result {
  let env = check_env!(env);
  settle_deferred(env, deferred, rejection, true)
}

#[napi_sym]
fn napi_is_promise(env: napi_env, value: napi_value, is_promise: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(is_promise);
  let value = env.get(value)?;
  unsafe { *is_promise = matches!(value, Value::Promise(_)) };
  Ok(())
}

#[napi_sym]
fn napi_create_date(env: napi_env, time: f64, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  let id = env.alloc(Value::Date(time))?;
  unsafe { *result = value_to_raw(id) };
  Ok(())
}

#[napi_sym]
fn napi_is_date(env: napi_env, value: napi_value, is_date: *mut bool) -> Result {
  let env = check_env!(env);
  check_arg!(is_date);
  let value = env.get(value)?;
  unsafe { *is_date = matches!(value, Value::Date(_)) };
  Ok(())
}

#[napi_sym]
fn napi_get_date_value(env: napi_env, value: napi_value, result: *mut f64) -> Result {
  let env = check_env!(env);
  check_arg!(result);
  match env.get(value)? {
    Value::Date(time) => {
      unsafe { *result = time };
      Ok(())
    }
    _ => Err(Error::DateExpected),
  }
}

/// There is no script engine behind this runtime.
#[napi_sym]
fn napi_run_script(env: napi_env, script: napi_value, result: *mut napi_value) -> Result {
  let env = check_env!(env);
  let _ = env.get(script)?;
  let _ = result;
  Err(Error::GenericFailure)
}

#[napi_sym]
fn napi_get_version(env: napi_env, result: *mut u32) -> Result {
  let _env = check_env!(env);
  check_arg!(result);
  unsafe { *result = NAPI_VERSION };
  Ok(())
}

#[napi_sym]
fn napi_adjust_external_memory(env: napi_env, change_in_bytes: i64, adjusted_value: *mut i64) -> Result {
  let env = check_env!(env);
  check_arg!(adjusted_value);
  let total = env.with(|e| {
    e.external_memory += change_in_bytes;
    e.external_memory
  })?;
  unsafe { *adjusted_value = total };
  Ok(())
}

#[napi_sym]
fn napi_set_instance_data(
  env: napi_env,
  data: *mut c_void,
  finalize_cb: Option<napi_finalize>,
  finalize_hint: *mut c_void,
) -> Result {
  let env = check_env!(env);
  let previous = env.with(|e| {
    e.instance_data.replace(crate::env::InstanceData {
      data,
      finalize_cb,
      finalize_hint,
    })
  })?;
  // Replacing instance data finalizes the old payload right away.
  if let Some(previous) = previous {
    if let Some(finalize) = previous.finalize_cb {
      unsafe { finalize(env.raw, previous.data, previous.finalize_hint) };
    }
  }
  Ok(())
}

#[napi_sym]
fn napi_get_instance_data(env: napi_env, data: *mut *mut c_void) -> Result {
  let env = check_env!(env);
  check_arg!(data);
  let stored = env.with(|e| e.instance_data.as_ref().map(|d| d.data))?;
  unsafe { *data = stored.unwrap_or(std::ptr::null_mut()) };
  Ok(())
}
