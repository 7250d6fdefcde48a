//! Entry-point plumbing shared by the ABI surface implementations.

use skellig_abi::{napi_env, napi_value, Error, NAPI_AUTO_LENGTH};
use std::os::raw::c_char;

use crate::context;
use crate::env::{Env, EnvId};
use crate::handles::HandleId;
use crate::value::Value;

/// Wraps an ABI implementation in the standard entry preamble: resolve the
/// environment, clear its last-error record, run the body, convert the
/// outcome into a status code and mirror it into `last_error`.
///
/// The wrapped function must take `env: napi_env` first and return
/// `skellig_abi::Result`.
#[macro_export]
macro_rules! napi_wrap {
  (
    $(#[$attr:meta])*
    fn $name:ident( $env:ident : napi_env $(, $arg:ident : $ty:ty)* $(,)? ) -> $ret:ty $body:block
  ) => {
    $(#[$attr])*
    #[allow(clippy::not_unsafe_ptr_arg_deref)]
    pub unsafe extern "C" fn $name(
      $env: skellig_abi::napi_env
      $(, $arg: $ty)*
    ) -> skellig_abi::napi_status {
      let Some(__env_id) = $crate::context::enter($env) else {
        return skellig_abi::napi_invalid_arg;
      };
      let __result: skellig_abi::Result = (|| -> skellig_abi::Result { $body })();
      $crate::context::seal(__env_id, __result)
    }
  };
}

/// Resolve a raw `napi_env` into an [`EnvRef`], failing with
/// `invalid_arg`.
#[macro_export]
macro_rules! check_env {
  ($env:expr) => {
    $crate::napi::util::EnvRef::resolve($env)?
  };
}

/// Reject null out-pointers and required arguments.
#[macro_export]
macro_rules! check_arg {
  ($ptr:expr) => {
    if $ptr.is_null() {
      return Err(skellig_abi::Error::InvalidArg);
    }
  };
}

/// Script-running entry points short-circuit while an exception is
/// pending; pure queries skip this check.
#[macro_export]
macro_rules! check_no_pending {
  ($env:expr) => {
    if $env.has_pending()? {
      return Err(skellig_abi::Error::PendingException);
    }
  };
}

/// A resolved environment: a copyable ticket for short-scoped borrows.
/// Never hold a borrow across a call back into native code; every method
/// here opens and closes its own.
#[derive(Copy, Clone)]
pub struct EnvRef {
  pub id: EnvId,
  pub raw: napi_env,
}

impl EnvRef {
  pub fn resolve(raw: napi_env) -> Result<Self, Error> {
    let id = context::env_from_raw(raw).ok_or(Error::InvalidArg)?;
    if !context::env_exists(id) {
      return Err(Error::InvalidArg);
    }
    Ok(Self { id, raw })
  }

  pub fn with<R>(&self, f: impl FnOnce(&mut Env) -> R) -> Result<R, Error> {
    context::with_env(self.id, f)
  }

  /// Allocate a handle in the innermost open scope.
  pub fn alloc(&self, value: Value) -> Result<HandleId, Error> {
    self.with(|env| env.store.alloc_scoped(value))?
  }

  /// Resolve a raw `napi_value`; the empty handle is an invalid argument.
  pub fn get(&self, raw: napi_value) -> Result<Value, Error> {
    let id = context::value_from_raw(raw).ok_or(Error::InvalidArg)?;
    self.with(|env| env.get_value(id))?
  }

  pub fn has_pending(&self) -> Result<bool, Error> {
    self.with(|env| env.has_exception())
  }

  pub fn throw(&self, value: Value) -> Result<(), Error> {
    self.with(|env| env.set_exception(value))
  }
}

/// Reads a native UTF-8 string argument. `NAPI_AUTO_LENGTH` means
/// NUL-terminated; invalid bytes are replaced rather than rejected.
///
/// # Safety
/// `ptr` must be readable for `len` bytes (or NUL-terminated when `len`
/// is `NAPI_AUTO_LENGTH`).
pub unsafe fn read_utf8(ptr: *const c_char, len: usize) -> Result<String, Error> {
  if ptr.is_null() {
    return Err(Error::InvalidArg);
  }
  let bytes = if len == NAPI_AUTO_LENGTH {
    unsafe { std::ffi::CStr::from_ptr(ptr) }.to_bytes()
  } else {
    unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }
  };
  Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Reads a UTF-16 string argument with the same length convention.
///
/// # Safety
/// `ptr` must be readable for `len` u16 units (or NUL-terminated when
/// `len` is `NAPI_AUTO_LENGTH`).
pub unsafe fn read_utf16(ptr: *const u16, len: usize) -> Result<String, Error> {
  if ptr.is_null() {
    return Err(Error::InvalidArg);
  }
  let units = if len == NAPI_AUTO_LENGTH {
    let mut end = 0;
    while unsafe { *ptr.add(end) } != 0 {
      end += 1;
    }
    unsafe { std::slice::from_raw_parts(ptr, end) }
  } else {
    unsafe { std::slice::from_raw_parts(ptr, len) }
  };
  Ok(String::from_utf16_lossy(units))
}

/// Copies a string into a caller buffer with the NAPI length protocol:
/// null buffer queries the total length, otherwise up to `bufsize - 1`
/// bytes are copied (truncated at a character boundary), NUL-terminated,
/// and the copied length reported.
///
/// # Safety
/// `buf`, when non-null, must be writable for `bufsize` bytes; `result`,
/// when non-null, must be writable.
pub unsafe fn copy_utf8(
  s: &str,
  buf: *mut c_char,
  bufsize: usize,
  result: *mut usize,
) -> Result<(), Error> {
  if buf.is_null() {
    if result.is_null() {
      return Err(Error::InvalidArg);
    }
    unsafe { *result = s.len() };
    return Ok(());
  }
  if bufsize == 0 {
    if !result.is_null() {
      unsafe { *result = 0 };
    }
    return Ok(());
  }
  let capacity = bufsize - 1;
  let mut end = s.len().min(capacity);
  while end > 0 && !s.is_char_boundary(end) {
    end -= 1;
  }
  unsafe {
    std::ptr::copy_nonoverlapping(s.as_ptr(), buf.cast::<u8>(), end);
    *buf.add(end) = 0;
  }
  if !result.is_null() {
    unsafe { *result = end };
  }
  Ok(())
}

/// UTF-16 flavor of [`copy_utf8`]; lengths are in u16 units.
///
/// # Safety
/// `buf`, when non-null, must be writable for `bufsize` units; `result`,
/// when non-null, must be writable.
pub unsafe fn copy_utf16(
  s: &str,
  buf: *mut u16,
  bufsize: usize,
  result: *mut usize,
) -> Result<(), Error> {
  let units: Vec<u16> = s.encode_utf16().collect();
  if buf.is_null() {
    if result.is_null() {
      return Err(Error::InvalidArg);
    }
    unsafe { *result = units.len() };
    return Ok(());
  }
  if bufsize == 0 {
    if !result.is_null() {
      unsafe { *result = 0 };
    }
    return Ok(());
  }
  let end = units.len().min(bufsize - 1);
  unsafe {
    std::ptr::copy_nonoverlapping(units.as_ptr(), buf, end);
    *buf.add(end) = 0;
  }
  if !result.is_null() {
    unsafe { *result = end };
  }
  Ok(())
}

/// Writes through an optional out-pointer.
///
/// # Safety
/// `ptr`, when non-null, must be valid for writes of `T`.
pub unsafe fn write_out<T>(ptr: *mut T, value: T) {
  if !ptr.is_null() {
    unsafe { *ptr = value };
  }
}

pub fn expect_number(value: &Value) -> Result<f64, Error> {
  match value {
    Value::Number(n) | Value::Date(n) => Ok(*n),
    _ => Err(Error::NumberExpected),
  }
}

pub fn expect_string(value: &Value) -> Result<std::rc::Rc<str>, Error> {
  match value {
    Value::String(s) => Ok(s.clone()),
    _ => Err(Error::StringExpected),
  }
}

pub fn expect_bool(value: &Value) -> Result<bool, Error> {
  match value {
    Value::Bool(b) => Ok(*b),
    _ => Err(Error::BooleanExpected),
  }
}

pub fn expect_bigint(value: &Value) -> Result<i128, Error> {
  match value {
    Value::BigInt(n) => Ok(*n),
    _ => Err(Error::BigIntExpected),
  }
}
