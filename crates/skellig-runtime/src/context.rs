//! Process-wide context: the environment registry and the raw-handle
//! encodings.
//!
//! Environments are owned by the thread that created them (the host
//! thread); the registry is thread-local, so an ABI call arriving on a
//! worker thread simply fails to resolve its `napi_env` instead of racing.
//! The only cross-thread surfaces, TSFN queues and async-work records,
//! carry their own synchronized state and never consult this registry off
//! the host thread.

use skellig_abi::{napi_env, napi_status, napi_value, Error};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::env::{Env, EnvId};
use crate::handles::HandleId;

thread_local! {
    static ENVS: RefCell<HashMap<EnvId, Rc<RefCell<Env>>>> = RefCell::new(HashMap::new());
    static NEXT_ENV: RefCell<EnvId> = const { RefCell::new(1) };
}

/// `napi_env` encoding: the environment ID plus one, so a null pointer is
/// never a valid environment.
pub fn env_to_raw(id: EnvId) -> napi_env {
    (id + 1) as napi_env
}

pub fn env_from_raw(raw: napi_env) -> Option<EnvId> {
    if raw.is_null() {
        return None;
    }
    Some(raw as usize - 1)
}

/// `napi_value` encoding: the handle ID itself. Zero (the null pointer)
/// is the empty handle.
pub fn value_to_raw(id: HandleId) -> napi_value {
    id as napi_value
}

pub fn value_from_raw(raw: napi_value) -> Option<HandleId> {
    if raw.is_null() {
        None
    } else {
        Some(raw as usize)
    }
}

pub fn register_env(make: impl FnOnce(EnvId, napi_env) -> Env) -> EnvId {
    let id = NEXT_ENV.with(|n| {
        let mut n = n.borrow_mut();
        let id = *n;
        *n += 1;
        id
    });
    let env = make(id, env_to_raw(id));
    ENVS.with(|envs| envs.borrow_mut().insert(id, Rc::new(RefCell::new(env))));
    id
}

pub fn unregister_env(id: EnvId) -> bool {
    ENVS.with(|envs| envs.borrow_mut().remove(&id)).is_some()
}

pub fn env_exists(id: EnvId) -> bool {
    ENVS.with(|envs| envs.borrow().contains_key(&id))
}

/// Runs `f` with exclusive access to the environment.
///
/// The environment cell is borrowed only for the duration of `f`; callers
/// that re-enter native code must do so *between* `with_env` calls, never
/// inside one.
pub fn with_env<R>(id: EnvId, f: impl FnOnce(&mut Env) -> R) -> Result<R, Error> {
    let cell = ENVS
        .with(|envs| envs.borrow().get(&id).cloned())
        .ok_or(Error::InvalidArg)?;
    let mut env = cell.borrow_mut();
    Ok(f(&mut env))
}

/// Entry-point preamble: resolve the environment and clear its last-error
/// record. Returns `None` for an unknown environment (including calls
/// arriving on a non-host thread).
pub fn enter(raw: napi_env) -> Option<EnvId> {
    let id = env_from_raw(raw)?;
    with_env(id, |env| env.last_error.clear()).ok()?;
    Some(id)
}

/// Entry-point epilogue: record the outcome in `last_error` and convert it
/// to a status code.
pub fn seal(id: EnvId, result: skellig_abi::Result) -> napi_status {
    match result {
        Ok(()) => skellig_abi::napi_ok,
        Err(error) => {
            let status: napi_status = error.into();
            let _ = with_env(id, |env| env.last_error.set(status, None));
            status
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::workers::WorkerPool;

    /// `Env` retains a pool handle clone, and `WorkerPool::drop` joins its
    /// worker threads, so the pool and dispatcher must outlive the
    /// environment and the caller must `unregister_env` before they drop
    /// (mirrors the teardown order in `Runtime::drop`).
    fn new_env() -> (EnvId, WorkerPool, Dispatcher) {
        let dispatcher = Dispatcher::new();
        let pool = WorkerPool::new(1);
        let id =
            register_env(|id, raw| Env::new(id, raw, "ctx-test.node", dispatcher.sender(), pool.handle()));
        (id, pool, dispatcher)
    }

    #[test]
    fn test_env_raw_round_trip() {
        let (id, _pool, _dispatcher) = new_env();
        let raw = env_to_raw(id);
        assert!(!raw.is_null());
        assert_eq!(env_from_raw(raw), Some(id));
        assert!(unregister_env(id));
    }

    #[test]
    fn test_unknown_env_does_not_resolve() {
        assert!(env_from_raw(std::ptr::null_mut()).is_none());
        assert!(with_env(998_877, |_| ()).is_err());
    }

    #[test]
    fn test_seal_records_last_error() {
        let (id, _pool, _dispatcher) = new_env();
        let status = seal(id, Err(Error::HandleScopeMismatch));
        assert_eq!(status, skellig_abi::napi_handle_scope_mismatch);
        let recorded = with_env(id, |env| env.last_error.status()).unwrap();
        assert_eq!(recorded, status);
        assert!(unregister_env(id));
    }

    #[test]
    fn test_value_raw_round_trip() {
        assert_eq!(value_from_raw(std::ptr::null_mut()), None);
        let raw = value_to_raw(7);
        assert_eq!(value_from_raw(raw), Some(7));
    }
}
