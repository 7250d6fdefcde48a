//! The host-facing runtime: environment lifecycle, add-on registration,
//! export invocation and the dispatch pump.

use serde::{Deserialize, Serialize};
use skellig_abi::{napi_env, napi_finalize, napi_value, Error, NapiFunctions};
use std::collections::HashMap;
use std::os::raw::c_void;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::callback;
use crate::context::{self, env_to_raw, value_to_raw, with_env};
use crate::dispatch::{DispatchItem, Dispatcher};
use crate::env::{Env, EnvId};
use crate::error::{ExceptionKind, HostException, RuntimeError};
use crate::handles::HandleId;
use crate::value::{PromiseState, PropertyKey, Value};
use crate::workers::WorkerPool;

/// Runtime configuration options.
///
/// Serde-derived so embedders can keep them in a JSON config file next to
/// their add-on manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Worker threads backing async-work execute callbacks.
    pub worker_threads: usize,
    /// Whether `napi_fatal_error` aborts the process (Node parity) or
    /// logs and returns.
    pub abort_on_fatal: bool,
    /// Upper bound for [`Runtime::await_promise`] before giving up on a
    /// promise that nothing will settle.
    pub await_timeout_ms: u64,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            abort_on_fatal: false,
            await_timeout_ms: 5000,
        }
    }
}

impl RuntimeOptions {
    /// Load options from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let text = std::fs::read_to_string(path).map_err(|source| RuntimeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| RuntimeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    #[must_use]
    pub fn with_abort_on_fatal(mut self, abort: bool) -> Self {
        self.abort_on_fatal = abort;
        self
    }
}

/// The registration context handed to the shared-library loader: the
/// opaque environment handle plus the pre-created exports object.
#[derive(Clone, Copy)]
pub struct RegistrationContext {
    pub env: napi_env,
    pub exports: napi_value,
}

struct Registration {
    scope_depth: usize,
    exports: HandleId,
}

static TABLE: OnceLock<&'static NapiFunctions> = OnceLock::new();

/// The host runtime. Owns the worker pool and the dispatch queue; all
/// methods must be called on the thread that created it.
pub struct Runtime {
    options: RuntimeOptions,
    dispatcher: Dispatcher,
    pool: WorkerPool,
    envs: Vec<EnvId>,
    registrations: HashMap<EnvId, Registration>,
}

impl Runtime {
    /// Builds the function table, installs it into the shim and starts
    /// the worker pool.
    pub fn new(options: RuntimeOptions) -> Self {
        let table = TABLE.get_or_init(|| Box::leak(Box::new(crate::napi::function_table())));
        skellig_shim::skellig_set_functions(std::ptr::from_ref(*table));
        crate::napi::node_api::ABORT_ON_FATAL.store(options.abort_on_fatal, Ordering::SeqCst);
        let pool = WorkerPool::new(options.worker_threads);
        Self {
            options,
            dispatcher: Dispatcher::new(),
            pool,
            envs: Vec::new(),
            registrations: HashMap::new(),
        }
    }

    /// Creates an environment for one add-on and opens its registration
    /// scope with a fresh exports object.
    pub fn create_env(&mut self, name: &str) -> EnvId {
        let sender = self.dispatcher.sender();
        let pool = self.pool.handle();
        let id = context::register_env(|id, raw| Env::new(id, raw, name, sender, pool));
        let registration = with_env(id, |env| {
            let scope_depth = env.store.open_scope(false);
            let exports = env
                .store
                .alloc_scoped(Value::object())
                .expect("registration scope was just opened");
            Registration {
                scope_depth,
                exports,
            }
        })
        .expect("environment was just registered");
        self.registrations.insert(id, registration);
        self.envs.push(id);
        log::debug!("environment {id} created for {name}");
        id
    }

    /// The opaque handles handed to `napi_register_module_v1`.
    pub fn registration(&self, env: EnvId) -> Result<RegistrationContext, RuntimeError> {
        let registration = self.registrations.get(&env).ok_or(RuntimeError::UnknownEnv)?;
        Ok(RegistrationContext {
            env: env_to_raw(env),
            exports: value_to_raw(registration.exports),
        })
    }

    /// Completes registration with the value the entry point returned
    /// (which may be the original exports handle), pins the exports and
    /// closes the registration scope.
    pub fn complete_registration(
        &mut self,
        env: EnvId,
        returned: napi_value,
    ) -> Result<(), RuntimeError> {
        let registration = self
            .registrations
            .remove(&env)
            .ok_or(RuntimeError::UnknownEnv)?;
        if let Some(exception) = with_env(env, Env::take_exception).map_err(abi_error)? {
            let _ = with_env(env, |e| {
                let _ = e.store.close_scope(registration.scope_depth, false);
            });
            return Err(RuntimeError::Exception(exception_to_host(&exception)));
        }
        let exports_id = context::value_from_raw(returned).unwrap_or(registration.exports);
        with_env(env, |e| -> Result<(), Error> {
            let value = e.get_value(exports_id)?;
            let pinned = e.store.alloc_pinned(value);
            e.exports = Some(pinned);
            e.store.close_scope(registration.scope_depth, false)
        })
        .map_err(abi_error)?
        .map_err(abi_error)?;
        Ok(())
    }

    /// The raw `napi_env` of a live environment, for handing to native
    /// code outside the registration path.
    pub fn raw_env(&self, env: EnvId) -> napi_env {
        env_to_raw(env)
    }

    /// Resolves a raw handle produced by native code into its host value.
    pub fn value_of(&self, env: EnvId, value: napi_value) -> Result<Value, RuntimeError> {
        let id = context::value_from_raw(value).ok_or_else(|| abi_error(Error::InvalidArg))?;
        with_env(env, |e| e.get_value(id))
            .map_err(abi_error)?
            .map_err(abi_error)
    }

    /// The pinned exports of a registered add-on.
    pub fn exports(&self, env: EnvId) -> Result<Value, RuntimeError> {
        with_env(env, |e| {
            e.exports.and_then(|id| e.store.get_cloned(id))
        })
        .map_err(abi_error)?
        .ok_or(RuntimeError::NoExports)
    }

    /// Reads a property of an exported object from the host side.
    pub fn get_named(
        &self,
        env: EnvId,
        object: &Value,
        name: &str,
    ) -> Result<Value, RuntimeError> {
        callback::get_property_value(env, object, &PropertyKey::str(name))
            .map_err(|error| self.surface(env, error))
    }

    /// Calls a host-callable value through the trampoline. A pending
    /// exception left by the callback surfaces as
    /// [`RuntimeError::Exception`].
    pub fn call(
        &self,
        env: EnvId,
        func: &Value,
        this: Value,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        callback::invoke_callable(env, func, this, args, None)
            .map_err(|error| self.surface(env, error))
    }

    /// Constructs an instance through the `new` protocol.
    pub fn construct(
        &self,
        env: EnvId,
        constructor: &Value,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        callback::construct_instance(env, constructor, args)
            .map_err(|error| self.surface(env, error))
    }

    /// Services queued TSFN wake-ups, async completions and posted
    /// finalizers, then sweeps for due finalizers. Returns whether any
    /// work ran.
    pub fn pump(&mut self) -> bool {
        let mut ran = false;
        while let Some(item) = self.dispatcher.try_next() {
            self.handle_item(item);
            ran = true;
        }
        for env in self.envs.clone() {
            ran |= self.collect(env) > 0;
        }
        ran
    }

    /// Runs one collection sweep: finalizer records whose targets are
    /// gone fire exactly once. Returns how many ran.
    pub fn collect(&mut self, env: EnvId) -> usize {
        let mut total = 0;
        loop {
            let due = match with_env(env, Env::take_due_finalizers) {
                Ok(due) => due,
                Err(_) => return total,
            };
            if due.is_empty() {
                return total;
            }
            for record in due {
                run_finalizer(env, record.cb, record.data, record.hint);
                total += 1;
            }
        }
    }

    /// Pumps the dispatch queue until the promise settles.
    pub fn await_promise(&mut self, env: EnvId, promise: &Value) -> Result<Value, RuntimeError> {
        if !context::env_exists(env) {
            return Err(RuntimeError::UnknownEnv);
        }
        let state = match promise {
            Value::Promise(state) => state.clone(),
            _ => return Err(RuntimeError::NotAPromise),
        };
        let deadline = Instant::now() + Duration::from_millis(self.options.await_timeout_ms);
        loop {
            let settled = state.borrow().clone();
            match settled {
                PromiseState::Fulfilled(value) => return Ok(value),
                PromiseState::Rejected(value) => {
                    return Err(RuntimeError::Exception(exception_to_host(&value)));
                }
                PromiseState::Pending => {}
            }
            if self.pump() {
                continue;
            }
            match self.dispatcher.next_timeout(Duration::from_millis(25)) {
                Some(item) => self.handle_item(item),
                None => {
                    if Instant::now() > deadline {
                        return Err(RuntimeError::PromisePending);
                    }
                }
            }
        }
    }

    /// Exceptions nothing could observe (TSFN callbacks, fatal
    /// exceptions), in arrival order.
    pub fn take_uncaught(&mut self, env: EnvId) -> Vec<HostException> {
        with_env(env, |e| std::mem::take(&mut e.uncaught))
            .map(|values| values.iter().map(exception_to_host).collect())
            .unwrap_or_default()
    }

    /// Tears the environment down: async and sync cleanup hooks LIFO,
    /// TSFN close-out, outstanding finalizers LIFO, instance data last.
    pub fn destroy_env(&mut self, env: EnvId) -> Result<(), RuntimeError> {
        if with_env(env, |e| {
            std::mem::replace(&mut e.teardown_started, true)
        })
        .map_err(abi_error)?
        {
            return Ok(());
        }
        log::debug!("environment {env} tearing down");
        self.pump();

        loop {
            let hook = match with_env(env, |e| e.async_cleanup_hooks.pop()) {
                Ok(Some(hook)) => hook,
                _ => break,
            };
            if let Some(callback) = hook.hook {
                unsafe { callback(hook.handle, hook.arg) };
            }
        }

        loop {
            let hook = match with_env(env, |e| e.cleanup_hooks.pop()) {
                Ok(Some(hook)) => hook,
                _ => break,
            };
            if let Some(callback) = hook.hook {
                unsafe { callback(hook.arg) };
            }
        }

        let tsfns = with_env(env, |e| std::mem::take(&mut e.tsfns)).unwrap_or_default();
        for tsfn in &tsfns {
            tsfn.abort_for_teardown();
        }
        drop(tsfns);

        let finalizers = with_env(env, Env::take_all_finalizers).unwrap_or_default();
        for record in finalizers {
            run_finalizer(env, record.cb, record.data, record.hint);
        }

        if let Ok(Some(instance)) = with_env(env, |e| e.instance_data.take()) {
            if let Some(finalize) = instance.finalize_cb {
                unsafe { finalize(env_to_raw(env), instance.data, instance.finalize_hint) };
            }
        }

        context::unregister_env(env);
        self.envs.retain(|&id| id != env);
        self.registrations.remove(&env);
        Ok(())
    }

    fn handle_item(&mut self, item: DispatchItem) {
        match item {
            DispatchItem::TsfnWake(tsfn) => tsfn.drain(),
            DispatchItem::AsyncComplete { work, status } => work.complete(status),
            DispatchItem::PostedFinalizer { env, cb, data, hint } => {
                run_finalizer(env, cb, data.0, hint.0);
            }
        }
    }

    /// Converts an ABI-layer error into the host-facing form, draining
    /// the pending exception when that is what the error reports.
    fn surface(&self, env: EnvId, error: Error) -> RuntimeError {
        if error == Error::PendingException {
            if let Ok(Some(exception)) = with_env(env, Env::take_exception) {
                return RuntimeError::Exception(exception_to_host(&exception));
            }
        }
        abi_error(error)
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // Environments hold pool handles; tear them down before the pool
        // joins its workers.
        for env in self.envs.clone() {
            let _ = self.destroy_env(env);
        }
    }
}

fn abi_error(error: Error) -> RuntimeError {
    RuntimeError::Status(error.into())
}

fn run_finalizer(env: EnvId, cb: napi_finalize, data: *mut c_void, hint: *mut c_void) {
    let depth = with_env(env, |e| e.store.open_scope(false)).ok();
    unsafe { cb(env_to_raw(env), data, hint) };
    if let Some(depth) = depth {
        let _ = with_env(env, |e| {
            if let Some(exception) = e.take_exception() {
                e.uncaught.push(exception);
            }
            let _ = e.store.close_scope(depth, false);
        });
    }
}

/// Builds the structured host exception from a thrown value.
fn exception_to_host(value: &Value) -> HostException {
    if let Some(obj) = value.as_object() {
        let data = obj.borrow();
        if let Some(kind) = data.error_kind {
            let message = data
                .props
                .get(&PropertyKey::str("message"))
                .and_then(|prop| match &prop.slot {
                    crate::value::PropertySlot::Value(v) => v.as_str().map(str::to_string),
                    crate::value::PropertySlot::Accessor { .. } => None,
                })
                .unwrap_or_default();
            let code = data
                .props
                .get(&PropertyKey::str("code"))
                .and_then(|prop| match &prop.slot {
                    crate::value::PropertySlot::Value(v) => v.as_str().map(str::to_string),
                    crate::value::PropertySlot::Accessor { .. } => None,
                });
            return HostException {
                kind,
                message,
                code,
            };
        }
    }
    HostException {
        kind: ExceptionKind::Error,
        message: value.to_display_string(),
        code: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = RuntimeOptions::default();
        assert_eq!(options.worker_threads, 4);
        assert!(!options.abort_on_fatal);
    }

    #[test]
    fn test_options_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.json");
        std::fs::write(&path, r#"{"worker_threads": 2, "abort_on_fatal": true}"#).unwrap();
        let options = RuntimeOptions::load(&path).unwrap();
        assert_eq!(options.worker_threads, 2);
        assert!(options.abort_on_fatal);
        assert_eq!(options.await_timeout_ms, 5000);
    }

    #[test]
    fn test_options_load_missing_file_fails() {
        let err = RuntimeOptions::load(Path::new("/nonexistent/runtime.json")).unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigRead { .. }));
    }

    #[test]
    fn test_env_lifecycle() {
        let mut rt = Runtime::new(RuntimeOptions::default().with_worker_threads(1));
        let env = rt.create_env("lifecycle.node");
        let ctx = rt.registration(env).unwrap();
        assert!(!ctx.env.is_null());
        assert!(!ctx.exports.is_null());
        rt.complete_registration(env, ctx.exports).unwrap();
        let exports = rt.exports(env).unwrap();
        assert!(exports.is_object_like());
        rt.destroy_env(env).unwrap();
        assert!(rt.exports(env).is_err());
    }

    #[test]
    fn test_exception_to_host_reads_code_and_message() {
        let error = Env::make_error(
            ExceptionKind::TypeError,
            Some(Value::string("E_ARG")),
            Value::string("bad"),
        );
        let host = exception_to_host(&error);
        assert_eq!(host.kind, ExceptionKind::TypeError);
        assert_eq!(host.message, "bad");
        assert_eq!(host.code.as_deref(), Some("E_ARG"));
    }
}
