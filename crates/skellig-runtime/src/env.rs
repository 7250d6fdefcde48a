//! Per-add-on environment state.
//!
//! One `Env` exists per loaded add-on. Everything native code can observe
//! through its `napi_env` lives here: the handle store, the error state,
//! references and finalizer records, instance data and cleanup hooks.
//! All fields are host-thread-only; worker threads reach the runtime
//! exclusively through TSFN queues and async-work records.

use skellig_abi::{
    napi_async_cleanup_hook, napi_cleanup_hook, napi_env, napi_extended_error_info, napi_finalize,
    napi_status, Error,
};
use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::{c_char, c_void};
use std::rc::Rc;

use crate::dispatch::DispatchItem;
use crate::handles::{HandleId, HandleStore, ID_GLOBAL};
use crate::refs::{FinalizerRecord, RefId, RefTable, RefTarget, Reference};
use crate::value::{ObjectData, Property, PropertyKey, PropertySlot, SymbolData, Value};
use crate::workers::PoolHandle;
use crate::error::ExceptionKind;

pub type EnvId = usize;

/// Stable storage behind `napi_get_last_error_info`. The message pointer
/// stays valid until the next entry point, which is exactly when the next
/// preamble rewrites this record.
pub struct LastError {
    info: Box<napi_extended_error_info>,
    message: Option<CString>,
}

fn status_message(status: napi_status) -> &'static [u8] {
    use skellig_abi as abi;
    match status {
        abi::napi_ok => b"\0",
        abi::napi_invalid_arg => b"Invalid argument\0",
        abi::napi_object_expected => b"An object was expected\0",
        abi::napi_string_expected => b"A string was expected\0",
        abi::napi_name_expected => b"A string or symbol was expected\0",
        abi::napi_function_expected => b"A function was expected\0",
        abi::napi_number_expected => b"A number was expected\0",
        abi::napi_boolean_expected => b"A boolean was expected\0",
        abi::napi_array_expected => b"An array was expected\0",
        abi::napi_pending_exception => b"An exception is pending\0",
        abi::napi_cancelled => b"The async work item was cancelled\0",
        abi::napi_escape_called_twice => b"napi_escape_handle already called on scope\0",
        abi::napi_handle_scope_mismatch => b"Invalid handle scope usage\0",
        abi::napi_callback_scope_mismatch => b"Invalid callback scope usage\0",
        abi::napi_queue_full => b"Thread-safe function queue is full\0",
        abi::napi_closing => b"Thread-safe function handle is closing\0",
        abi::napi_bigint_expected => b"A bigint was expected\0",
        abi::napi_date_expected => b"A date was expected\0",
        abi::napi_arraybuffer_expected => b"An arraybuffer was expected\0",
        abi::napi_detachable_arraybuffer_expected => {
            b"A detachable arraybuffer was expected\0"
        }
        abi::napi_would_deadlock => b"The operation would deadlock\0",
        abi::napi_no_external_buffers_allowed => b"External buffers are not allowed\0",
        abi::napi_cannot_run_js => b"Cannot run JavaScript\0",
        _ => b"Unknown failure\0",
    }
}

impl LastError {
    fn new() -> Self {
        Self {
            info: Box::new(napi_extended_error_info {
                error_message: std::ptr::null(),
                engine_reserved: std::ptr::null_mut(),
                engine_error_code: 0,
                status_code: skellig_abi::napi_ok,
            }),
            message: None,
        }
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.info.error_message = std::ptr::null();
        self.info.engine_error_code = 0;
        self.info.status_code = skellig_abi::napi_ok;
    }

    pub fn set(&mut self, status: napi_status, message: Option<String>) {
        self.info.status_code = status;
        match message {
            Some(m) => {
                let cstr = CString::new(m).unwrap_or_else(|_| CString::new("invalid").unwrap());
                self.info.error_message = cstr.as_ptr();
                self.message = Some(cstr);
            }
            None => {
                self.message = None;
                self.info.error_message = status_message(status).as_ptr().cast::<c_char>();
            }
        }
    }

    pub fn status(&self) -> napi_status {
        self.info.status_code
    }

    pub fn info_ptr(&self) -> *const napi_extended_error_info {
        &*self.info
    }
}

pub struct InstanceData {
    pub data: *mut c_void,
    pub finalize_cb: Option<napi_finalize>,
    pub finalize_hint: *mut c_void,
}

#[derive(Clone, Copy)]
pub struct CleanupHook {
    pub hook: Option<napi_cleanup_hook>,
    pub arg: *mut c_void,
}

pub struct AsyncCleanupHook {
    pub id: usize,
    pub hook: Option<napi_async_cleanup_hook>,
    pub arg: *mut c_void,
    /// The `napi_async_cleanup_hook_handle` handed to the add-on; passed
    /// back when the hook runs at teardown.
    pub handle: *mut c_void,
}

/// One deferred per `napi_create_promise`. Slots outlive settlement so a
/// second resolve or reject fails instead of dereferencing freed state.
pub struct DeferredSlot {
    pub promise: Rc<std::cell::RefCell<crate::value::PromiseState>>,
    pub settled: bool,
}

pub struct Env {
    pub id: EnvId,
    pub raw: napi_env,
    pub name: String,
    /// NUL-terminated module path handed back by
    /// `node_api_get_module_file_name`.
    pub file_name: CString,
    pub store: HandleStore,
    pub refs: RefTable,
    pub finalizers: Vec<FinalizerRecord>,
    pub pending_exception: Option<Value>,
    pub last_error: LastError,
    pub instance_data: Option<InstanceData>,
    pub cleanup_hooks: Vec<CleanupHook>,
    pub async_cleanup_hooks: Vec<AsyncCleanupHook>,
    next_async_hook_id: usize,
    next_finalizer_id: u64,
    pub external_memory: i64,
    pub exports: Option<HandleId>,
    pub deferreds: Vec<DeferredSlot>,
    pub symbol_registry: HashMap<String, Rc<SymbolData>>,
    pub dispatch: crossbeam_channel::Sender<DispatchItem>,
    pub pool: PoolHandle,
    /// Shells kept alive until teardown so stray calls observe `closing`
    /// instead of dangling.
    pub tsfns: Vec<std::sync::Arc<crate::tsfn::Tsfn>>,
    /// TSFNs currently keeping the environment's dispatch alive.
    pub active_tsfns: usize,
    /// Exceptions raised where no caller can observe them (TSFN callbacks,
    /// `napi_fatal_exception`); drained by the host through the runtime.
    pub uncaught: Vec<Value>,
    pub teardown_started: bool,
}

impl Env {
    pub fn new(
        id: EnvId,
        raw: napi_env,
        name: &str,
        dispatch: crossbeam_channel::Sender<DispatchItem>,
        pool: PoolHandle,
    ) -> Self {
        let global = Value::object();
        Self {
            id,
            raw,
            name: name.to_string(),
            file_name: CString::new(name).unwrap_or_default(),
            store: HandleStore::new(global),
            refs: RefTable::new(),
            finalizers: Vec::new(),
            pending_exception: None,
            last_error: LastError::new(),
            instance_data: None,
            cleanup_hooks: Vec::new(),
            async_cleanup_hooks: Vec::new(),
            next_async_hook_id: 1,
            next_finalizer_id: 1,
            external_memory: 0,
            exports: None,
            deferreds: Vec::new(),
            symbol_registry: HashMap::new(),
            dispatch,
            pool,
            tsfns: Vec::new(),
            active_tsfns: 0,
            uncaught: Vec::new(),
            teardown_started: false,
        }
    }

    pub fn global(&self) -> Value {
        self.store
            .get_cloned(ID_GLOBAL)
            .expect("global singleton is seeded at construction")
    }

    pub fn get_value(&self, id: HandleId) -> Result<Value, Error> {
        self.store.get_cloned(id).ok_or(Error::InvalidArg)
    }

    pub fn has_exception(&self) -> bool {
        self.pending_exception.is_some()
    }

    pub fn set_exception(&mut self, value: Value) {
        self.pending_exception = Some(value);
    }

    pub fn take_exception(&mut self) -> Option<Value> {
        self.pending_exception.take()
    }

    /// Builds an error object in the host value model: message and
    /// optional code properties plus the error brand.
    pub fn make_error(kind: ExceptionKind, code: Option<Value>, message: Value) -> Value {
        let obj = ObjectData::new();
        {
            let mut data = obj.borrow_mut();
            data.error_kind = Some(kind);
            data.props.insert(
                PropertyKey::str("message"),
                Property {
                    slot: PropertySlot::Value(message),
                    attributes: skellig_abi::napi_writable | skellig_abi::napi_configurable,
                },
            );
            if let Some(code) = code {
                data.props.insert(
                    PropertyKey::str("code"),
                    Property {
                        slot: PropertySlot::Value(code),
                        attributes: skellig_abi::napi_default_jsproperty,
                    },
                );
            }
        }
        Value::Object(obj)
    }

    // --- references ---

    pub fn create_reference(&mut self, value: Value, count: u32) -> RefId {
        let target = if count > 0 {
            RefTarget::Strong {
                handle: self.store.alloc_pinned(value),
            }
        } else {
            RefTarget::Weak(value.downgrade())
        };
        self.refs.insert(Reference { count, target })
    }

    pub fn reference_ref(&mut self, id: RefId) -> Result<u32, Error> {
        let reference = self.refs.get_mut(id).ok_or(Error::InvalidArg)?;
        if reference.count == 0 {
            // Crossing weak -> strong: only possible while the target is
            // still live.
            let value = match &reference.target {
                RefTarget::Weak(weak) => weak.upgrade().ok_or(Error::GenericFailure)?,
                RefTarget::Strong { .. } => return Err(Error::GenericFailure),
            };
            let handle = self.store.alloc_pinned(value);
            let reference = self.refs.get_mut(id).expect("reference verified above");
            reference.target = RefTarget::Strong { handle };
            reference.count = 1;
            Ok(1)
        } else {
            reference.count += 1;
            Ok(reference.count)
        }
    }

    pub fn reference_unref(&mut self, id: RefId) -> Result<u32, Error> {
        let reference = self.refs.get_mut(id).ok_or(Error::InvalidArg)?;
        if reference.count == 0 {
            return Err(Error::GenericFailure);
        }
        reference.count -= 1;
        if reference.count == 0 {
            if let RefTarget::Strong { handle } = reference.target {
                let value = self
                    .store
                    .get_cloned(handle)
                    .expect("strong reference pins its handle");
                self.refs
                    .get_mut(id)
                    .expect("reference verified above")
                    .target = RefTarget::Weak(value.downgrade());
                self.store.release_pinned(handle);
            }
            Ok(0)
        } else {
            Ok(reference.count)
        }
    }

    /// Resolves the referenced value. Strong references answer with their
    /// own pinned handle; weak references materialize a fresh scoped
    /// handle, or the empty handle once the target is gone.
    pub fn reference_value(&mut self, id: RefId) -> Result<HandleId, Error> {
        let reference = self.refs.get(id).ok_or(Error::InvalidArg)?;
        match &reference.target {
            RefTarget::Strong { handle } => Ok(*handle),
            RefTarget::Weak(weak) => match weak.upgrade() {
                Some(value) => self.store.alloc_scoped(value),
                None => Ok(0),
            },
        }
    }

    /// Explicit deletion never runs finalizers; a wrap finalizer bound to
    /// the same object stays registered and fires on collection or
    /// teardown.
    pub fn delete_reference(&mut self, id: RefId) -> Result<(), Error> {
        let reference = self.refs.remove(id).ok_or(Error::InvalidArg)?;
        if let RefTarget::Strong { handle } = reference.target {
            self.store.release_pinned(handle);
        }
        Ok(())
    }

    // --- finalizers ---

    pub fn add_finalizer(
        &mut self,
        target: &Value,
        cb: napi_finalize,
        data: *mut c_void,
        hint: *mut c_void,
        is_wrap: bool,
    ) -> u64 {
        let id = self.next_finalizer_id;
        self.next_finalizer_id += 1;
        self.finalizers.push(FinalizerRecord {
            id,
            target: target.downgrade(),
            cb,
            data,
            hint,
            is_wrap,
        });
        id
    }

    /// Detaches the wrap finalizer bound to `target` without running it.
    pub fn remove_wrap_finalizer(&mut self, target: &Value) {
        self.finalizers.retain(|record| {
            if !record.is_wrap {
                return true;
            }
            match record.target.upgrade() {
                Some(live) => !live.strict_equals(target),
                None => true,
            }
        });
    }

    /// Moves every record whose target is gone out of the live list. The
    /// caller invokes them with no environment borrow held, so re-entrant
    /// list mutation from inside a finalizer lands on the live list and is
    /// naturally deferred past the current drain.
    pub fn take_due_finalizers(&mut self) -> Vec<FinalizerRecord> {
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.finalizers.len() {
            if self.finalizers[index].target.is_dead() {
                due.push(self.finalizers.remove(index));
            } else {
                index += 1;
            }
        }
        due
    }

    /// Drains every remaining record for teardown, most recent first.
    pub fn take_all_finalizers(&mut self) -> Vec<FinalizerRecord> {
        let mut all = std::mem::take(&mut self.finalizers);
        all.reverse();
        all
    }

    // --- cleanup hooks ---

    /// Registers a teardown hook. A duplicate fn/arg pair is ignored.
    pub fn add_cleanup_hook(&mut self, hook: Option<napi_cleanup_hook>, arg: *mut c_void) {
        let exists = self
            .cleanup_hooks
            .iter()
            .any(|h| hook_eq(h.hook, hook) && h.arg == arg);
        if !exists {
            self.cleanup_hooks.push(CleanupHook { hook, arg });
        }
    }

    pub fn remove_cleanup_hook(&mut self, hook: Option<napi_cleanup_hook>, arg: *mut c_void) {
        if let Some(pos) = self
            .cleanup_hooks
            .iter()
            .rposition(|h| hook_eq(h.hook, hook) && h.arg == arg)
        {
            self.cleanup_hooks.remove(pos);
        }
    }

    pub fn add_async_cleanup_hook(
        &mut self,
        hook: Option<napi_async_cleanup_hook>,
        arg: *mut c_void,
        handle: *mut c_void,
    ) -> usize {
        let id = self.next_async_hook_id;
        self.next_async_hook_id += 1;
        self.async_cleanup_hooks
            .push(AsyncCleanupHook { id, hook, arg, handle });
        id
    }

    pub fn remove_async_cleanup_hook(&mut self, id: usize) -> bool {
        let before = self.async_cleanup_hooks.len();
        self.async_cleanup_hooks.retain(|h| h.id != id);
        self.async_cleanup_hooks.len() != before
    }

    pub fn symbol_for(&mut self, description: &str) -> Rc<SymbolData> {
        self.symbol_registry
            .entry(description.to_string())
            .or_insert_with(|| {
                Rc::new(SymbolData {
                    description: Some(description.to_string()),
                })
            })
            .clone()
    }
}

fn hook_eq(a: Option<napi_cleanup_hook>, b: Option<napi_cleanup_hook>) -> bool {
    a.map(|f| f as usize) == b.map(|f| f as usize)
}
