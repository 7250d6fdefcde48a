//! Reference table and finalizer records.
//!
//! A reference is a scope-independent pin (strong) or observer (weak) of a
//! host value; a finalizer record binds a native destructor to an
//! object-like value and fires exactly once, on the host thread, when the
//! target is collected or the environment tears down.

use skellig_abi::napi_finalize;
use std::os::raw::c_void;

use crate::handles::HandleId;
use crate::value::WeakValue;

pub type RefId = usize;

pub enum RefTarget {
    /// Pins the value through a dedicated handle outside any scope.
    Strong { handle: HandleId },
    Weak(WeakValue),
}

pub struct Reference {
    pub count: u32,
    pub target: RefTarget,
}

pub struct FinalizerRecord {
    pub id: u64,
    pub target: WeakValue,
    pub cb: napi_finalize,
    pub data: *mut c_void,
    pub hint: *mut c_void,
    /// Registered through `napi_wrap`; detachable via `napi_remove_wrap`.
    pub is_wrap: bool,
}

pub struct RefTable {
    slots: Vec<Option<Reference>>,
    free: Vec<RefId>,
}

impl RefTable {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn insert(&mut self, reference: Reference) -> RefId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(reference);
                id
            }
            None => {
                self.slots.push(Some(reference));
                self.slots.len() - 1
            }
        }
    }

    pub fn get(&self, id: RefId) -> Option<&Reference> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: RefId) -> Option<&mut Reference> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: RefId) -> Option<Reference> {
        let reference = self.slots.get_mut(id).and_then(Option::take)?;
        self.free.push(id);
        Some(reference)
    }

    /// Remaining references, for teardown accounting.
    pub fn drain_all(&mut self) -> Vec<Reference> {
        let refs = self
            .slots
            .iter_mut()
            .filter_map(Option::take)
            .collect::<Vec<_>>();
        self.free.clear();
        self.slots.clear();
        refs
    }
}

impl Default for RefTable {
    fn default() -> Self {
        Self::new()
    }
}
