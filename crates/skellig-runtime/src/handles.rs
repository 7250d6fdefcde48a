//! Handle store and scope stack.
//!
//! A handle is a dense index into per-environment storage; the integer is
//! what crosses the ABI as `napi_value`. Low IDs are reserved for
//! singletons and never recycled. Scoped allocations are recorded in an
//! allocation log; closing a scope frees the log suffix it owns, which
//! keeps both allocation and release O(1) amortized while free IDs are
//! recycled through a stack.

use skellig_abi::Error;

use crate::value::Value;

pub type HandleId = usize;

pub const ID_UNDEFINED: HandleId = 2;
pub const ID_NULL: HandleId = 3;
pub const ID_FALSE: HandleId = 4;
pub const ID_TRUE: HandleId = 5;
pub const ID_GLOBAL: HandleId = 6;
pub const ID_EMPTY_STRING: HandleId = 7;

/// IDs below this are singleton storage and never enter the free stack.
pub const MIN_ID: HandleId = 8;

struct ScopeRecord {
    /// Index into the allocation log where this scope's ownership starts.
    begin: usize,
    escapable: bool,
    escaped: bool,
}

pub struct HandleStore {
    slots: Vec<Option<Value>>,
    free: Vec<HandleId>,
    log: Vec<HandleId>,
    scopes: Vec<ScopeRecord>,
}

impl HandleStore {
    pub fn new(global: Value) -> Self {
        let mut slots = vec![None; MIN_ID];
        slots[ID_UNDEFINED] = Some(Value::Undefined);
        slots[ID_NULL] = Some(Value::Null);
        slots[ID_FALSE] = Some(Value::Bool(false));
        slots[ID_TRUE] = Some(Value::Bool(true));
        slots[ID_GLOBAL] = Some(global);
        slots[ID_EMPTY_STRING] = Some(Value::string(""));
        Self {
            slots,
            free: Vec::new(),
            log: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn get(&self, id: HandleId) -> Option<&Value> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    pub fn get_cloned(&self, id: HandleId) -> Option<Value> {
        self.get(id).cloned()
    }

    /// Number of currently open scopes.
    pub fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    fn alloc_slot(&mut self, value: Value) -> HandleId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(value);
                id
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    /// Allocate a handle owned by the innermost open scope.
    pub fn alloc_scoped(&mut self, value: Value) -> Result<HandleId, Error> {
        if self.scopes.is_empty() {
            return Err(Error::HandleScopeMismatch);
        }
        let id = self.alloc_slot(value);
        self.log.push(id);
        Ok(id)
    }

    /// Allocate a handle owned by no scope. Used for values pinned by
    /// references, registered exports and TSFN callables; released only
    /// through [`HandleStore::release_pinned`].
    pub fn alloc_pinned(&mut self, value: Value) -> HandleId {
        self.alloc_slot(value)
    }

    pub fn release_pinned(&mut self, id: HandleId) {
        if id >= MIN_ID && id < self.slots.len() && self.slots[id].is_some() {
            self.slots[id] = None;
            self.free.push(id);
        }
    }

    /// Opens a scope and returns its depth (1-based), which doubles as the
    /// scope handle across the ABI.
    pub fn open_scope(&mut self, escapable: bool) -> usize {
        self.scopes.push(ScopeRecord {
            begin: self.log.len(),
            escapable,
            escaped: false,
        });
        self.scopes.len()
    }

    /// Closes the scope at `depth`, releasing every handle it still owns.
    /// Only the innermost scope of the matching kind may close.
    pub fn close_scope(&mut self, depth: usize, escapable: bool) -> Result<(), Error> {
        if depth == 0 || depth != self.scopes.len() {
            return Err(Error::HandleScopeMismatch);
        }
        if self.scopes[depth - 1].escapable != escapable {
            return Err(Error::HandleScopeMismatch);
        }
        let scope = self.scopes.pop().expect("scope stack verified non-empty");
        for id in self.log.drain(scope.begin..) {
            self.slots[id] = None;
            self.free.push(id);
        }
        Ok(())
    }

    /// Promotes `escapee` into the parent scope, returning the new handle.
    pub fn escape(&mut self, depth: usize, escapee: HandleId) -> Result<HandleId, Error> {
        if depth == 0 || depth != self.scopes.len() {
            return Err(Error::HandleScopeMismatch);
        }
        let begin = {
            let scope = &self.scopes[depth - 1];
            if !scope.escapable {
                return Err(Error::HandleScopeMismatch);
            }
            if scope.escaped {
                return Err(Error::EscapeCalledTwice);
            }
            scope.begin
        };
        if !self.log[begin..].contains(&escapee) {
            return Err(Error::InvalidArg);
        }
        let value = self.get_cloned(escapee).ok_or(Error::InvalidArg)?;
        let id = self.alloc_slot(value);
        // The parent owns log[..begin]; splice the promoted handle onto the
        // end of its range.
        self.log.insert(begin, id);
        let scope = &mut self.scopes[depth - 1];
        scope.begin += 1;
        scope.escaped = true;
        Ok(id)
    }
}
