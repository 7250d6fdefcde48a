//! Host-thread dispatch queue.
//!
//! The one channel through which off-thread activity reaches the host
//! thread: TSFN wake-ups, async-work completions and posted finalizers.
//! Producers send from any thread; only the host thread receives, inside
//! [`crate::runtime::Runtime::pump`].

use crossbeam_channel::{Receiver, Sender};
use skellig_abi::{napi_finalize, napi_status};
use std::os::raw::c_void;
use std::sync::Arc;
use std::time::Duration;

use crate::async_work::AsyncWork;
use crate::env::EnvId;
use crate::tsfn::Tsfn;

/// A raw pointer that crosses threads as opaque cargo. The runtime never
/// dereferences it; only native callbacks receive it back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendPtr(pub *mut c_void);

unsafe impl Send for SendPtr {}
unsafe impl Sync for SendPtr {}

impl SendPtr {
    pub const NULL: Self = Self(std::ptr::null_mut());
}

pub enum DispatchItem {
    /// A TSFN has queued items (or needs its close-out serviced).
    TsfnWake(Arc<Tsfn>),
    /// An async work item finished (or was cancelled) off-thread.
    AsyncComplete {
        work: Arc<AsyncWork>,
        status: napi_status,
    },
    /// Finalizer queued through `node_api_post_finalizer`.
    PostedFinalizer {
        env: EnvId,
        cb: napi_finalize,
        data: SendPtr,
        hint: SendPtr,
    },
}

pub struct Dispatcher {
    tx: Sender<DispatchItem>,
    rx: Receiver<DispatchItem>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<DispatchItem> {
        self.tx.clone()
    }

    pub fn try_next(&self) -> Option<DispatchItem> {
        self.rx.try_recv().ok()
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<DispatchItem> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
