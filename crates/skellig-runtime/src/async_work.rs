//! Async work: background execute, host-thread complete.
//!
//! The execute callback runs on a pool worker with no scope and no handle
//! access; completion is posted back through the dispatch channel and runs
//! on the host thread inside a fresh scope. Cancellation only wins the
//! race while the job is still queued.

use skellig_abi::{napi_async_complete_callback, napi_async_execute_callback, napi_status};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::context::with_env;
use crate::dispatch::{DispatchItem, SendPtr};
use crate::env::EnvId;

const STATE_IDLE: u8 = 0;
const STATE_QUEUED: u8 = 1;
const STATE_RUNNING: u8 = 2;
const STATE_CANCELLED: u8 = 3;
const STATE_DONE: u8 = 4;

pub struct AsyncWork {
    pub env_id: EnvId,
    env_raw: SendPtr,
    execute: napi_async_execute_callback,
    complete: Option<napi_async_complete_callback>,
    pub data: SendPtr,
    pub resource_name: String,
    state: AtomicU8,
    tx: crossbeam_channel::Sender<DispatchItem>,
}

impl AsyncWork {
    pub fn new(
        env_id: EnvId,
        env_raw: SendPtr,
        execute: napi_async_execute_callback,
        complete: Option<napi_async_complete_callback>,
        data: SendPtr,
        resource_name: String,
        tx: crossbeam_channel::Sender<DispatchItem>,
    ) -> Arc<Self> {
        Arc::new(Self {
            env_id,
            env_raw,
            execute,
            complete,
            data,
            resource_name,
            state: AtomicU8::new(STATE_IDLE),
            tx,
        })
    }

    /// Marks the work queued. Fails if it is already in flight.
    pub fn mark_queued(&self) -> bool {
        self.state
            .compare_exchange(STATE_IDLE, STATE_QUEUED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Requests cancellation; only queued-but-not-started work can be
    /// cancelled.
    pub fn cancel(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_QUEUED,
                STATE_CANCELLED,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Pool-worker entry: runs execute unless cancellation won, then posts
    /// the completion.
    pub fn run(self: &Arc<Self>) {
        let started = self
            .state
            .compare_exchange(
                STATE_QUEUED,
                STATE_RUNNING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        let status = if started {
            unsafe { (self.execute)(self.env_raw.0.cast(), self.data.0) };
            self.state.store(STATE_DONE, Ordering::SeqCst);
            skellig_abi::napi_ok
        } else {
            skellig_abi::napi_cancelled
        };
        let _ = self.tx.send(DispatchItem::AsyncComplete {
            work: self.clone(),
            status,
        });
    }

    /// Host-thread completion: fresh scope, complete callback, exceptions
    /// routed to the uncaught channel.
    pub fn complete(&self, status: napi_status) {
        let Some(complete) = self.complete else {
            return;
        };
        let depth = match with_env(self.env_id, |env| env.store.open_scope(false)) {
            Ok(depth) => depth,
            Err(_) => return,
        };
        unsafe { complete(self.env_raw.0.cast(), status, self.data.0) };
        let _ = with_env(self.env_id, |env| {
            if let Some(exception) = env.take_exception() {
                env.uncaught.push(exception);
            }
            let _ = env.store.close_scope(depth, false);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use skellig_abi::napi_env;
    use std::os::raw::c_void;

    unsafe extern "C" fn exec_noop(_env: napi_env, _data: *mut c_void) {}

    fn work(tx: crossbeam_channel::Sender<DispatchItem>) -> Arc<AsyncWork> {
        AsyncWork::new(
            1,
            SendPtr::NULL,
            exec_noop,
            None,
            SendPtr::NULL,
            "test".to_string(),
            tx,
        )
    }

    #[test]
    fn test_cancel_before_start_wins() {
        let dispatcher = Dispatcher::new();
        let w = work(dispatcher.sender());
        assert!(w.mark_queued());
        assert!(w.cancel());
        w.run();
        match dispatcher.try_next() {
            Some(DispatchItem::AsyncComplete { status, .. }) => {
                assert_eq!(status, skellig_abi::napi_cancelled);
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn test_cancel_after_run_fails() {
        let dispatcher = Dispatcher::new();
        let w = work(dispatcher.sender());
        assert!(w.mark_queued());
        w.run();
        assert!(!w.cancel());
        match dispatcher.try_next() {
            Some(DispatchItem::AsyncComplete { status, .. }) => {
                assert_eq!(status, skellig_abi::napi_ok);
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn test_double_queue_rejected() {
        let dispatcher = Dispatcher::new();
        let w = work(dispatcher.sender());
        assert!(w.mark_queued());
        assert!(!w.mark_queued());
    }
}
