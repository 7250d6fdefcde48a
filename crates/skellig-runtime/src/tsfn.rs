//! Thread-safe functions.
//!
//! A TSFN is the one doorway through which arbitrary threads reach the
//! host: producers enqueue opaque data pointers under a single mutex, a
//! wake-up is posted to the dispatch channel, and the host thread drains
//! the FIFO by invoking the `call_js` callback inside a fresh handle
//! scope. Everything else about the runtime stays host-thread-only.

use parking_lot::{Condvar, Mutex};
use skellig_abi::{
    napi_finalize, napi_status, napi_threadsafe_function_call_js,
    napi_threadsafe_function_call_mode, napi_threadsafe_function_release_mode,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::ThreadId;

use crate::context::{env_to_raw, value_to_raw, with_env};
use crate::dispatch::{DispatchItem, SendPtr};
use crate::env::EnvId;
use crate::handles::HandleId;
use crate::value::Value;

struct TsfnState {
    queue: VecDeque<SendPtr>,
    thread_count: usize,
    closing: bool,
    finalized: bool,
}

pub struct Tsfn {
    pub env_id: EnvId,
    /// Pinned handle to the target callable; `None` when the TSFN was
    /// created without one.
    pub callable: Option<HandleId>,
    context: SendPtr,
    call_js: Option<napi_threadsafe_function_call_js>,
    finalize_cb: Option<napi_finalize>,
    finalize_data: SendPtr,
    /// Zero means unbounded.
    max_queue: usize,
    state: Mutex<TsfnState>,
    space: Condvar,
    scheduled: AtomicBool,
    /// Whether this TSFN keeps the environment's dispatch alive.
    referenced: AtomicBool,
    tx: crossbeam_channel::Sender<DispatchItem>,
    host_thread: ThreadId,
}

impl Tsfn {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        env_id: EnvId,
        callable: Option<HandleId>,
        context: SendPtr,
        call_js: Option<napi_threadsafe_function_call_js>,
        finalize_cb: Option<napi_finalize>,
        finalize_data: SendPtr,
        max_queue: usize,
        initial_thread_count: usize,
        tx: crossbeam_channel::Sender<DispatchItem>,
    ) -> Arc<Self> {
        log::debug!("tsfn created (env {env_id}, queue cap {max_queue})");
        Arc::new(Self {
            env_id,
            callable,
            context,
            call_js,
            finalize_cb,
            finalize_data,
            max_queue,
            state: Mutex::new(TsfnState {
                queue: VecDeque::new(),
                thread_count: initial_thread_count,
                closing: false,
                finalized: false,
            }),
            space: Condvar::new(),
            scheduled: AtomicBool::new(false),
            referenced: AtomicBool::new(true),
            tx,
            host_thread: std::thread::current().id(),
        })
    }

    pub fn context(&self) -> SendPtr {
        self.context
    }

    pub fn is_referenced(&self) -> bool {
        self.referenced.load(Ordering::SeqCst)
    }

    pub fn set_referenced(&self, value: bool) -> bool {
        self.referenced.swap(value, Ordering::SeqCst)
    }

    fn schedule(self: &Arc<Self>) {
        if !self.scheduled.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(DispatchItem::TsfnWake(self.clone()));
        }
    }

    /// Enqueue from any thread.
    pub fn call(
        self: &Arc<Self>,
        data: SendPtr,
        mode: napi_threadsafe_function_call_mode,
    ) -> napi_status {
        {
            let mut state = self.state.lock();
            loop {
                if state.closing {
                    return skellig_abi::napi_closing;
                }
                if self.max_queue > 0 && state.queue.len() >= self.max_queue {
                    if mode == skellig_abi::napi_tsfn_nonblocking {
                        return skellig_abi::napi_queue_full;
                    }
                    if std::thread::current().id() == self.host_thread {
                        // The only drain site is this very thread.
                        return skellig_abi::napi_would_deadlock;
                    }
                    self.space.wait(&mut state);
                    continue;
                }
                state.queue.push_back(data);
                break;
            }
        }
        self.schedule();
        skellig_abi::napi_ok
    }

    pub fn acquire(&self) -> napi_status {
        let mut state = self.state.lock();
        if state.closing {
            return skellig_abi::napi_closing;
        }
        state.thread_count += 1;
        skellig_abi::napi_ok
    }

    pub fn release(
        self: &Arc<Self>,
        mode: napi_threadsafe_function_release_mode,
    ) -> napi_status {
        let closing = {
            let mut state = self.state.lock();
            if state.thread_count == 0 {
                return skellig_abi::napi_invalid_arg;
            }
            state.thread_count -= 1;
            if mode == skellig_abi::napi_tsfn_abort {
                // Abort drops queued items; blocked producers wake up and
                // observe closing.
                state.closing = true;
                state.queue.clear();
                self.space.notify_all();
            } else if state.thread_count == 0 {
                state.closing = true;
                self.space.notify_all();
            }
            state.closing
        };
        if closing {
            // Wake the host so the finalizer runs after the drain.
            self.schedule();
        }
        skellig_abi::napi_ok
    }

    pub fn is_closing(&self) -> bool {
        self.state.lock().closing
    }

    /// Host-thread service routine: drains the FIFO, then runs the
    /// finalizer once the TSFN is closing, fully released and empty.
    pub fn drain(self: &Arc<Self>) {
        self.scheduled.store(false, Ordering::SeqCst);
        let raw_env = env_to_raw(self.env_id);

        loop {
            let item = {
                let mut state = self.state.lock();
                let item = state.queue.pop_front();
                if item.is_some() {
                    self.space.notify_one();
                }
                item
            };
            let Some(data) = item else { break };
            self.invoke(raw_env, data);
        }

        let finalize_now = {
            let mut state = self.state.lock();
            if state.closing && state.thread_count == 0 && state.queue.is_empty()
                && !state.finalized
            {
                state.finalized = true;
                true
            } else {
                false
            }
        };
        if finalize_now {
            self.finalize(raw_env);
        }
    }

    fn invoke(&self, raw_env: skellig_abi::napi_env, data: SendPtr) {
        let depth = match with_env(self.env_id, |env| env.store.open_scope(false)) {
            Ok(depth) => depth,
            Err(_) => return,
        };
        let callable_raw = self
            .callable
            .map_or(std::ptr::null_mut(), value_to_raw);

        match self.call_js {
            Some(call_js) => unsafe {
                call_js(raw_env, callable_raw, self.context.0, data.0);
            },
            None => {
                // No custom call_js: invoke the callable directly with no
                // arguments, as the engine's default does.
                if let Some(handle) = self.callable {
                    let callable =
                        with_env(self.env_id, |env| env.store.get_cloned(handle)).ok().flatten();
                    if let Some(callable) = callable {
                        let _ = crate::callback::invoke_callable(
                            self.env_id,
                            &callable,
                            Value::Undefined,
                            &[],
                            None,
                        );
                    }
                }
            }
        }

        let _ = with_env(self.env_id, |env| {
            // Callback exceptions route through the uncaught channel; they
            // must not poison unrelated entry points.
            if let Some(exception) = env.take_exception() {
                env.uncaught.push(exception);
            }
            let _ = env.store.close_scope(depth, false);
        });
    }

    fn finalize(&self, raw_env: skellig_abi::napi_env) {
        log::debug!("tsfn finalizing (env {})", self.env_id);
        if let Some(finalize_cb) = self.finalize_cb {
            let depth = with_env(self.env_id, |env| env.store.open_scope(false)).ok();
            unsafe {
                finalize_cb(raw_env, self.finalize_data.0, self.context.0);
            }
            if let Some(depth) = depth {
                let _ = with_env(self.env_id, |env| {
                    if let Some(exception) = env.take_exception() {
                        env.uncaught.push(exception);
                    }
                    let _ = env.store.close_scope(depth, false);
                });
            }
        }
        let _ = with_env(self.env_id, |env| {
            if let Some(handle) = self.callable {
                env.store.release_pinned(handle);
            }
            if self.referenced.load(Ordering::SeqCst) {
                env.active_tsfns = env.active_tsfns.saturating_sub(1);
            }
        });
    }

    /// Teardown path: abort, drain nothing, finalize if still outstanding.
    pub fn abort_for_teardown(self: &Arc<Self>) {
        let finalize_now = {
            let mut state = self.state.lock();
            state.closing = true;
            state.queue.clear();
            self.space.notify_all();
            if state.finalized {
                false
            } else {
                state.finalized = true;
                true
            }
        };
        if finalize_now {
            self.finalize(env_to_raw(self.env_id));
        }
    }
}
