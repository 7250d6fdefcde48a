//! Shared worker pool for async-work execute callbacks.
//!
//! A fixed set of threads drains a job channel. Execute callbacks run
//! here with no scope and no environment access; their completions travel
//! back through the dispatch queue.

use crossbeam_channel::{Receiver, Sender};
use std::thread::JoinHandle;

pub type PoolJob = Box<dyn FnOnce() + Send>;

#[derive(Clone)]
pub struct PoolHandle {
    tx: Sender<PoolJob>,
}

impl PoolHandle {
    pub fn submit(&self, job: PoolJob) {
        // Send only fails after the pool shut down; jobs arriving that late
        // are dropped, matching cancelled work.
        let _ = self.tx.send(job);
    }
}

pub struct WorkerPool {
    tx: Option<Sender<PoolJob>>,
    threads: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (tx, rx) = crossbeam_channel::unbounded::<PoolJob>();
        let threads = (0..size)
            .map(|index| {
                let rx: Receiver<PoolJob> = rx.clone();
                std::thread::Builder::new()
                    .name(format!("skellig-worker-{index}"))
                    .spawn(move || {
                        while let Ok(job) = rx.recv() {
                            job();
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();
        Self {
            tx: Some(tx),
            threads,
        }
    }

    pub fn handle(&self) -> PoolHandle {
        PoolHandle {
            tx: self.tx.as_ref().expect("pool is live until drop").clone(),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel ends the worker loops.
        self.tx.take();
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
    }
}
