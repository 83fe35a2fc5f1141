//! Fixed-size worker pool for area-diagram generation.
//!
//! Each submitted task gets a [`GenerationHandle`] backed by a oneshot channel.
//! Tasks share nothing mutable; the only shared state is the occupancy counters.
//! There is no per-task cancellation: dropping a handle discards the result but
//! the task still runs to completion.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Unique identifier for a generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GenerationId(Uuid);

impl GenerationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GenerationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GenerationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pending result of a submitted task.
#[derive(Debug)]
pub struct GenerationHandle<T> {
    pub id: GenerationId,
    pub submitted_at: DateTime<Utc>,
    result: oneshot::Receiver<Result<T>>,
}

impl<T> GenerationHandle<T> {
    /// Await the task's result.
    pub async fn wait(self) -> Result<T> {
        self.result.await?
    }

    /// Block the current thread until the task finishes.
    ///
    /// Must not be called from inside an async runtime.
    pub fn blocking_wait(self) -> Result<T> {
        self.result.blocking_recv()?
    }
}

/// Snapshot of pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolOccupancy {
    pub threads: usize,
    pub active: usize,
    pub queued: usize,
}

#[derive(Debug)]
struct Counters {
    active: usize,
    queued: usize,
    accepting: bool,
}

#[derive(Debug)]
struct Shared {
    threads: usize,
    counters: Mutex<Counters>,
    drained: Condvar,
}

impl Shared {
    fn occupancy(counters: &Counters, threads: usize) -> PoolOccupancy {
        PoolOccupancy {
            threads,
            active: counters.active,
            queued: counters.queued,
        }
    }

    fn update(&self, f: impl FnOnce(&mut Counters)) {
        let mut counters = self.counters.lock();
        f(&mut counters);
        let occupancy = Self::occupancy(&counters, self.threads);
        debug!(
            threads = occupancy.threads,
            active = occupancy.active,
            queued = occupancy.queued,
            "generation pool occupancy"
        );
        if counters.active == 0 && counters.queued == 0 {
            self.drained.notify_all();
        }
    }
}

pub struct GenerationScheduler {
    pool: ThreadPool,
    shared: Arc<Shared>,
}

impl GenerationScheduler {
    /// Build the pool. `worker_threads == 0` means one thread per CPU.
    pub fn new(worker_threads: usize) -> Result<Self> {
        let threads = if worker_threads == 0 {
            num_cpus::get()
        } else {
            worker_threads
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("diagram-gen-{i}"))
            .build()
            .map_err(|e| Error::Config(format!("building generation pool: {e}")))?;

        info!(threads, "generation scheduler started");
        Ok(Self {
            pool,
            shared: Arc::new(Shared {
                threads,
                counters: Mutex::new(Counters {
                    active: 0,
                    queued: 0,
                    accepting: true,
                }),
                drained: Condvar::new(),
            }),
        })
    }

    /// Queue a task. Fails with [`Error::SchedulerShutdown`] after [`shutdown`](Self::shutdown).
    ///
    /// A task that panics closes its channel; the handle then yields
    /// [`Error::ChannelClosed`].
    pub fn submit<T, F>(&self, task: F) -> Result<GenerationHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        {
            let mut counters = self.shared.counters.lock();
            if !counters.accepting {
                return Err(Error::SchedulerShutdown);
            }
            counters.queued += 1;
        }
        self.shared.update(|_| {});

        let id = GenerationId::new();
        let (tx, rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);

        self.pool.spawn(move || {
            shared.update(|c| {
                c.queued -= 1;
                c.active += 1;
            });

            match catch_unwind(AssertUnwindSafe(task)) {
                Ok(result) => {
                    // Receiver may be gone; the caller lost interest.
                    let _ = tx.send(result);
                }
                Err(_) => error!(%id, "generation task panicked"),
            }

            shared.update(|c| c.active -= 1);
        });

        Ok(GenerationHandle {
            id,
            submitted_at: Utc::now(),
            result: rx,
        })
    }

    pub fn occupancy(&self) -> PoolOccupancy {
        let counters = self.shared.counters.lock();
        Shared::occupancy(&counters, self.shared.threads)
    }

    pub fn is_accepting(&self) -> bool {
        self.shared.counters.lock().accepting
    }

    /// Stop accepting work and wait for queued and running tasks to finish.
    ///
    /// Must not be called from a task running on this pool.
    pub fn shutdown(&self) {
        let mut counters = self.shared.counters.lock();
        counters.accepting = false;
        info!(
            active = counters.active,
            queued = counters.queued,
            "generation scheduler draining"
        );
        while counters.active > 0 || counters.queued > 0 {
            self.shared.drained.wait(&mut counters);
        }
        info!("generation scheduler stopped");
    }
}
