use crate::concurrency::scheduler::{Scheduler, Task};
use math::error::{Error, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug, Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn enter(&self) {
        *self.count.lock().unwrap_or_else(|e| e.into_inner()) += 1;
    }

    fn leave(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count -= 1;
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        while *count > 0 {
            count = self.idle.wait(count).unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// Decrements the in-flight counter even if the task panics.
struct Leave(Arc<InFlight>);

impl Drop for Leave {
    fn drop(&mut self) {
        self.0.leave();
    }
}

/// Fixed-size pool of OS threads over rayon.
#[derive(Clone)]
pub struct WorkerPool {
    pool: Arc<ThreadPool>,
    in_flight: Arc<InFlight>,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self> {
        let pool: ThreadPool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("fhe-worker-{}", i))
            .build()
            .map_err(|e| Error::AllocationFailure(format!("worker pool: {}", e)))?;
        tracing::debug!(threads = pool.current_num_threads(), "worker pool started");
        Ok(Self {
            pool: Arc::new(pool),
            in_flight: Arc::new(InFlight::default()),
        })
    }
}

impl Scheduler for WorkerPool {
    fn submit(&self, task: Task) {
        self.in_flight.enter();
        let guard: Leave = Leave(self.in_flight.clone());
        self.pool.spawn(move || {
            let _guard: Leave = guard;
            task(rayon::current_thread_index().unwrap_or(0));
        });
    }

    fn drain(&self) {
        self.in_flight.wait();
    }

    fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }
}

#[cfg(test)]
mod tests {
    use super::WorkerPool;
    use crate::concurrency::scheduler::Scheduler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn drain_waits_for_nested_tasks() {
        let pool: WorkerPool = WorkerPool::new(4).unwrap();
        let done: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
        for _ in 0..16 {
            let (done, inner) = (done.clone(), pool.clone());
            pool.submit(Box::new(move |worker| {
                assert!(worker < 4);
                let done2 = done.clone();
                inner.submit(Box::new(move |_| {
                    done2.fetch_add(1, Ordering::SeqCst);
                }));
                done.fetch_add(1, Ordering::SeqCst);
            }));
        }
        pool.drain();
        assert_eq!(done.load(Ordering::SeqCst), 32);
        assert_eq!(pool.workers(), 4);
    }
}
