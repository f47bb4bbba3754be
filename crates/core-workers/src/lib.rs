//! Async worker pool (C9).
//!
//! Background threads execute highlighting and autosuggestion jobs against
//! an immutable snapshot of the editable line. Every submission carries the
//! generation it was computed for; the main loop drains completed results
//! and discards any whose generation trails the current one, so a slow
//! worker can never clobber a newer edit.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

/// Shared, monotonically increasing edit counter. Bumped once per mutation
/// to the editable line; workers compare their captured generation against
/// the current value before publishing a result.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU64::new(0)))
    }

    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// A job result tagged with the generation it was computed against.
pub struct WorkerOutcome<T> {
    pub generation: u64,
    pub value: T,
}

type BoxedJob<T> = Box<dyn FnOnce() -> T + Send>;

struct PoolJob<T> {
    generation: u64,
    run: BoxedJob<T>,
}

/// A fixed-size pool of background threads that compute values of type `T`
/// (e.g. a `Vec<HighlightSpec>` or an autosuggestion candidate string) and
/// hand them back through a result channel the caller drains on its own
/// schedule — never blocking the editor loop on worker progress.
pub struct WorkerPool<T> {
    job_tx: Sender<PoolJob<T>>,
    result_rx: Receiver<WorkerOutcome<T>>,
    generation: Arc<Generation>,
    handles: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawn `threads` worker threads sharing one job queue and one result
    /// channel. `generation` is typically shared with the editor session so
    /// every mutation visibly invalidates in-flight work.
    pub fn new(threads: usize, generation: Arc<Generation>) -> Self {
        let (job_tx, job_rx) = unbounded::<PoolJob<T>>();
        let (result_tx, result_rx) = unbounded::<WorkerOutcome<T>>();
        let threads = threads.max(1);
        let mut handles = Vec::with_capacity(threads);
        for idx in 0..threads {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let generation = generation.clone();
            let handle = std::thread::Builder::new()
                .name(format!("worker-{idx}"))
                .spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        if job.generation < generation.current() {
                            tracing::trace!(generation = job.generation, "dropping stale job before execution");
                            continue;
                        }
                        let value = (job.run)();
                        if result_tx.send(WorkerOutcome { generation: job.generation, value }).is_err() {
                            break;
                        }
                    }
                })
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }
        Self {
            job_tx,
            result_rx,
            generation,
            handles,
        }
    }

    /// Bump and return the new generation. Call this once per editable-line
    /// mutation before submitting fresh jobs.
    pub fn bump_generation(&self) -> u64 {
        self.generation.bump()
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.current()
    }

    /// Queue a job tagged with `generation`. Never blocks: the queue is
    /// unbounded since jobs are cheap closures over an immutable snapshot.
    pub fn submit(&self, generation: u64, job: impl FnOnce() -> T + Send + 'static) {
        let _ = self.job_tx.send(PoolJob {
            generation,
            run: Box::new(job),
        });
    }

    /// Drain all results currently queued, keeping only those computed
    /// against the generation that is current *now*. Stale results are
    /// dropped silently; the caller never sees them.
    pub fn try_drain_fresh(&self) -> Vec<WorkerOutcome<T>> {
        let current = self.current_generation();
        self.result_rx
            .try_iter()
            .filter(|outcome| outcome.generation == current)
            .collect()
    }

    /// Non-blocking peek at whether any result (fresh or stale) is queued.
    pub fn has_pending_results(&self) -> bool {
        !self.result_rx.is_empty()
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        // Dropping job_tx's last clone here closes the channel; workers see
        // `recv()` return `Err` and exit their loop.
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fresh_result_survives_drain() {
        let generation = Generation::new();
        let pool: WorkerPool<u32> = WorkerPool::new(2, generation.clone());
        let gen0 = generation.current();
        pool.submit(gen0, || 42);
        std::thread::sleep(Duration::from_millis(50));
        let results = pool.try_drain_fresh();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, 42);
    }

    #[test]
    fn stale_result_is_dropped_on_drain() {
        let generation = Generation::new();
        let pool: WorkerPool<u32> = WorkerPool::new(1, generation.clone());
        let stale_gen = generation.current();
        generation.bump();
        pool.submit(stale_gen, || 7);
        std::thread::sleep(Duration::from_millis(50));
        let results = pool.try_drain_fresh();
        assert!(results.is_empty(), "stale generation must not survive drain");
    }

    #[test]
    fn generation_bump_is_monotonic() {
        let generation = Generation::new();
        let a = generation.bump();
        let b = generation.bump();
        assert!(b > a);
        assert_eq!(generation.current(), b);
    }

    #[test]
    fn multiple_jobs_across_threads_all_complete() {
        let generation = Generation::new();
        let pool: WorkerPool<u32> = WorkerPool::new(4, generation.clone());
        let gen0 = generation.current();
        for i in 0..20u32 {
            pool.submit(gen0, move || i * 2);
        }
        std::thread::sleep(Duration::from_millis(100));
        let results = pool.try_drain_fresh();
        assert_eq!(results.len(), 20);
        let sum: u32 = results.iter().map(|o| o.value).sum();
        assert_eq!(sum, (0..20u32).map(|i| i * 2).sum::<u32>());
    }
}
