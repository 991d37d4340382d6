//! Scoped worker pool for per-tile jobs.
//!
//! A pool is a plain handle: every [`WorkerPool::map`] call spawns its own
//! named workers inside a thread scope, feeds them through a channel and joins
//! them before returning. Nothing outlives the call.

use crossbeam_channel::bounded;
use tracing::debug;

/// Thread count and name prefix for parallel maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerPool {
    threads: usize,
    name: String,
}

impl WorkerPool {
    /// A pool of `threads` workers named `{name}-{i}`. Zero means one per
    /// logical CPU.
    pub fn new(threads: usize, name: impl Into<String>) -> Self {
        let threads = if threads == 0 { num_cpus::get() } else { threads };
        Self {
            threads: threads.max(1),
            name: name.into(),
        }
    }

    /// One worker per logical CPU.
    pub fn with_defaults() -> Self {
        Self::new(0, "bake-worker")
    }

    /// Configured worker count.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Worker name prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `f` over every job and return the results in job order.
    ///
    /// Returns once all workers have joined. A panic in `f` propagates to the
    /// caller.
    pub fn map<T, R, F>(&self, jobs: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        let count = jobs.len();
        if count == 0 {
            return Vec::new();
        }
        let workers = self.threads.min(count);

        // Both channels hold every item, so sends never block.
        let (job_sender, job_receiver) = bounded::<(usize, T)>(count);
        let (result_sender, result_receiver) = bounded::<(usize, R)>(count);
        for job in jobs.into_iter().enumerate() {
            let _ = job_sender.send(job);
        }
        drop(job_sender);

        debug!(jobs = count, workers, pool = %self.name, "dispatching jobs");
        let f = &f;
        std::thread::scope(|scope| {
            for i in 0..workers {
                let receiver = job_receiver.clone();
                let sender = result_sender.clone();
                std::thread::Builder::new()
                    .name(format!("{}-{i}", self.name))
                    .spawn_scoped(scope, move || {
                        while let Ok((index, job)) = receiver.recv() {
                            let _ = sender.send((index, f(job)));
                        }
                    })
                    .expect("Failed to spawn bake worker thread");
            }
        });
        drop(result_sender);

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(count).collect();
        for (index, result) in result_receiver.try_iter() {
            slots[index] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use rustc_hash::FxHashSet;

    use super::*;

    #[test]
    fn test_results_keep_job_order() {
        let pool = WorkerPool::new(4, "test");
        let jobs: Vec<u64> = (0..100).collect();
        let results = pool.map(jobs, |n| {
            // Later jobs finish first.
            std::thread::sleep(Duration::from_micros(100 - n));
            n * n
        });
        assert_eq!(results, (0..100).map(|n| n * n).collect::<Vec<_>>());
    }

    #[test]
    fn test_workers_are_named() {
        let pool = WorkerPool::new(3, "tiler");
        let names = Mutex::new(FxHashSet::default());
        pool.map((0..30).collect(), |_: i32| {
            let name = std::thread::current().name().map(str::to_string);
            names.lock().unwrap().insert(name);
            std::thread::sleep(Duration::from_millis(1));
        });
        let names = names.into_inner().unwrap();
        assert!(!names.is_empty() && names.len() <= 3);
        for name in names {
            assert!(name.unwrap().starts_with("tiler-"));
        }
    }

    #[test]
    fn test_empty_job_list() {
        let pool = WorkerPool::new(2, "idle");
        let results: Vec<i32> = pool.map(Vec::<i32>::new(), |n| n);
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_threads_means_all_cpus() {
        assert_eq!(WorkerPool::new(0, "auto").threads(), num_cpus::get().max(1));
        assert_eq!(WorkerPool::new(5, "fixed").threads(), 5);
    }

    #[test]
    #[should_panic]
    fn test_worker_panic_propagates() {
        WorkerPool::new(2, "boom").map((0..8).collect(), |n: i32| {
            assert!(n != 3, "job 3 failed");
            n
        });
    }
}
