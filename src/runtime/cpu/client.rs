//! CPU client implementation

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use crate::runtime::RuntimeClient;

#[cfg(feature = "rayon")]
use parking_lot::Mutex;
#[cfg(feature = "rayon")]
use std::collections::HashMap;
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// Default minimum number of queries before work is split across threads
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// CPU client for operation dispatch
///
/// Cloning is cheap; clones share the cache of worker pools.
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    parallel_threshold: usize,
    #[cfg(feature = "rayon")]
    pools: Arc<Mutex<HashMap<usize, Arc<rayon::ThreadPool>>>>,
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        Self {
            device,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            #[cfg(feature = "rayon")]
            pools: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Set the minimum number of queries before a multi-worker call goes parallel
    ///
    /// Smaller calls run on the calling thread regardless of `num_workers`.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    /// Minimum number of queries before work is split across threads
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Whether a call over `work_items` queries with `num_workers` should go parallel
    pub(crate) fn should_parallelize(&self, work_items: usize, num_workers: usize) -> bool {
        cfg!(feature = "rayon") && num_workers > 1 && work_items >= self.parallel_threshold
    }

    /// Run `f` inside a rayon pool of `num_workers` threads
    ///
    /// Pools are built once per worker count and reused. If a pool cannot be
    /// built, `f` runs on the calling thread.
    #[cfg(feature = "rayon")]
    pub(crate) fn install_parallelism<T, F>(&self, num_workers: usize, f: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        let pool = {
            let mut pools = self.pools.lock();
            match pools.get(&num_workers) {
                Some(pool) => Some(Arc::clone(pool)),
                None => match rayon::ThreadPoolBuilder::new()
                    .num_threads(num_workers)
                    .thread_name(|i| format!("topocluster-cpu-{}", i))
                    .build()
                {
                    Ok(pool) => {
                        let pool = Arc::new(pool);
                        pools.insert(num_workers, Arc::clone(&pool));
                        Some(pool)
                    }
                    Err(e) => {
                        log::warn!(
                            "failed to build a {}-thread pool, running serially: {}",
                            num_workers,
                            e
                        );
                        None
                    }
                },
            }
        };

        match pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl Default for CpuClient {
    fn default() -> Self {
        Self::new(CpuDevice::new())
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // CPU operations are synchronous, nothing to do
    }
}
