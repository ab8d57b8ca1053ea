//! Parallelism configuration for per-module analysis.

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// Controls how modules are scanned and validated concurrently.
///
/// ```rust
/// use modscore::config::ParallelConfig;
///
/// let config = ParallelConfig { enabled: true, jobs: 4 };
/// assert_eq!(config.thread_count(), 4);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Enable parallel processing (default: true)
    ///
    /// When disabled, modules are processed on a single worker.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Worker count, 0 means one per CPU
    #[serde(default)]
    pub jobs: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            jobs: 0,
        }
    }
}

impl ParallelConfig {
    /// Create a config with parallel processing disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            jobs: 1,
        }
    }

    /// Number of worker threads to build the pool with
    pub fn thread_count(&self) -> usize {
        match (self.enabled, self.jobs) {
            (false, _) => 1,
            (true, 0) => num_cpus::get(),
            (true, jobs) => jobs,
        }
    }
}
