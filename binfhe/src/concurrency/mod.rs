//! Dispatch of independent bootstraps and gates onto a worker pool, with
//! one key replica per memory domain.

pub mod alloc;
pub mod evaluator;
pub mod pool;
pub mod replicas;
pub mod scheduler;

pub use alloc::{AlignedBuffer, Allocator, SystemAllocator};
pub use evaluator::ParallelEvaluator;
pub use pool::WorkerPool;
pub use replicas::KeyReplicas;
pub use scheduler::Scheduler;

use std::env;

/// Worker count and number of memory domains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub threads: usize,
    /// Number of key replicas; 1 disables replication.
    pub domains: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            domains: 1,
        }
    }
}

impl PoolConfig {
    /// Reads `FHE_THREADS` and `FHE_NUMA` (`0` or `off` disables replicas,
    /// a number sets the domain count). Unparsable values fall back to the
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_values(env::var("FHE_THREADS").ok().as_deref(), env::var("FHE_NUMA").ok().as_deref())
    }

    pub fn from_values(threads: Option<&str>, numa: Option<&str>) -> Self {
        let default: PoolConfig = Self::default();
        let threads: usize = match threads.map(|t| t.trim().parse::<usize>()) {
            Some(Ok(t)) if t > 0 => t,
            Some(_) => {
                tracing::warn!(value = threads, "ignoring FHE_THREADS");
                default.threads
            }
            None => default.threads,
        };
        let domains: usize = match numa.map(|v| v.trim().to_ascii_lowercase()) {
            None => default.domains,
            Some(v) if v == "off" || v == "0" => 1,
            Some(v) => match v.parse::<usize>() {
                Ok(d) if d > 0 => d,
                _ => {
                    tracing::warn!(value = %v, "ignoring FHE_NUMA");
                    default.domains
                }
            },
        };
        Self { threads, domains }
    }
}

#[cfg(test)]
mod tests {
    use super::PoolConfig;

    #[test]
    fn values_override_defaults() {
        let c: PoolConfig = PoolConfig::from_values(Some("3"), Some("2"));
        assert_eq!(c, PoolConfig { threads: 3, domains: 2 });
        let c: PoolConfig = PoolConfig::from_values(Some("x"), Some("off"));
        assert_eq!(c.threads, PoolConfig::default().threads);
        assert_eq!(c.domains, 1);
        assert_eq!(PoolConfig::from_values(None, Some("0")).domains, 1);
        assert_eq!(PoolConfig::from_values(Some("0"), None).threads, PoolConfig::default().threads);
    }
}
