//! Cache Module
//!
//! Provides an in-memory TTL cache with lazy expiration on read, a
//! background sweeper, and atomic operation statistics.

mod entry;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::TtlCache;

pub(crate) use store::{sweep, CacheState};

// == Public Constants ==
/// Period between two background sweeps when none is configured
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest period the sweeper accepts; tokio intervals reject zero
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

// == Cache Config ==
/// Construction parameters of a [`TtlCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Time between two sweeps of expired entries
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the given sweep interval, clamped to
    /// [`MIN_SWEEP_INTERVAL`].
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            sweep_interval: sweep_interval.max(MIN_SWEEP_INTERVAL),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }
}
