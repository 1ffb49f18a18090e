//! Expired Entry Sweeper
//!
//! Background task that periodically evicts expired cache entries until its
//! cache is stopped or dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::{sweep, CacheState, CacheStats};

/// Spawns the sweeper of one cache.
///
/// Every `interval` the task takes the cache's write lock and evicts expired
/// entries. It exits as soon as `shutdown` carries `true` or its sender is
/// dropped. A tick that raced with `stop` still finds the sweeper flag
/// cleared and evicts nothing.
///
/// # Returns
/// The JoinHandle of the task, awaited by `TtlCache::stop`.
pub(crate) fn spawn_sweeper<V>(
    state: Arc<RwLock<CacheState<V>>>,
    stats: Arc<CacheStats>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting sweeper with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let removed = sweep(&state, &stats).await;
                    if removed > 0 {
                        info!("Sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Sweep: no expired entries found");
                    }
                }
            }
        }

        info!("Sweeper stopped");
    })
}
