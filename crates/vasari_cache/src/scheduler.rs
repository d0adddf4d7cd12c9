//! Periodic sweep scheduling.

use crate::TimedCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use vasari_core::Entity;

/// Recurring timer that runs the staleness sweep off the request path.
///
/// The scheduler moves between two states: stopped and running. While
/// running, a background task fires [`TimedCache::sweep`] once per
/// period; each firing is independent, and no firing can end the
/// schedule. Stopping signals the task and then awaits it, so a sweep
/// that is mid-flight completes before [`EvictionScheduler::stop`]
/// returns. A stopped scheduler can be started again.
///
/// # Examples
///
/// ```rust,ignore
/// let cache = Arc::new(TimedCache::new(CacheConfig::default())?);
/// let mut scheduler = EvictionScheduler::new();
/// scheduler.start(cache.clone(), cache.config().sweep_interval());
/// // ... serve traffic ...
/// scheduler.stop().await;
/// ```
pub struct EvictionScheduler {
    handle: Option<tokio::task::JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl EvictionScheduler {
    /// Create a scheduler in the stopped state.
    pub fn new() -> Self {
        Self {
            handle: None,
            shutdown: None,
        }
    }

    /// Whether the sweep task is currently running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the sweep task with the given period.
    ///
    /// Starting a running scheduler is a warn-level no-op; the existing
    /// task keeps its period.
    pub fn start<E: Entity>(&mut self, cache: Arc<TimedCache<E>>, period: Duration) {
        if self.is_running() {
            warn!("Eviction scheduler already running");
            return;
        }

        info!(period_secs = period.as_secs(), "Starting eviction scheduler");
        let (tx, mut rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval yields immediately on the first tick; consume it so
            // the first sweep lands one full period after start
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.sweep();
                        if removed > 0 {
                            debug!(removed, "Sweep cycle removed stale entries");
                        }
                    }
                    _ = rx.changed() => {
                        info!("Eviction scheduler draining");
                        break;
                    }
                }
            }
        });

        self.handle = Some(handle);
        self.shutdown = Some(tx);
    }

    /// Signal the sweep task and wait for it to finish.
    ///
    /// Stopping a stopped scheduler is a no-op.
    pub async fn stop(&mut self) {
        let Some(tx) = self.shutdown.take() else {
            return;
        };
        // the receiver only disappears if the task already exited
        let _ = tx.send(true);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(error = ?e, "Eviction scheduler task failed");
            }
        }
        info!("Eviction scheduler stopped");
    }
}

impl Default for EvictionScheduler {
    fn default() -> Self {
        Self::new()
    }
}
