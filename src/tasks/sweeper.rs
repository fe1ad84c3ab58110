//! Sweeper Task
//!
//! Background task that periodically evicts stale state from a shared
//! structure (expired cache entries, idle rate-limit identifiers).

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{AppError, Result};

/// Shortest interval a sweeper will tick at.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

// == Sweep Trait ==
/// A structure that can evict its own stale state.
///
/// Implementations must be short and CPU-only: they run inline on the
/// sweeper task while holding the structure's lock.
pub trait Sweep: Send + Sync + 'static {
    /// Evicts stale state, returning how many items were removed.
    fn sweep(&self) -> usize;
}

// == Sweeper Handle ==
/// Owned handle to a running sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Name given at spawn time, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals the loop to stop and waits for it to exit.
    pub async fn stop(self) -> Result<()> {
        let Self {
            name,
            cancel,
            handle,
        } = self;

        cancel.cancel();
        handle
            .await
            .map_err(|e| AppError::Internal(format!("{name} sweeper failed: {e}")))
    }
}

/// Spawns a task that calls `target.sweep()` every `interval` until `cancel`
/// fires.
///
/// The first sweep happens one full interval after spawning. Passing a child
/// of a shared root token lets the host stop every sweeper at once.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheStore::new());
/// let sweeper = spawn_sweeper("page-cache", cache.clone(), Duration::from_secs(300), CancellationToken::new());
/// // Later, during shutdown:
/// sweeper.stop().await?;
/// ```
pub fn spawn_sweeper<S>(
    name: &'static str,
    target: Arc<S>,
    interval: Duration,
    cancel: CancellationToken,
) -> SweeperHandle
where
    S: Sweep + ?Sized,
{
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    let token = cancel.clone();

    let handle = tokio::spawn(async move {
        info!(
            sweeper = name,
            interval_secs = interval.as_secs_f64(),
            "Starting sweeper"
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!(sweeper = name, "Sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = target.sweep();
                    if removed > 0 {
                        info!(sweeper = name, removed, "Sweep removed stale entries");
                    } else {
                        debug!(sweeper = name, "Sweep found nothing stale");
                    }
                }
            }
        }
    });

    SweeperHandle {
        name,
        cancel,
        handle,
    }
}
