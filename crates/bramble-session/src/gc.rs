//! Background expiry sweeps.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::manager::Manager;

/// Handle to a running sweep task started by [`Manager::spawn_gc`].
///
/// The task stops when [`shutdown`](GcTask::shutdown) is called, when this
/// handle is dropped, or when the last `Arc<Manager>` goes away.
#[derive(Debug)]
pub struct GcTask {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl GcTask {
    /// Stop the task and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Token that stops the task when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for GcTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl Manager {
    /// Start sweeping expired sessions every `gc_interval`.
    ///
    /// The first sweep runs immediately. The task holds only a weak
    /// reference, so it cannot keep a dropped manager alive.
    pub fn spawn_gc(self: &Arc<Self>) -> GcTask {
        let token = CancellationToken::new();
        let period = self.config().gc_interval();
        let manager = Arc::downgrade(self);
        let stop = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        debug!("Session sweep stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let Some(manager) = manager.upgrade() else {
                            debug!("Session manager dropped, sweep exiting");
                            break;
                        };
                        let evicted = manager.gc();
                        if evicted > 0 {
                            info!(evicted, remaining = manager.provider().len(), "Expired sessions collected");
                        } else {
                            trace!("Session sweep found nothing to collect");
                        }
                    }
                }
            }
        });

        debug!(interval_ms = period.as_millis() as u64, "Session sweep started");

        GcTask {
            token,
            handle: Some(handle),
        }
    }
}
