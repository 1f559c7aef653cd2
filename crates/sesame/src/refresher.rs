//! Background token refresh scheduling.

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::manager::SessionManager;

/// Handle to the background refresh task.
///
/// Dropping the handle aborts the task; keep it alive for as long as the
/// session should stay refreshed.
#[derive(Debug)]
pub struct RefresherHandle {
    handle: JoinHandle<()>,
}

impl RefresherHandle {
    /// Stop the background task now.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for RefresherHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl SessionManager {
    /// Spawn the background refresh scheduler.
    ///
    /// The task wakes at the configured check interval and triggers one
    /// refresh when the session expires within the lead window; a tick
    /// during a pending refresh is a no-op. The task runs until the
    /// returned handle is dropped.
    pub fn spawn_refresher(&self) -> RefresherHandle {
        let manager = self.clone();
        let check_interval = manager.config().check_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = interval(check_interval);
            // A delayed tick should not cause a burst of catch-up checks.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if manager.refresh_if_due().await {
                    debug!("Scheduled refresh completed");
                }
            }
        });
        RefresherHandle { handle }
    }
}
