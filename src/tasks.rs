//! Periodic refresh trigger.

use crate::history::HistoryService;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Spawns a detached task that refreshes today's rates on a fixed cadence.
/// A failed tick is logged and the task keeps running; it never takes the
/// serving process down with it.
pub fn spawn_refresh(history: Arc<HistoryService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately; skip it so startup does not
        // double up with the last scheduled refresh
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match history.refresh_now().await {
                Ok(()) => info!(
                    "Currency rates are updated at: {}",
                    Utc::now().format("%Y-%m-%d %H:%M:%S")
                ),
                Err(error) => error!(%error, "scheduled rates refresh failed"),
            }
        }
    })
}
