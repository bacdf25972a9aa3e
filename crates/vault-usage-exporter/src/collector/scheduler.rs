use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::obs::metrics::ExporterMetrics;
use crate::vault::VaultApi;

use super::Collector;

/// Spawn the refresh loop: one eager cycle, then one per `interval`.
///
/// Cycles run inline in the loop, so a slow cycle delays the next tick
/// instead of overlapping with it. The task exits when the collector's
/// cancellation token fires.
pub fn spawn_scheduler<A: VaultApi>(
    collector: Arc<Collector<A>>,
    interval: Duration,
    metrics: Arc<ExporterMetrics>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let token = collector.cancel_token().clone();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_ms = interval.as_millis() as u64, "refresh scheduler started");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("refresh scheduler shutting down");
                    break;
                }
                // the first tick completes immediately: that is the startup refresh
                _ = ticker.tick() => {
                    let result = collector.refresh().await;
                    if token.is_cancelled() {
                        continue;
                    }
                    metrics.record_refresh(result.is_ok());
                    if let Err(e) = result {
                        tracing::warn!(class = e.class().as_str(), error = %e, "refresh cycle degraded");
                    }
                }
            }
        }
    })
}
