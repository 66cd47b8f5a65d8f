//! Background scheduled tasks for the application.
//!
//! The only recurring job is the renewal/expiration sweep. Call
//! `spawn_all` once during startup to launch it.

use crate::config::BillingConfig;
use crate::services::SweepService;
use chrono::Utc;

/// Spawn all background tasks.
///
/// Notes
/// - The sweep is idempotent; overlapping or repeated passes converge on
///   the same snapshots and never double-bill a cycle.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(sweep_service: SweepService, billing_config: BillingConfig) {
    let interval = std::time::Duration::from_secs(billing_config.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        loop {
            match sweep_service.run(Utc::now()).await {
                Ok(report) => {
                    if !report.transitions.is_empty() || report.failed > 0 {
                        log::info!(
                            "Sweep evaluated {} subscriptions: {} transitions, {} failures",
                            report.scanned,
                            report.transitions.len(),
                            report.failed
                        );
                    }
                }
                Err(e) => log::error!("Sweep pass failed: {e:?}"),
            }
            tokio::time::sleep(interval).await;
        }
    });
}
