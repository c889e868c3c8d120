//! Background scheduled tasks for the application.
//!
//! Currently this is the fulfillment forfeiture sweep: prize fulfillments
//! stuck with an invalid address or an unresponsive winner past the grace
//! period are forfeited automatically. Call `spawn_all` once during startup.

use crate::config::FulfillmentConfig;
use crate::services::FulfillmentService;

/// Spawn all background tasks.
///
/// Notes
/// - The sweep is idempotent: forfeited records are terminal and skipped.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(fulfillment_service: FulfillmentService, config: FulfillmentConfig) {
    // 宽限期没收扫描
    {
        let svc = fulfillment_service.clone();
        let interval = config.sweep_interval_secs;
        tokio::spawn(async move {
            loop {
                match svc.forfeit_overdue().await {
                    Ok(n) if n > 0 => log::info!("Overdue fulfillments forfeited: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to sweep overdue fulfillments: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
            }
        });
    }
}
