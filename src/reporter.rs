//! Battery Reporter
//!
//! Background task that periodically logs the battery level of every drone.

use crate::error::Result;
use crate::service::DispatchService;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

pub struct BatteryReporter {
    service: Arc<DispatchService>,
    period: Duration,
}

impl BatteryReporter {
    pub fn new(service: Arc<DispatchService>, period: Duration) -> Self {
        Self { service, period }
    }

    /// Spawn the reporting loop. The first report is logged immediately.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.report_once().await {
                    warn!("[BATTERY] Failed to read battery levels: {}", e);
                }
            }
        })
    }

    /// Log one line per drone, or `[]` for an empty fleet
    pub async fn report_once(&self) -> Result<Vec<String>> {
        let levels = self.service.battery_levels().await?;
        if levels.is_empty() {
            info!("[BATTERY] []");
            return Ok(Vec::new());
        }

        let lines: Vec<String> = levels
            .iter()
            .map(|(serial, level)| format!("Serial number: '{}' - Battery level: {}", serial, level))
            .collect();
        for line in &lines {
            info!("[BATTERY] {}", line);
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DroneStore, MemoryStore};
    use dispatch_shared::{Drone, DroneModel};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_empty_fleet() {
        let service = Arc::new(DispatchService::new(Arc::new(MemoryStore::new())));
        let reporter = BatteryReporter::new(service, Duration::from_secs(300));
        assert!(reporter.report_once().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_lines() {
        let store = Arc::new(MemoryStore::new());
        let mut drone = Drone::new("D2", DroneModel::Lightweight);
        drone.battery_level = Decimal::new(425, 1);
        store.insert_drone(drone).await.unwrap();
        store
            .insert_drone(Drone::new("D1", DroneModel::Heavyweight))
            .await
            .unwrap();

        let reporter = BatteryReporter::new(
            Arc::new(DispatchService::new(store)),
            Duration::from_secs(300),
        );
        let lines = reporter.report_once().await.unwrap();
        assert_eq!(
            lines,
            vec![
                "Serial number: 'D1' - Battery level: 100",
                "Serial number: 'D2' - Battery level: 42.5",
            ]
        );
    }

    #[tokio::test]
    async fn test_loop_keeps_running() {
        let service = Arc::new(DispatchService::new(Arc::new(MemoryStore::new())));
        let handle = BatteryReporter::new(service, Duration::from_millis(10)).start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
