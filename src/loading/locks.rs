//! Per-drone serialization of load attempts

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per drone serial number
///
/// Holding the guard returned by `acquire` excludes every other load
/// attempt on the same drone. Entries nobody holds or waits on are pruned
/// whenever a new serial number is inserted.
pub struct DroneLocks {
    /// Map of serial_number -> drone lock
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DroneLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to one drone
    pub async fn acquire(&self, serial_number: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if !locks.contains_key(serial_number) {
                // The map's own reference is the only one left for idle entries
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(serial_number.to_string()).or_default().clone()
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

impl Default for DroneLocks {
    fn default() -> Self {
        Self::new()
    }
}
