//! In-memory store

use super::{DroneStore, StoreError};
use async_trait::async_trait;
use dispatch_shared::{Drone, DroneModel, DroneState, LoadCount, LoadedMedication, Medication};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    drones: HashMap<String, Drone>,
    models: HashMap<DroneModel, Decimal>,
    medications: HashMap<String, Medication>,
    /// (serial number, medication code) -> count, always >= 1
    loads: HashMap<(String, String), u64>,
}

impl Tables {
    fn with_default_models() -> Self {
        let models = DroneModel::ALL
            .into_iter()
            .map(|model| (model, model.default_weight_limit()))
            .collect();

        Self {
            models,
            ..Default::default()
        }
    }
}

/// Store holding every table in process memory
///
/// All tables sit behind one `RwLock`, so each trait call observes and
/// produces a consistent snapshot.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store with the default model weight limits
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::with_default_models()),
        }
    }

    /// Add or replace a catalog entry
    pub async fn put_medication(&self, medication: Medication) {
        let mut tables = self.tables.write().await;
        tables.medications.insert(medication.code.clone(), medication);
    }

    /// Override a model's weight limit
    pub async fn put_model_limit(&self, model: DroneModel, weight_limit: Decimal) {
        self.tables.write().await.models.insert(model, weight_limit);
    }

    /// Number of registered drones
    pub async fn drone_count(&self) -> usize {
        self.tables.read().await.drones.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DroneStore for MemoryStore {
    async fn get_drone(&self, serial_number: &str) -> Result<Option<Drone>, StoreError> {
        Ok(self.tables.read().await.drones.get(serial_number).cloned())
    }

    async fn insert_drone(&self, drone: Drone) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.drones.contains_key(&drone.serial_number) {
            return Err(StoreError::Conflict(format!(
                "drone '{}'",
                drone.serial_number
            )));
        }
        tables.drones.insert(drone.serial_number.clone(), drone);
        Ok(())
    }

    async fn loaded_medications(
        &self,
        serial_number: &str,
    ) -> Result<Vec<LoadedMedication>, StoreError> {
        let tables = self.tables.read().await;

        let mut loaded = Vec::new();
        for ((serial, code), count) in &tables.loads {
            if serial != serial_number {
                continue;
            }
            let medication = tables
                .medications
                .get(code)
                .ok_or_else(|| StoreError::Missing(format!("medication '{}'", code)))?;
            loaded.push(LoadedMedication {
                medication: medication.clone(),
                count: *count,
            });
        }

        loaded.sort_by(|a, b| a.medication.code.cmp(&b.medication.code));
        Ok(loaded)
    }

    async fn drone_model_limit(&self, model: DroneModel) -> Result<Option<Decimal>, StoreError> {
        Ok(self.tables.read().await.models.get(&model).copied())
    }

    async fn find_medications_by_codes(
        &self,
        codes: &[String],
    ) -> Result<Vec<Medication>, StoreError> {
        let tables = self.tables.read().await;
        Ok(codes
            .iter()
            .filter_map(|code| tables.medications.get(code).cloned())
            .collect())
    }

    async fn get_load_count(
        &self,
        serial_number: &str,
        code: &str,
    ) -> Result<Option<u64>, StoreError> {
        let key = (serial_number.to_string(), code.to_string());
        Ok(self.tables.read().await.loads.get(&key).copied())
    }

    async fn upsert_load_counts(&self, counts: &[LoadCount]) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        // Validate the whole batch before touching anything
        for entry in counts {
            if entry.count == 0 {
                return Err(StoreError::Backend(format!(
                    "load count for ('{}', '{}') must be positive",
                    entry.serial_number, entry.code
                )));
            }
            if !tables.drones.contains_key(&entry.serial_number) {
                return Err(StoreError::Missing(format!("drone '{}'", entry.serial_number)));
            }
            if !tables.medications.contains_key(&entry.code) {
                return Err(StoreError::Missing(format!("medication '{}'", entry.code)));
            }
        }

        for entry in counts {
            tables
                .loads
                .insert((entry.serial_number.clone(), entry.code.clone()), entry.count);
        }
        Ok(())
    }

    async fn set_drone_state(
        &self,
        serial_number: &str,
        state: DroneState,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let drone = tables
            .drones
            .get_mut(serial_number)
            .ok_or_else(|| StoreError::Missing(format!("drone '{}'", serial_number)))?;
        drone.state = state;
        Ok(())
    }

    async fn find_available_drones(
        &self,
        states: &[DroneState],
        min_battery: Decimal,
    ) -> Result<Vec<Drone>, StoreError> {
        let tables = self.tables.read().await;
        let mut drones: Vec<Drone> = tables
            .drones
            .values()
            .filter(|d| states.contains(&d.state) && d.battery_level >= min_battery)
            .cloned()
            .collect();

        drones.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
        Ok(drones)
    }

    async fn get_battery_level(&self, serial_number: &str) -> Result<Option<Decimal>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .drones
            .get(serial_number)
            .map(|d| d.battery_level))
    }

    async fn all_battery_levels(&self) -> Result<BTreeMap<String, Decimal>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .drones
            .values()
            .map(|d| (d.serial_number.clone(), d.battery_level))
            .collect())
    }

    async fn drones_in_state(&self, state: DroneState) -> Result<Vec<String>, StoreError> {
        let mut serials: Vec<String> = self
            .tables
            .read()
            .await
            .drones
            .values()
            .filter(|d| d.state == state)
            .map(|d| d.serial_number.clone())
            .collect();

        serials.sort();
        Ok(serials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medication(code: &str, weight: i64) -> Medication {
        Medication {
            code: code.into(),
            name: format!("Medication {}", code),
            weight_gr: Decimal::from(weight),
            image: None,
        }
    }

    fn load(serial: &str, code: &str, count: u64) -> LoadCount {
        LoadCount {
            serial_number: serial.into(),
            code: code.into(),
            count,
        }
    }

    async fn store_with_drone() -> MemoryStore {
        let store = MemoryStore::new();
        store.put_medication(medication("M1", 10)).await;
        store.put_medication(medication("M2", 20)).await;
        store
            .insert_drone(Drone::new("D1", DroneModel::Heavyweight))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_default_model_limits() {
        let store = MemoryStore::new();
        for model in DroneModel::ALL {
            assert_eq!(
                store.drone_model_limit(model).await.unwrap(),
                Some(model.default_weight_limit())
            );
        }
    }

    #[tokio::test]
    async fn test_insert_duplicate_conflicts() {
        let store = store_with_drone().await;
        let result = store.insert_drone(Drone::new("D1", DroneModel::Lightweight)).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        // Original record untouched
        let drone = store.get_drone("D1").await.unwrap().unwrap();
        assert_eq!(drone.model, DroneModel::Heavyweight);
    }

    #[tokio::test]
    async fn test_upsert_is_all_or_nothing() {
        let store = store_with_drone().await;

        let result = store
            .upsert_load_counts(&[load("D1", "M1", 3), load("D1", "MISSING", 1)])
            .await;
        assert!(matches!(result, Err(StoreError::Missing(_))));
        assert_eq!(store.get_load_count("D1", "M1").await.unwrap(), None);

        store
            .upsert_load_counts(&[load("D1", "M1", 3), load("D1", "M2", 1)])
            .await
            .unwrap();
        store.upsert_load_counts(&[load("D1", "M1", 5)]).await.unwrap();

        let loaded = store.loaded_medications("D1").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].medication.code, "M1");
        assert_eq!(loaded[0].count, 5);
        assert_eq!(loaded[1].count, 1);
    }

    #[tokio::test]
    async fn test_upsert_rejects_zero_count() {
        let store = store_with_drone().await;
        let result = store.upsert_load_counts(&[load("D1", "M1", 0)]).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_find_medications_skips_unknown_codes() {
        let store = store_with_drone().await;
        let found = store
            .find_medications_by_codes(&["M2".into(), "NOPE".into(), "M1".into()])
            .await
            .unwrap();
        let codes: Vec<_> = found.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["M2", "M1"]);
    }

    #[tokio::test]
    async fn test_available_drones_filter() {
        let store = store_with_drone().await;
        let mut low = Drone::new("D2", DroneModel::Lightweight);
        low.battery_level = Decimal::from(24);
        store.insert_drone(low).await.unwrap();
        let mut flying = Drone::new("D3", DroneModel::Lightweight);
        flying.state = DroneState::Delivering;
        store.insert_drone(flying).await.unwrap();
        let mut edge = Drone::new("D4", DroneModel::Lightweight);
        edge.battery_level = Decimal::from(25);
        edge.state = DroneState::Loaded;
        store.insert_drone(edge).await.unwrap();

        let available = store
            .find_available_drones(&[DroneState::Idle, DroneState::Loaded], Decimal::from(25))
            .await
            .unwrap();
        let serials: Vec<_> = available.iter().map(|d| d.serial_number.as_str()).collect();
        assert_eq!(serials, vec!["D1", "D4"]);
    }

    #[tokio::test]
    async fn test_set_state_on_missing_drone() {
        let store = MemoryStore::new();
        let result = store.set_drone_state("ghost", DroneState::Loading).await;
        assert!(matches!(result, Err(StoreError::Missing(_))));
    }
}
