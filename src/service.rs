//! Dispatch service - the operations exposed to transports

use crate::error::{DispatchError, Result};
use crate::loading::{LoadOrchestrator, LoadReceipt};
use crate::store::{DroneStore, StoreError};
use dispatch_shared::{loading, Drone, DroneModel, DroneState, LoadItem, LoadedMedication};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Facade over the store and the load orchestrator
pub struct DispatchService {
    store: Arc<dyn DroneStore>,
    orchestrator: LoadOrchestrator,
}

impl DispatchService {
    pub fn new(store: Arc<dyn DroneStore>) -> Self {
        Self {
            orchestrator: LoadOrchestrator::new(store.clone()),
            store,
        }
    }

    /// Register a new drone. It starts IDLE with a full battery.
    pub async fn register(&self, model: &str, serial_number: &str) -> Result<Drone> {
        if model.is_empty() {
            return Err(DispatchError::InvalidModel(
                "Model of new drone cannot be null".into(),
            ));
        }
        if serial_number.trim().is_empty() {
            return Err(DispatchError::InvalidSerialNumber(
                "Serial number of new drone cannot be blank".into(),
            ));
        }

        let model: DroneModel = model
            .parse()
            .map_err(|_| DispatchError::InvalidModel(format!("Unknown model of drone: {}", model)))?;
        if self.store.drone_model_limit(model).await?.is_none() {
            return Err(DispatchError::InvalidModel(format!(
                "Unknown model of drone: {}",
                model
            )));
        }

        if self.store.get_drone(serial_number).await?.is_some() {
            return Err(DispatchError::DroneAlreadyExists(serial_number.to_string()));
        }

        let drone = Drone::new(serial_number, model);
        match self.store.insert_drone(drone.clone()).await {
            Ok(()) => {}
            // Lost a race with another registration of the same serial
            Err(StoreError::Conflict(_)) => {
                return Err(DispatchError::DroneAlreadyExists(serial_number.to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        info!("[REGISTER] Registered {} drone {}", model, serial_number);
        Ok(drone)
    }

    /// Load a drone with a manifest
    pub async fn load_drone(&self, serial_number: &str, items: &[LoadItem]) -> Result<LoadReceipt> {
        self.orchestrator.load_drone(serial_number, items).await
    }

    /// Medications currently on a drone, sorted by code
    pub async fn get_medications(&self, serial_number: &str) -> Result<Vec<LoadedMedication>> {
        self.require_drone(serial_number).await?;
        Ok(self.store.loaded_medications(serial_number).await?)
    }

    /// Drones that may be loaded right now, sorted by serial number
    pub async fn get_available_drones(&self) -> Result<Vec<Drone>> {
        let drones = self
            .store
            .find_available_drones(&loading::LOADABLE_STATES, loading::min_battery_level())
            .await?;
        debug!("{} drone(s) available for loading", drones.len());
        Ok(drones)
    }

    pub async fn get_battery_level(&self, serial_number: &str) -> Result<Decimal> {
        self.store
            .get_battery_level(serial_number)
            .await?
            .ok_or_else(|| DispatchError::DroneNotFound(serial_number.to_string()))
    }

    /// Battery level of every drone, keyed by serial number
    pub async fn battery_levels(&self) -> Result<BTreeMap<String, Decimal>> {
        Ok(self.store.all_battery_levels().await?)
    }

    /// Drones left in LOADING, which only happens when a rollback never ran
    pub async fn drones_parked_in_loading(&self) -> Result<Vec<String>> {
        let parked = self.store.drones_in_state(DroneState::Loading).await?;
        for serial_number in &parked {
            warn!(
                "[STARTUP] Drone {} is parked in {}; it needs manual recovery",
                serial_number,
                DroneState::Loading
            );
        }
        Ok(parked)
    }

    async fn require_drone(&self, serial_number: &str) -> Result<Drone> {
        self.store
            .get_drone(serial_number)
            .await?
            .ok_or_else(|| DispatchError::DroneNotFound(serial_number.to_string()))
    }
}
