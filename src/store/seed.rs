//! Seed data loading
//!
//! A seed file is a JSON document with four optional tables:
//! ```json
//! {
//!   "models":      [{ "model": "HEAVYWEIGHT", "weight_limit_gr": "500" }],
//!   "medications": [{ "code": "M1", "name": "Aspirin", "weight_gr": "10" }],
//!   "drones":      [{ "serial_number": "D1", "model": "HEAVYWEIGHT",
//!                     "battery_level": "80", "state": "IDLE" }],
//!   "loads":       [{ "serial_number": "D1", "code": "M1", "count": 4 }]
//! }
//! ```
//! The whole file is validated before anything reaches the store.

use super::{DroneStore, MemoryStore, StoreError};
use dispatch_shared::{loading, Drone, DroneModel, LoadCount, Medication};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed seed data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid seed data: {0}")]
    Invalid(String),

    #[error("Failed to apply seed data: {0}")]
    Store(#[from] StoreError),
}

/// Weight limit override for one model
#[derive(Debug, Clone, Deserialize)]
pub struct ModelLimit {
    pub model: DroneModel,
    pub weight_limit_gr: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub models: Vec<ModelLimit>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub drones: Vec<Drone>,
    #[serde(default)]
    pub loads: Vec<LoadCount>,
}

impl SeedData {
    /// Read and parse a seed file
    pub async fn from_path(path: &Path) -> Result<Self, SeedError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SeedError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Check every data model invariant, stopping at the first violation
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut models = HashSet::new();
        for entry in &self.models {
            if entry.weight_limit_gr <= Decimal::ZERO {
                return Err(invalid(format!(
                    "weight limit of {} must be positive",
                    entry.model
                )));
            }
            if !models.insert(entry.model) {
                return Err(invalid(format!("model {} listed twice", entry.model)));
            }
        }

        let mut codes = HashSet::new();
        for medication in &self.medications {
            if medication.code.trim().is_empty() {
                return Err(invalid("medication code cannot be blank".into()));
            }
            if medication.weight_gr <= Decimal::ZERO {
                return Err(invalid(format!(
                    "weight of medication '{}' must be positive",
                    medication.code
                )));
            }
            if !codes.insert(medication.code.as_str()) {
                return Err(invalid(format!(
                    "medication '{}' listed twice",
                    medication.code
                )));
            }
        }

        let mut serials = HashSet::new();
        for drone in &self.drones {
            if drone.serial_number.trim().is_empty() {
                return Err(invalid("drone serial number cannot be blank".into()));
            }
            if !loading::is_valid_battery_level(drone.battery_level) {
                return Err(invalid(format!(
                    "battery level of drone '{}' is outside [0, 100]: {}",
                    drone.serial_number, drone.battery_level
                )));
            }
            if !serials.insert(drone.serial_number.as_str()) {
                return Err(invalid(format!(
                    "drone '{}' listed twice",
                    drone.serial_number
                )));
            }
        }

        let mut load_keys = HashSet::new();
        for entry in &self.loads {
            if entry.count == 0 {
                return Err(invalid(format!(
                    "load count for ('{}', '{}') must be at least 1",
                    entry.serial_number, entry.code
                )));
            }
            if !serials.contains(entry.serial_number.as_str()) {
                return Err(invalid(format!(
                    "load references unknown drone '{}'",
                    entry.serial_number
                )));
            }
            if !codes.contains(entry.code.as_str()) {
                return Err(invalid(format!(
                    "load references unknown medication '{}'",
                    entry.code
                )));
            }
            if !load_keys.insert((entry.serial_number.as_str(), entry.code.as_str())) {
                return Err(invalid(format!(
                    "load ('{}', '{}') listed twice",
                    entry.serial_number, entry.code
                )));
            }
        }

        Ok(())
    }

    /// Validate, then build a memory store holding this data
    pub async fn into_store(self) -> Result<MemoryStore, SeedError> {
        self.validate()?;

        let store = MemoryStore::new();
        for entry in self.models {
            store.put_model_limit(entry.model, entry.weight_limit_gr).await;
        }
        for medication in self.medications {
            store.put_medication(medication).await;
        }
        for drone in self.drones {
            store.insert_drone(drone).await?;
        }
        store.upsert_load_counts(&self.loads).await?;

        Ok(store)
    }
}

fn invalid(message: String) -> SeedError {
    SeedError::Invalid(message)
}
