//! Persistence for drones, models, the medication catalog and load counts
//!
//! This module handles:
//! - The `DroneStore` trait the dispatch core is written against
//! - An in-memory implementation guarded by a single async lock
//! - Loading seed data from a JSON file at startup

mod memory;
mod seed;

pub use memory::MemoryStore;
pub use seed::SeedData;

use async_trait::async_trait;
use dispatch_shared::{Drone, DroneModel, DroneState, LoadCount, LoadedMedication, Medication};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by a store backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Record not found: {0}")]
    Missing(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Storage backend for the dispatch core
///
/// Every method is its own durable unit. `set_drone_state` in particular
/// commits independently of any other call in flight, and
/// `upsert_load_counts` applies all of its entries or none of them.
#[async_trait]
pub trait DroneStore: Send + Sync {
    /// Fetch a drone by serial number
    async fn get_drone(&self, serial_number: &str) -> Result<Option<Drone>, StoreError>;

    /// Insert a new drone, failing with `Conflict` if the serial exists
    async fn insert_drone(&self, drone: Drone) -> Result<(), StoreError>;

    /// Catalog entries and counts currently loaded on a drone
    async fn loaded_medications(
        &self,
        serial_number: &str,
    ) -> Result<Vec<LoadedMedication>, StoreError>;

    /// Weight limit of a model in grams
    async fn drone_model_limit(&self, model: DroneModel) -> Result<Option<Decimal>, StoreError>;

    /// Catalog entries whose codes appear in `codes`; absent codes are skipped
    async fn find_medications_by_codes(
        &self,
        codes: &[String],
    ) -> Result<Vec<Medication>, StoreError>;

    /// Quantity of one medication on one drone
    async fn get_load_count(
        &self,
        serial_number: &str,
        code: &str,
    ) -> Result<Option<u64>, StoreError>;

    /// Write cumulative counts as one all-or-nothing batch
    async fn upsert_load_counts(&self, counts: &[LoadCount]) -> Result<(), StoreError>;

    /// Persist a drone's lifecycle state
    async fn set_drone_state(&self, serial_number: &str, state: DroneState)
        -> Result<(), StoreError>;

    /// Drones in any of `states` whose battery is at least `min_battery`
    async fn find_available_drones(
        &self,
        states: &[DroneState],
        min_battery: Decimal,
    ) -> Result<Vec<Drone>, StoreError>;

    /// Battery level of one drone
    async fn get_battery_level(&self, serial_number: &str) -> Result<Option<Decimal>, StoreError>;

    /// Battery level of every drone, keyed by serial number
    async fn all_battery_levels(&self) -> Result<BTreeMap<String, Decimal>, StoreError>;

    /// Serial numbers of drones currently in `state`
    async fn drones_in_state(&self, state: DroneState) -> Result<Vec<String>, StoreError>;
}
