//! Domain value types
//!
//! Drones, the medication catalog and load quantities as seen by the
//! dispatch engine. Persistence and wire formats convert to and from these.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an enumerated name fails
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Lifecycle state of a drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneState {
    /// Empty and available
    Idle,
    /// Load attempt in progress
    Loading,
    /// Carrying medications, available for more loading or dispatch
    Loaded,
    /// In flight towards a delivery
    Delivering,
    /// In flight back to base
    Returning,
}

impl DroneState {
    pub const ALL: [DroneState; 5] = [
        DroneState::Idle,
        DroneState::Loading,
        DroneState::Loaded,
        DroneState::Delivering,
        DroneState::Returning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DroneState::Idle => "IDLE",
            DroneState::Loading => "LOADING",
            DroneState::Loaded => "LOADED",
            DroneState::Delivering => "DELIVERING",
            DroneState::Returning => "RETURNING",
        }
    }
}

impl fmt::Display for DroneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DroneState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DroneState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "drone state",
                value: s.to_string(),
            })
    }
}

/// Drone model. Each model has a fixed weight limit in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneModel {
    Lightweight,
    Middleweight,
    Cruiserweight,
    Heavyweight,
}

impl DroneModel {
    pub const ALL: [DroneModel; 4] = [
        DroneModel::Lightweight,
        DroneModel::Middleweight,
        DroneModel::Cruiserweight,
        DroneModel::Heavyweight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DroneModel::Lightweight => "LIGHTWEIGHT",
            DroneModel::Middleweight => "MIDDLEWEIGHT",
            DroneModel::Cruiserweight => "CRUISERWEIGHT",
            DroneModel::Heavyweight => "HEAVYWEIGHT",
        }
    }

    /// Weight limit used when the store has no explicit entry for the model
    pub fn default_weight_limit(&self) -> Decimal {
        match self {
            DroneModel::Lightweight => Decimal::from(125),
            DroneModel::Middleweight => Decimal::from(250),
            DroneModel::Cruiserweight => Decimal::from(375),
            DroneModel::Heavyweight => Decimal::from(500),
        }
    }
}

impl fmt::Display for DroneModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DroneModel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DroneModel::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "drone model",
                value: s.to_string(),
            })
    }
}

/// A registered drone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub serial_number: String,
    pub model: DroneModel,
    pub battery_level: Decimal,
    pub state: DroneState,
}

impl Drone {
    /// A freshly registered drone: idle with a full battery
    pub fn new(serial_number: impl Into<String>, model: DroneModel) -> Self {
        Self {
            serial_number: serial_number.into(),
            model,
            battery_level: Decimal::from(crate::loading::INITIAL_BATTERY_PERCENT),
            state: DroneState::Idle,
        }
    }
}

/// Medication catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub code: String,
    pub name: String,
    pub weight_gr: Decimal,
    #[serde(default)]
    pub image: Option<Vec<u8>>,
}

/// One line of a load manifest as supplied by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadItem {
    pub code: String,
    pub count: i64,
}

impl LoadItem {
    pub fn new(code: impl Into<String>, count: i64) -> Self {
        Self {
            code: code.into(),
            count,
        }
    }
}

/// A catalog entry together with the quantity currently on a drone
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMedication {
    pub medication: Medication,
    pub count: u64,
}

/// Cumulative quantity of one medication on one drone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadCount {
    pub serial_number: String,
    pub code: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names_roundtrip() {
        for state in DroneState::ALL {
            assert_eq!(state.as_str().parse::<DroneState>().unwrap(), state);
        }
        assert!("idle".parse::<DroneState>().is_err());
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let err = "FEATHERWEIGHT".parse::<DroneModel>().unwrap_err();
        assert_eq!(err.kind, "drone model");
        assert_eq!(err.to_string(), "Unknown drone model: 'FEATHERWEIGHT'");
    }

    #[test]
    fn test_new_drone_is_idle_with_full_battery() {
        let drone = Drone::new("D1", DroneModel::Heavyweight);
        assert_eq!(drone.state, DroneState::Idle);
        assert_eq!(drone.battery_level, Decimal::from(100));
        assert_eq!(drone.model.default_weight_limit(), Decimal::from(500));
    }
}
