//! Error taxonomy for the dispatch core
//!
//! Every failure surfaced to a transport is a `DispatchError`. The transport
//! decides how a kind maps onto its own status codes.

use crate::store::StoreError;
use dispatch_shared::{loading, DroneState};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Discriminant of a `DispatchError`, stable across message changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DroneNotFound,
    DroneAlreadyExists,
    InvalidModel,
    InvalidSerialNumber,
    EmptyManifest,
    DuplicateMedicationCodes,
    InvalidMedicationCounts,
    UnknownMedicationCodes,
    OverweightLoad,
    InsufficientBattery,
    IllegalState,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DroneNotFound => "DroneNotFound",
            ErrorKind::DroneAlreadyExists => "DroneAlreadyExists",
            ErrorKind::InvalidModel => "InvalidModel",
            ErrorKind::InvalidSerialNumber => "InvalidSerialNumber",
            ErrorKind::EmptyManifest => "EmptyManifest",
            ErrorKind::DuplicateMedicationCodes => "DuplicateMedicationCodes",
            ErrorKind::InvalidMedicationCounts => "InvalidMedicationCounts",
            ErrorKind::UnknownMedicationCodes => "UnknownMedicationCodes",
            ErrorKind::OverweightLoad => "OverweightLoad",
            ErrorKind::InsufficientBattery => "InsufficientBattery",
            ErrorKind::IllegalState => "IllegalState",
            ErrorKind::Storage => "Storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("There isn't drone with serial number: '{0}'")]
    DroneNotFound(String),

    #[error("Drone with serial number '{0}' already exists")]
    DroneAlreadyExists(String),

    #[error("{0}")]
    InvalidModel(String),

    #[error("{0}")]
    InvalidSerialNumber(String),

    #[error("Medications list for loading cannot be empty")]
    EmptyManifest,

    #[error("Gotten duplicate medications codes: {}", .0.join(","))]
    DuplicateMedicationCodes(Vec<String>),

    #[error("Gotten wrong medicine counts for loading: {}", format_counts(.0))]
    InvalidMedicationCounts(Vec<(String, i64)>),

    #[error("Medications with codes {} don't exist", .0.join(","))]
    UnknownMedicationCodes(Vec<String>),

    #[error(
        "Error while loading drone with serial number: '{serial_number}'. \
         Medications total weight is {requested_weight} and available free space is {free_space}"
    )]
    OverweightLoad {
        serial_number: String,
        free_space: Decimal,
        requested_weight: Decimal,
    },

    #[error(
        "Couldn't load the drone with serial number '{serial_number}', \
         because level of battery is {battery_level}% and lower than {}%",
        loading::MIN_BATTERY_PERCENT
    )]
    InsufficientBattery {
        serial_number: String,
        battery_level: Decimal,
    },

    #[error(
        "Illegal state of drone with serial number '{serial_number}': {state}. Expected state: {}",
        format_states(&loading::LOADABLE_STATES)
    )]
    IllegalState {
        serial_number: String,
        state: DroneState,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::DroneNotFound(_) => ErrorKind::DroneNotFound,
            DispatchError::DroneAlreadyExists(_) => ErrorKind::DroneAlreadyExists,
            DispatchError::InvalidModel(_) => ErrorKind::InvalidModel,
            DispatchError::InvalidSerialNumber(_) => ErrorKind::InvalidSerialNumber,
            DispatchError::EmptyManifest => ErrorKind::EmptyManifest,
            DispatchError::DuplicateMedicationCodes(_) => ErrorKind::DuplicateMedicationCodes,
            DispatchError::InvalidMedicationCounts(_) => ErrorKind::InvalidMedicationCounts,
            DispatchError::UnknownMedicationCodes(_) => ErrorKind::UnknownMedicationCodes,
            DispatchError::OverweightLoad { .. } => ErrorKind::OverweightLoad,
            DispatchError::InsufficientBattery { .. } => ErrorKind::InsufficientBattery,
            DispatchError::IllegalState { .. } => ErrorKind::IllegalState,
            DispatchError::Store(_) => ErrorKind::Storage,
        }
    }
}

fn format_counts(counts: &[(String, i64)]) -> String {
    counts
        .iter()
        .map(|(code, count)| format!("{}: {}", code, count))
        .collect::<Vec<_>>()
        .join(",")
}

fn format_states(states: &[DroneState]) -> String {
    states
        .iter()
        .map(DroneState::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_offending_values() {
        let err = DispatchError::UnknownMedicationCodes(vec!["X".into(), "Y".into()]);
        assert_eq!(err.to_string(), "Medications with codes X,Y don't exist");

        let err = DispatchError::InvalidMedicationCounts(vec![("M1".into(), 0), ("M2".into(), -5)]);
        assert_eq!(
            err.to_string(),
            "Gotten wrong medicine counts for loading: M1: 0,M2: -5"
        );

        let err = DispatchError::OverweightLoad {
            serial_number: "D1".into(),
            free_space: Decimal::from(100),
            requested_weight: Decimal::from(110),
        };
        assert_eq!(
            err.to_string(),
            "Error while loading drone with serial number: 'D1'. \
             Medications total weight is 110 and available free space is 100"
        );
    }

    #[test]
    fn test_state_and_battery_messages() {
        let err = DispatchError::IllegalState {
            serial_number: "D4".into(),
            state: DroneState::Delivering,
        };
        assert_eq!(
            err.to_string(),
            "Illegal state of drone with serial number 'D4': DELIVERING. Expected state: IDLE,LOADED"
        );

        let err = DispatchError::InsufficientBattery {
            serial_number: "D10".into(),
            battery_level: Decimal::from(24),
        };
        assert!(err.to_string().contains("battery is 24% and lower than 25%"));
    }

    #[test]
    fn test_store_errors_are_storage_kind() {
        let err = DispatchError::from(StoreError::Backend("disk on fire".into()));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.kind().to_string(), "Storage");
    }
}
