//! Drone Dispatch Shared Types
//!
//! This crate provides the domain types, lifecycle state machine and wire
//! codec shared between the dispatch service and its clients.

pub mod codec;
pub mod model;
pub mod proto;
pub mod state_machine;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used types at crate root
pub use model::{
    Drone, DroneModel, DroneState, LoadCount, LoadItem, LoadedMedication, Medication,
    ParseEnumError,
};
pub use proto::*;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Loading eligibility parameters
pub mod loading {
    use crate::DroneState;
    use rust_decimal::Decimal;

    /// Minimum battery percentage required to begin loading
    pub const MIN_BATTERY_PERCENT: u32 = 25;

    /// Battery percentage of a newly registered drone
    pub const INITIAL_BATTERY_PERCENT: u32 = 100;

    /// Upper bound of the battery percentage range
    pub const MAX_BATTERY_PERCENT: u32 = 100;

    /// States from which a load attempt may begin
    pub const LOADABLE_STATES: [DroneState; 2] = [DroneState::Idle, DroneState::Loaded];

    pub fn min_battery_level() -> Decimal {
        Decimal::from(MIN_BATTERY_PERCENT)
    }

    pub fn is_loadable(state: DroneState) -> bool {
        LOADABLE_STATES.contains(&state)
    }

    /// Whether a battery level lies within [0, 100]
    pub fn is_valid_battery_level(level: Decimal) -> bool {
        level >= Decimal::ZERO && level <= Decimal::from(MAX_BATTERY_PERCENT)
    }
}

/// Builder helpers for creating messages
impl Header {
    /// Create a new header for the given client and message type
    pub fn new(client_id: impl Into<String>, msg_type: MessageType, request_id: u64) -> Self {
        Self {
            client_id: client_id.into(),
            request_id,
            timestamp_ms: now_ms(),
            msg_type: msg_type.into(),
        }
    }
}

impl Envelope {
    /// Wrap a payload with a fresh header
    pub fn new(
        client_id: impl Into<String>,
        msg_type: MessageType,
        request_id: u64,
        payload: envelope::Payload,
    ) -> Self {
        Self {
            header: Some(Header::new(client_id, msg_type, request_id)),
            payload: Some(payload),
        }
    }

    /// Request id from the header, zero if the header is missing
    pub fn request_id(&self) -> u64 {
        self.header.as_ref().map(|h| h.request_id).unwrap_or_default()
    }
}

impl Response {
    /// Create a successful response with no result payload
    pub fn ok() -> Self {
        Self {
            status: ResponseStatus::StatusOk.into(),
            ..Default::default()
        }
    }

    /// Create a failed response
    pub fn error(
        status: ResponseStatus,
        error_kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: status.into(),
            error_kind: error_kind.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status() == ResponseStatus::StatusOk
    }
}

impl From<&Drone> for DroneInfo {
    fn from(drone: &Drone) -> Self {
        Self {
            serial_number: drone.serial_number.clone(),
            model: drone.model.to_string(),
            battery_level: drone.battery_level.to_string(),
            state: drone.state.to_string(),
        }
    }
}

impl From<&LoadedMedication> for MedicationInfo {
    fn from(loaded: &LoadedMedication) -> Self {
        Self {
            code: loaded.medication.code.clone(),
            name: loaded.medication.name.clone(),
            weight_gr: loaded.medication.weight_gr.to_string(),
            image: loaded.medication.image.clone().unwrap_or_default(),
            count: loaded.count,
        }
    }
}

impl From<&ManifestItem> for LoadItem {
    fn from(item: &ManifestItem) -> Self {
        LoadItem::new(item.code.clone(), item.count)
    }
}
