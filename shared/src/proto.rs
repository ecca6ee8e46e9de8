//! Wire messages for the dispatch protocol
//!
//! Every frame carries one `Envelope`. Clients send a request payload and
//! receive exactly one `Response` carrying the same `request_id`.
//! Decimal quantities travel as strings so no precision is lost.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(string, tag = "1")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub request_id: u64,
    #[prost(uint64, tag = "3")]
    pub timestamp_ms: u64,
    #[prost(enumeration = "MessageType", tag = "4")]
    pub msg_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Envelope {
    #[prost(message, optional, tag = "1")]
    pub header: ::core::option::Option<Header>,
    #[prost(oneof = "envelope::Payload", tags = "2, 3, 4, 5, 6, 7")]
    pub payload: ::core::option::Option<envelope::Payload>,
}

pub mod envelope {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "2")]
        RegisterDrone(super::RegisterDrone),
        #[prost(message, tag = "3")]
        LoadDrone(super::LoadDrone),
        #[prost(message, tag = "4")]
        GetMedications(super::GetMedications),
        #[prost(message, tag = "5")]
        GetAvailableDrones(super::GetAvailableDrones),
        #[prost(message, tag = "6")]
        GetBatteryLevel(super::GetBatteryLevel),
        #[prost(message, tag = "7")]
        Response(super::Response),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterDrone {
    #[prost(string, tag = "1")]
    pub serial_number: ::prost::alloc::string::String,
    /// Model name, e.g. "MIDDLEWEIGHT"
    #[prost(string, tag = "2")]
    pub model: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ManifestItem {
    #[prost(string, tag = "1")]
    pub code: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub count: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoadDrone {
    #[prost(string, tag = "1")]
    pub serial_number: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub items: ::prost::alloc::vec::Vec<ManifestItem>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetMedications {
    #[prost(string, tag = "1")]
    pub serial_number: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAvailableDrones {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBatteryLevel {
    #[prost(string, tag = "1")]
    pub serial_number: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DroneInfo {
    #[prost(string, tag = "1")]
    pub serial_number: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub model: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub battery_level: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub state: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MedicationInfo {
    #[prost(string, tag = "1")]
    pub code: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub weight_gr: ::prost::alloc::string::String,
    /// Empty when the catalog entry has no image
    #[prost(bytes = "vec", tag = "4")]
    pub image: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub count: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(enumeration = "ResponseStatus", tag = "1")]
    pub status: i32,
    /// Error kind name, empty on success
    #[prost(string, tag = "2")]
    pub error_kind: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "4")]
    pub drones: ::prost::alloc::vec::Vec<DroneInfo>,
    #[prost(message, repeated, tag = "5")]
    pub medications: ::prost::alloc::vec::Vec<MedicationInfo>,
    #[prost(string, tag = "6")]
    pub battery_level: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    MsgUnknown = 0,
    MsgRegisterDrone = 1,
    MsgLoadDrone = 2,
    MsgGetMedications = 3,
    MsgGetAvailableDrones = 4,
    MsgGetBatteryLevel = 5,
    MsgResponse = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResponseStatus {
    StatusUnknown = 0,
    StatusOk = 1,
    StatusBadRequest = 2,
    StatusNotFound = 3,
    StatusConflict = 4,
    StatusRejected = 5,
    StatusInternal = 6,
}
