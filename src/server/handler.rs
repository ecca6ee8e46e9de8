//! Request handler - maps request envelopes onto service calls

use crate::error::{DispatchError, ErrorKind};
use crate::service::DispatchService;
use dispatch_shared::{
    envelope::Payload, DroneInfo, Envelope, LoadItem, MedicationInfo, MessageType, Response,
    ResponseStatus,
};
use std::sync::Arc;
use tracing::{debug, error};

/// Client id stamped on every response header
pub const SERVER_ID: &str = "dispatch";

pub struct RequestHandler {
    service: Arc<DispatchService>,
    flatten_error_status: bool,
}

impl RequestHandler {
    pub fn new(service: Arc<DispatchService>, flatten_error_status: bool) -> Self {
        Self {
            service,
            flatten_error_status,
        }
    }

    /// Handle one request and build its response envelope
    pub async fn handle(&self, envelope: &Envelope) -> Envelope {
        let request_id = envelope.request_id();
        let client_id = envelope
            .header
            .as_ref()
            .map(|h| h.client_id.as_str())
            .unwrap_or_default();
        let msg_type = envelope
            .header
            .as_ref()
            .map(|h| h.msg_type())
            .unwrap_or(MessageType::MsgUnknown);
        debug!(
            "[SERVER] Request from {:?}: id={} type={:?}",
            client_id, request_id, msg_type
        );

        let response = match &envelope.payload {
            Some(payload) => match self.dispatch(payload).await {
                Ok(response) => response,
                Err(err) => self.error_response(&err),
            },
            None => self.bad_request("Request envelope carries no payload"),
        };

        Envelope::new(
            SERVER_ID,
            MessageType::MsgResponse,
            request_id,
            Payload::Response(response),
        )
    }

    async fn dispatch(&self, payload: &Payload) -> Result<Response, DispatchError> {
        let response = match payload {
            Payload::RegisterDrone(req) => {
                let drone = self.service.register(&req.model, &req.serial_number).await?;
                Response {
                    drones: vec![DroneInfo::from(&drone)],
                    ..Response::ok()
                }
            }
            Payload::LoadDrone(req) => {
                let items: Vec<LoadItem> = req.items.iter().map(LoadItem::from).collect();
                let receipt = self.service.load_drone(&req.serial_number, &items).await?;
                // Only code and the new cumulative count are filled in
                let medications = receipt
                    .counts
                    .iter()
                    .map(|c| MedicationInfo {
                        code: c.code.clone(),
                        count: c.count,
                        ..Default::default()
                    })
                    .collect();
                Response {
                    message: format!(
                        "Drone '{}' loaded with {}g, {}g of free space left",
                        receipt.serial_number, receipt.requested_weight, receipt.remaining_space
                    ),
                    medications,
                    ..Response::ok()
                }
            }
            Payload::GetMedications(req) => {
                let loaded = self.service.get_medications(&req.serial_number).await?;
                Response {
                    medications: loaded.iter().map(MedicationInfo::from).collect(),
                    ..Response::ok()
                }
            }
            Payload::GetAvailableDrones(_) => {
                let drones = self.service.get_available_drones().await?;
                Response {
                    drones: drones.iter().map(DroneInfo::from).collect(),
                    ..Response::ok()
                }
            }
            Payload::GetBatteryLevel(req) => {
                let level = self.service.get_battery_level(&req.serial_number).await?;
                Response {
                    battery_level: level.to_string(),
                    ..Response::ok()
                }
            }
            Payload::Response(_) => {
                return Ok(self.bad_request("A response is not a valid request"));
            }
        };

        Ok(response)
    }

    fn error_response(&self, err: &DispatchError) -> Response {
        let kind = err.kind();
        let message = match kind {
            ErrorKind::Storage => {
                error!("[SERVER] Storage failure: {}", err);
                "Internal server error".to_string()
            }
            _ => {
                debug!("[SERVER] Request failed: {}", err);
                err.to_string()
            }
        };

        Response::error(self.status_for(kind), kind.as_str(), message)
    }

    fn bad_request(&self, message: &str) -> Response {
        Response::error(ResponseStatus::StatusBadRequest, "", message)
    }

    fn status_for(&self, kind: ErrorKind) -> ResponseStatus {
        if self.flatten_error_status {
            return ResponseStatus::StatusBadRequest;
        }
        status_for_kind(kind)
    }
}

/// Wire status of an error kind
pub fn status_for_kind(kind: ErrorKind) -> ResponseStatus {
    match kind {
        ErrorKind::DroneNotFound => ResponseStatus::StatusNotFound,
        ErrorKind::DroneAlreadyExists => ResponseStatus::StatusConflict,
        ErrorKind::InsufficientBattery | ErrorKind::IllegalState | ErrorKind::OverweightLoad => {
            ResponseStatus::StatusRejected
        }
        ErrorKind::InvalidModel
        | ErrorKind::InvalidSerialNumber
        | ErrorKind::EmptyManifest
        | ErrorKind::DuplicateMedicationCodes
        | ErrorKind::InvalidMedicationCounts
        | ErrorKind::UnknownMedicationCodes => ResponseStatus::StatusBadRequest,
        ErrorKind::Storage => ResponseStatus::StatusInternal,
    }
}
