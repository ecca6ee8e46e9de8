//! Load orchestrator - validates, commits and rolls back load attempts

use super::{capacity, resolver, validator, DroneLocks, ResolvedItem};
use crate::error::{DispatchError, Result};
use crate::store::{DroneStore, StoreError};
use dispatch_shared::{
    state_machine::{is_valid_transition, LifecycleEvent, LifecycleStateMachine, TransitionResult},
    LoadCount, LoadItem,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a committed load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReceipt {
    pub serial_number: String,
    /// New cumulative counts for every medication in the manifest
    pub counts: Vec<LoadCount>,
    pub requested_weight: Decimal,
    /// Free space left after the load
    pub remaining_space: Decimal,
}

/// Applies load manifests to drones
pub struct LoadOrchestrator {
    store: Arc<dyn DroneStore>,
    locks: DroneLocks,
}

impl LoadOrchestrator {
    pub fn new(store: Arc<dyn DroneStore>) -> Self {
        Self {
            store,
            locks: DroneLocks::new(),
        }
    }

    /// Load a drone with the given manifest.
    ///
    /// Validation failures return before anything is written. Once the drone
    /// has been moved to LOADING, any failure restores its previous state
    /// before the error is returned.
    pub async fn load_drone(&self, serial_number: &str, items: &[LoadItem]) -> Result<LoadReceipt> {
        if items.is_empty() {
            return Err(DispatchError::EmptyManifest);
        }

        // Fetch through commit must not interleave with another attempt on this drone
        let _guard = self.locks.acquire(serial_number).await;

        let drone = self
            .store
            .get_drone(serial_number)
            .await?
            .ok_or_else(|| DispatchError::DroneNotFound(serial_number.to_string()))?;

        validator::check_eligibility(&drone)?;
        let resolved = resolver::resolve_manifest(self.store.as_ref(), items).await?;

        let weight_limit = self
            .store
            .drone_model_limit(drone.model)
            .await?
            .ok_or_else(|| StoreError::Missing(format!("weight limit of model {}", drone.model)))?;
        let on_board = self.store.loaded_medications(serial_number).await?;

        let free_space = capacity::free_space(weight_limit, &on_board);
        if free_space < Decimal::ZERO {
            warn!(
                "[LOAD] Drone {} already exceeds its {} limit by {}g",
                serial_number,
                drone.model,
                -free_space
            );
        }

        let requested_weight = capacity::requested_weight(&resolved);
        if requested_weight > free_space {
            warn!(
                "[LOAD] Rejected load of {}g onto {}: only {}g free",
                requested_weight, serial_number, free_space
            );
            return Err(DispatchError::OverweightLoad {
                serial_number: serial_number.to_string(),
                free_space,
                requested_weight,
            });
        }

        info!(
            "[LOAD] Loading {} with {} medication(s), {}g of {}g free",
            serial_number,
            resolved.len(),
            requested_weight,
            free_space
        );

        let mut fsm = LifecycleStateMachine::new(drone.state);
        match self.commit(&mut fsm, serial_number, &resolved).await {
            Ok(counts) => {
                info!("[LOAD] Drone {} loaded", serial_number);
                Ok(LoadReceipt {
                    serial_number: serial_number.to_string(),
                    counts,
                    requested_weight,
                    remaining_space: free_space.saturating_sub(requested_weight),
                })
            }
            Err(err) => {
                warn!("[LOAD] Load of {} failed, rolling back: {}", serial_number, err);
                self.rollback(&mut fsm, serial_number).await;
                Err(err)
            }
        }
    }

    /// Move to LOADING, write the new counts, then move to LOADED.
    /// Each state write is its own store call.
    async fn commit(
        &self,
        fsm: &mut LifecycleStateMachine,
        serial_number: &str,
        resolved: &[ResolvedItem],
    ) -> Result<Vec<LoadCount>> {
        self.advance(fsm, serial_number, LifecycleEvent::LoadStarted).await?;

        let mut counts = Vec::with_capacity(resolved.len());
        for item in resolved {
            let existing = self
                .store
                .get_load_count(serial_number, &item.medication.code)
                .await?
                .unwrap_or(0);
            counts.push(LoadCount {
                serial_number: serial_number.to_string(),
                code: item.medication.code.clone(),
                count: existing.saturating_add(item.count),
            });
        }
        self.store.upsert_load_counts(&counts).await?;
        debug!("[LOAD] Wrote {} load count(s) for {}", counts.len(), serial_number);

        self.advance(fsm, serial_number, LifecycleEvent::LoadCommitted).await?;

        Ok(counts)
    }

    /// Persist the state an event leads to. The machine only moves once
    /// the write has succeeded, so a rollback always sees the last durable state.
    async fn advance(
        &self,
        fsm: &mut LifecycleStateMachine,
        serial_number: &str,
        event: LifecycleEvent,
    ) -> Result<()> {
        let mut next = fsm.clone();
        let state = match next.process_event(event) {
            TransitionResult::Success(state) => state,
            TransitionResult::Invalid { from, .. } => {
                return Err(DispatchError::IllegalState {
                    serial_number: serial_number.to_string(),
                    state: from,
                })
            }
        };

        debug_assert!(is_valid_transition(fsm.state(), state));

        self.store.set_drone_state(serial_number, state).await?;
        *fsm = next;
        Ok(())
    }

    /// Restore the state held before the attempt began
    async fn rollback(&self, fsm: &mut LifecycleStateMachine, serial_number: &str) {
        debug!(
            "[LOAD] Rolling back {} from {} (resume state {:?})",
            serial_number,
            fsm.state(),
            fsm.resume_state()
        );
        let restore = match fsm.process_event(LifecycleEvent::LoadAborted) {
            TransitionResult::Success(state) => state,
            // LOADING was never recorded; re-assert the state the drone already has
            TransitionResult::Invalid { from, .. } => from,
        };

        match self.store.set_drone_state(serial_number, restore).await {
            Ok(()) => info!("[LOAD] Drone {} restored to {}", serial_number, restore),
            Err(e) => error!(
                "[LOAD] Failed to restore drone {} to {}: {}",
                serial_number, restore, e
            ),
        }
    }
}
