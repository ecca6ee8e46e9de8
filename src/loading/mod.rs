//! Drone-loading decision engine
//!
//! This module handles:
//! - Free space arithmetic for a drone and a manifest
//! - The battery/state eligibility gate
//! - Manifest validation and catalog resolution
//! - Per-drone serialization of load attempts
//! - The commit/rollback sequence that applies a load

mod capacity;
mod locks;
mod orchestrator;
mod resolver;
mod validator;

pub use locks::DroneLocks;
pub use orchestrator::{LoadOrchestrator, LoadReceipt};
pub use resolver::ResolvedItem;
