//! Eligibility gate checked before any load attempt

use crate::error::{DispatchError, Result};
use dispatch_shared::{loading, Drone};

/// Check that a drone may begin loading.
///
/// Battery is checked before state; only the first failing rule is reported.
pub fn check_eligibility(drone: &Drone) -> Result<()> {
    if drone.battery_level < loading::min_battery_level() {
        return Err(DispatchError::InsufficientBattery {
            serial_number: drone.serial_number.clone(),
            battery_level: drone.battery_level,
        });
    }

    if !loading::is_loadable(drone.state) {
        return Err(DispatchError::IllegalState {
            serial_number: drone.serial_number.clone(),
            state: drone.state,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use dispatch_shared::{DroneModel, DroneState};
    use rust_decimal::Decimal;

    fn drone(battery: Decimal, state: DroneState) -> Drone {
        Drone {
            serial_number: "D1".into(),
            model: DroneModel::Middleweight,
            battery_level: battery,
            state,
        }
    }

    #[test]
    fn test_idle_and_loaded_are_eligible() {
        assert!(check_eligibility(&drone(Decimal::from(80), DroneState::Idle)).is_ok());
        assert!(check_eligibility(&drone(Decimal::from(80), DroneState::Loaded)).is_ok());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(check_eligibility(&drone(Decimal::from(25), DroneState::Idle)).is_ok());

        let err = check_eligibility(&drone(Decimal::new(2499, 2), DroneState::Idle)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBattery);
    }

    #[test]
    fn test_battery_checked_before_state() {
        let err = check_eligibility(&drone(Decimal::from(10), DroneState::Delivering)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBattery);
    }

    #[test]
    fn test_in_flight_and_loading_states_are_illegal() {
        for state in [DroneState::Delivering, DroneState::Returning, DroneState::Loading] {
            let err = check_eligibility(&drone(Decimal::from(100), state)).unwrap_err();
            assert!(matches!(err, DispatchError::IllegalState { state: s, .. } if s == state));
        }
    }
}
