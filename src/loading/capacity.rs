//! Weight arithmetic
//!
//! Products and sums saturate at `Decimal::MAX` so an absurd manifest
//! compares as overweight instead of overflowing.

use super::ResolvedItem;
use dispatch_shared::LoadedMedication;
use rust_decimal::Decimal;

fn weight_of(weight_gr: Decimal, count: u64) -> Decimal {
    weight_gr.saturating_mul(Decimal::from(count))
}

/// Total weight currently on a drone
pub fn loaded_weight(loaded: &[LoadedMedication]) -> Decimal {
    loaded.iter().fold(Decimal::ZERO, |total, entry| {
        total.saturating_add(weight_of(entry.medication.weight_gr, entry.count))
    })
}

/// Remaining weight budget: model limit minus everything already loaded.
/// Negative only when the stored load already exceeds the limit.
pub fn free_space(weight_limit: Decimal, loaded: &[LoadedMedication]) -> Decimal {
    weight_limit.saturating_sub(loaded_weight(loaded))
}

/// Total weight of a resolved manifest
pub fn requested_weight(items: &[ResolvedItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |total, item| {
        total.saturating_add(weight_of(item.medication.weight_gr, item.count))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_shared::Medication;

    fn medication(code: &str, weight_gr: Decimal) -> Medication {
        Medication {
            code: code.into(),
            name: code.into(),
            weight_gr,
            image: None,
        }
    }

    fn loaded(code: &str, weight: i64, count: u64) -> LoadedMedication {
        LoadedMedication {
            medication: medication(code, Decimal::from(weight)),
            count,
        }
    }

    #[test]
    fn test_free_space_of_empty_drone_is_limit() {
        assert_eq!(free_space(Decimal::from(500), &[]), Decimal::from(500));
    }

    #[test]
    fn test_free_space_subtracts_weight_times_count() {
        let on_board = [loaded("M1", 10, 40), loaded("M2", 45, 1)];
        assert_eq!(loaded_weight(&on_board), Decimal::from(445));
        assert_eq!(free_space(Decimal::from(500), &on_board), Decimal::from(55));
    }

    #[test]
    fn test_fractional_weights_are_exact() {
        let on_board = [LoadedMedication {
            medication: medication("M1", Decimal::new(1, 1)),
            count: 3,
        }];
        // 0.1 * 3 must be exactly 0.3
        assert_eq!(
            free_space(Decimal::from(1), &on_board),
            Decimal::new(7, 1)
        );
    }

    #[test]
    fn test_inconsistent_load_goes_negative() {
        let on_board = [loaded("M1", 10, 60)];
        assert_eq!(free_space(Decimal::from(500), &on_board), Decimal::from(-100));
    }

    #[test]
    fn test_requested_weight_saturates() {
        let items = [
            ResolvedItem {
                medication: medication("M1", Decimal::MAX),
                count: u64::MAX,
            },
            ResolvedItem {
                medication: medication("M2", Decimal::from(1)),
                count: 1,
            },
        ];
        assert_eq!(requested_weight(&items), Decimal::MAX);
    }
}
