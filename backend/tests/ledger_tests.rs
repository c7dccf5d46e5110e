//! Ledger tests
//!
//! Tests for the append-only movement log including:
//! - Delta-to-direction mapping on article edits
//! - Quantity sanitization
//! - Running totals staying equal to the movement sums

use proptest::prelude::*;
use shared::validation::sanitize_quantity;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test the two movement directions
    #[test]
    fn test_movement_directions() {
        let directions = ["IN", "OUT"];

        // IN adds stock, OUT removes it
        assert_eq!(directions[0], "IN");
        assert_eq!(directions[1], "OUT");
    }

    /// Test delta mapping when quantity grows
    #[test]
    fn test_positive_delta_is_an_in_movement() {
        let (direction, magnitude) = delta_movement(2, 5).unwrap();
        assert_eq!(direction, "IN");
        assert_eq!(magnitude, 3);
    }

    /// Test delta mapping when quantity shrinks
    #[test]
    fn test_negative_delta_is_an_out_movement() {
        let (direction, magnitude) = delta_movement(5, 2).unwrap();
        assert_eq!(direction, "OUT");
        assert_eq!(magnitude, 3);
    }

    /// Test that an unchanged quantity records nothing
    #[test]
    fn test_zero_delta_records_nothing() {
        assert!(delta_movement(4, 4).is_none());
    }

    /// Test quantity sanitization floor
    #[test]
    fn test_quantity_sanitization() {
        assert_eq!(sanitize_quantity(7), 7);
        assert_eq!(sanitize_quantity(1), 1);
        assert_eq!(sanitize_quantity(0), 1);
        assert_eq!(sanitize_quantity(-25), 1);
    }

    /// Test running totals over a fixed sequence
    #[test]
    fn test_running_totals_over_a_sequence() {
        let movements = vec![("IN", 10), ("IN", 5), ("OUT", 3), ("IN", 2), ("OUT", 9)];

        let (total_in, total_out) = fold_totals(&movements);
        assert_eq!(total_in, 17);
        assert_eq!(total_out, 12);
    }

    /// Test that removal moves the full remaining quantity out
    #[test]
    fn test_removal_moves_the_full_quantity_out() {
        // Add 8, trim to 5, then remove: the log must end with OUT 5
        let mut log = vec![("IN", 8)];
        if let Some(m) = delta_movement(8, 5) {
            log.push(m);
        }
        log.push(("OUT", 5));

        let (total_in, total_out) = fold_totals(&log);
        assert_eq!(total_in, 8);
        assert_eq!(total_out, 8);
    }

    pub fn delta_movement(old: i64, new: i64) -> Option<(&'static str, i64)> {
        let delta = new - old;
        if delta > 0 {
            Some(("IN", delta))
        } else if delta < 0 {
            Some(("OUT", -delta))
        } else {
            None
        }
    }

    pub fn fold_totals(movements: &[(&str, i64)]) -> (i64, i64) {
        movements.iter().fold((0, 0), |(inn, out), (dir, mag)| {
            if *dir == "IN" {
                (inn + mag, out)
            } else {
                (inn, out + mag)
            }
        })
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use super::unit_tests::{delta_movement, fold_totals};

    /// Strategy for sanitized quantities
    fn quantity_strategy() -> impl Strategy<Value = i64> {
        1i64..=10_000
    }

    /// Strategy for raw, possibly invalid quantities
    fn raw_quantity_strategy() -> impl Strategy<Value = i64> {
        -10_000i64..=10_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Sanitized quantities are always at least one
        #[test]
        fn prop_sanitized_quantity_is_positive(raw in raw_quantity_strategy()) {
            prop_assert!(sanitize_quantity(raw) >= 1);
        }

        /// Sanitization never alters an already valid quantity
        #[test]
        fn prop_sanitization_preserves_valid_quantities(quantity in quantity_strategy()) {
            prop_assert_eq!(sanitize_quantity(quantity), quantity);
        }

        /// A delta movement always carries a positive magnitude
        #[test]
        fn prop_delta_magnitude_is_positive(
            old in quantity_strategy(),
            new in quantity_strategy()
        ) {
            if let Some((_, magnitude)) = delta_movement(old, new) {
                prop_assert!(magnitude > 0);
            } else {
                prop_assert_eq!(old, new);
            }
        }

        /// Replaying the delta movement recovers the new quantity
        #[test]
        fn prop_delta_movement_replays_the_edit(
            old in quantity_strategy(),
            new in quantity_strategy()
        ) {
            let replayed = match delta_movement(old, new) {
                Some(("IN", magnitude)) => old + magnitude,
                Some(("OUT", magnitude)) => old - magnitude,
                Some(_) => unreachable!(),
                None => old,
            };
            prop_assert_eq!(replayed, new);
        }

        /// Totals always equal the sum of the movement log
        #[test]
        fn prop_totals_equal_the_movement_sums(
            edits in prop::collection::vec(quantity_strategy(), 1..20)
        ) {
            // Start an article at the first quantity, then edit through
            // the rest; the running totals must match the folded log.
            let mut log = vec![("IN", edits[0])];
            let mut current = edits[0];
            for &next in &edits[1..] {
                if let Some(movement) = delta_movement(current, next) {
                    log.push(movement);
                }
                current = next;
            }

            let (total_in, total_out) = fold_totals(&log);
            let in_sum: i64 = log.iter().filter(|(d, _)| *d == "IN").map(|(_, m)| m).sum();
            let out_sum: i64 = log.iter().filter(|(d, _)| *d == "OUT").map(|(_, m)| m).sum();

            prop_assert_eq!(total_in, in_sum);
            prop_assert_eq!(total_out, out_sum);

            // The log balance is the current quantity
            prop_assert_eq!(total_in - total_out, current);
        }

        /// Adding then immediately removing nets to zero stock
        #[test]
        fn prop_add_then_remove_nets_to_zero(quantity in quantity_strategy()) {
            let log = vec![("IN", quantity), ("OUT", quantity)];
            let (total_in, total_out) = fold_totals(&log);
            prop_assert_eq!(total_in - total_out, 0);
        }
    }
}
