//! Input sanitization for the Palletrack inventory system
//!
//! The system favors availability over strict validation: numeric inputs
//! from operators are clamped to a safe value instead of rejected. The
//! clamping rules live here so every caller applies the same ones.

// ============================================================================
// Quantity
// ============================================================================

/// Clamp an article quantity to the valid range (at least 1).
pub fn sanitize_quantity(raw: i64) -> i64 {
    if raw <= 0 {
        1
    } else {
        raw
    }
}

/// Parse a free-text quantity field; anything unparsable becomes 1.
pub fn parse_quantity(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .map(sanitize_quantity)
        .unwrap_or(1)
}

// ============================================================================
// Weight
// ============================================================================

/// Clamp a bin weight to a finite non-negative value; invalid input
/// becomes 0.
pub fn sanitize_weight(raw: f64) -> f64 {
    if raw.is_finite() && raw >= 0.0 {
        raw
    } else {
        0.0
    }
}

/// Parse a free-text weight field; anything unparsable becomes 0.
pub fn parse_weight(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .map(sanitize_weight)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_clamps_to_one() {
        assert_eq!(sanitize_quantity(0), 1);
        assert_eq!(sanitize_quantity(-12), 1);
        assert_eq!(sanitize_quantity(1), 1);
        assert_eq!(sanitize_quantity(40), 40);
    }

    #[test]
    fn quantity_parses_or_defaults() {
        assert_eq!(parse_quantity(" 7 "), 7);
        assert_eq!(parse_quantity("-3"), 1);
        assert_eq!(parse_quantity("abc"), 1);
        assert_eq!(parse_quantity(""), 1);
    }

    #[test]
    fn weight_clamps_to_zero() {
        assert_eq!(sanitize_weight(-5.0), 0.0);
        assert_eq!(sanitize_weight(f64::NAN), 0.0);
        assert_eq!(sanitize_weight(f64::INFINITY), 0.0);
        assert_eq!(sanitize_weight(137.5), 137.5);
    }

    #[test]
    fn weight_parses_or_defaults() {
        assert_eq!(parse_weight("450.5"), 450.5);
        assert_eq!(parse_weight("heavy"), 0.0);
        assert_eq!(parse_weight(""), 0.0);
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any free-text quantity lands in the valid range
            #[test]
            fn parsed_quantity_is_at_least_one(raw in ".{0,12}") {
                prop_assert!(parse_quantity(&raw) >= 1);
            }

            /// Any free-text weight lands in the valid range
            #[test]
            fn parsed_weight_is_finite_and_non_negative(raw in ".{0,12}") {
                let weight = parse_weight(&raw);
                prop_assert!(weight.is_finite());
                prop_assert!(weight >= 0.0);
            }

            /// Numeric text round-trips through the parser
            #[test]
            fn valid_quantity_text_round_trips(quantity in 1i64..=100_000) {
                prop_assert_eq!(parse_quantity(&quantity.to_string()), quantity);
            }
        }
    }
}
