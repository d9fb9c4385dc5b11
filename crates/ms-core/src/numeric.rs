/// Floating point type used for every operator-facing quantity.
pub type Real = f64;

/// Coerce operator input into a number.
///
/// Blank, non-numeric and non-finite input all read as zero.
pub fn lenient_number(raw: &str) -> Real {
    raw.trim()
        .parse::<Real>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Replace NaN and infinities with zero.
pub fn sanitize(v: Real) -> Real {
    if v.is_finite() { v } else { 0.0 }
}

/// Clamp into `[0, max]`.
pub fn clamp_non_negative(v: Real, max: Real) -> Real {
    sanitize(v).clamp(0.0, max)
}

/// Raise anything below `min` to `min`.
pub fn floor_at(v: Real, min: Real) -> Real {
    sanitize(v).max(min)
}

pub fn round_to(v: Real, decimals: u32) -> Real {
    let scale = 10_f64.powi(decimals as i32);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lenient_number_reads_garbage_as_zero() {
        assert_eq!(lenient_number(""), 0.0);
        assert_eq!(lenient_number("abc"), 0.0);
        assert_eq!(lenient_number("NaN"), 0.0);
        assert_eq!(lenient_number("inf"), 0.0);
        assert_eq!(lenient_number(" 12.5 "), 12.5);
        assert_eq!(lenient_number("-3"), -3.0);
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-1.235, 0), -1.0);
    }

    proptest! {
        #[test]
        fn clamp_non_negative_stays_in_range(v in any::<f64>(), max in 0.0f64..1e6) {
            let out = clamp_non_negative(v, max);
            prop_assert!((0.0..=max).contains(&out));
        }

        #[test]
        fn floor_at_never_goes_below(v in any::<f64>(), min in -1e6f64..1e6) {
            prop_assert!(floor_at(v, min) >= min);
        }
    }
}
