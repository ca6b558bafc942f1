//! Currency rounding helpers
//!
//! All win arithmetic happens in bet multiples (`f64`). Conversion to integer
//! cents happens only when an event is emitted.

/// Round to two decimals, half away from zero
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a bet multiple to integer cents
#[inline]
pub fn to_cents(value: f64) -> u64 {
    let cents = (value * 100.0).round();
    if cents <= 0.0 { 0 } else { cents as u64 }
}

/// Convert a bet multiple to integer cents after applying the win cap
#[inline]
pub fn capped_cents(value: f64, win_cap: f64) -> u64 {
    to_cents(value.min(win_cap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_cents() {
        assert_eq!(to_cents(1.5), 150);
        assert_eq!(to_cents(0.004), 0);
        assert_eq!(capped_cents(7500.0, 5000.0), 500_000);
        assert_eq!(capped_cents(12.345, 5000.0), 1235);
    }
}
