/// Mean occupancy over a block's (or one hour's) `aforo` readings. No
/// readings means no occupancy, so an empty slice gives 0.0.
pub fn mean(values: &[f64]) -> f64 {
    match values.len() {
        0 => 0.0,
        n => values.iter().sum::<f64>() / n as f64,
    }
}

/// Rounds to the nearest integer, halves away from zero.
pub fn round_to_i64(value: f64) -> i64 {
    value.round() as i64
}

/// Rounds to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[40.0, 60.0]), 50.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to_i64(2.5), 3);
        assert_eq!(round_to_i64(-2.5), -3);
        assert_eq!(round_to_i64(7.49), 7);
        assert_eq!(round_to(33.3333, 2), 33.33);
        assert_eq!(round_to(66.666, 2), 66.67);
    }
}
