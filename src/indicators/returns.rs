// =============================================================================
// Simple Returns
// =============================================================================
//
// return_t = (close_t - close_{t-1}) / close_{t-1}
//
// The first element has no predecessor, so it is NaN — the warm-up gap stays
// visible in the column instead of defaulting to zero.

/// Compute the simple-return series for `closes`.
///
/// Output has the same length as the input; index 0 is always NaN. A zero
/// previous close yields NaN at that index (division guard).
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    let mut result = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return result;
    }

    result.push(f64::NAN);
    for i in 1..closes.len() {
        let prev = closes[i - 1];
        if prev == 0.0 {
            result.push(f64::NAN);
        } else {
            result.push((closes[i] - prev) / prev);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_empty() {
        assert!(simple_returns(&[]).is_empty());
    }

    #[test]
    fn returns_first_is_nan() {
        let r = simple_returns(&[100.0, 105.0]);
        assert_eq!(r.len(), 2);
        assert!(r[0].is_nan());
        assert!((r[1] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn returns_known_values() {
        let r = simple_returns(&[100.0, 110.0, 99.0]);
        assert!((r[1] - 0.10).abs() < 1e-12);
        assert!((r[2] - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn returns_zero_prev_close_is_nan() {
        let r = simple_returns(&[0.0, 5.0]);
        assert!(r[1].is_nan());
    }
}
