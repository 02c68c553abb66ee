// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula (unadjusted exponential weighting):
//   alpha = 2 / (span + 1)
//   EMA_0 = close_0
//   EMA_t = close_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The first value is seeded with the first observation, so the output has the
// same length as the input and is defined at every index.
// =============================================================================

/// Compute the EMA series for the given `closes` slice and `span`.
///
/// Returns a vector the same length as `closes`. A non-finite input close
/// poisons every subsequent output value with NaN, which is deliberate:
/// downstream consumers must see that the series broke rather than a
/// silently-resumed average.
///
/// # Edge cases
/// - `span == 0` => empty vec (division-by-zero guard)
/// - empty input => empty vec
pub fn calculate_ema(closes: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || closes.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(closes.len());
    let mut prev = closes[0];
    result.push(prev);

    for &close in &closes[1..] {
        let ema = close * alpha + prev * (1.0 - alpha);
        result.push(ema);
        prev = ema;
    }

    result
}

/// Check whether the EMA-8 / EMA-21 / EMA-55 stack is strictly bullish
/// (EMA8 > EMA21 > EMA55) at the latest bar.
///
/// Equal values anywhere in the stack are NOT bullish — a perfectly flat
/// series produces `false`.
pub fn ema_stack_bullish(ema_8: f64, ema_21: f64, ema_55: f64) -> bool {
    ema_8 > ema_21 && ema_21 > ema_55
}
