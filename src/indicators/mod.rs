// =============================================================================
// Indicator Engine
// =============================================================================
//
// Pure, side-effect-free indicator math over close prices. Every column is
// recomputed from scratch on each invocation — there is no incremental state,
// so repeated runs over the same (or an extended) series reproduce identical
// historical values. Warm-up indices are NaN; the scorer is responsible for
// refusing to read a NaN latest row.

pub mod ema;
pub mod returns;
pub mod rolling;

use crate::series::BarSeries;

/// EMA spans used by the bias pipeline.
pub const EMA_FAST: usize = 8;
pub const EMA_MID: usize = 21;
pub const EMA_SLOW: usize = 55;

/// Trailing window for rolling volatility and z-score.
pub const ROLLING_WINDOW: usize = 20;

/// Minimum bar count for every derived column to be well-defined at the tail:
/// EMA-55 needs 55 bars; the rolling stats need 21 (20 returns) and are
/// covered by the same floor.
pub const MIN_BARS: usize = EMA_SLOW;

/// All derived columns for one bar series, each the same length as the input.
#[derive(Debug, Clone)]
pub struct DerivedColumns {
    pub ema_8: Vec<f64>,
    pub ema_21: Vec<f64>,
    pub ema_55: Vec<f64>,
    pub returns: Vec<f64>,
    pub volatility_20: Vec<f64>,
    pub zscore_20: Vec<f64>,
}

/// The most recent row of the derived columns, paired with the latest close.
#[derive(Debug, Clone, Copy)]
pub struct LatestRow {
    pub close: f64,
    pub ema_8: f64,
    pub ema_21: f64,
    pub ema_55: f64,
    pub ret: f64,
    pub volatility_20: f64,
    pub zscore_20: f64,
}

impl LatestRow {
    /// True when every derived value the scorer reads is a real number.
    pub fn is_complete(&self) -> bool {
        self.close.is_finite()
            && self.ema_8.is_finite()
            && self.ema_21.is_finite()
            && self.ema_55.is_finite()
            && self.ret.is_finite()
            && self.volatility_20.is_finite()
            && self.zscore_20.is_finite()
    }
}

impl DerivedColumns {
    /// Compute all derived columns for `series`.
    pub fn compute(series: &BarSeries) -> Self {
        let closes = series.closes();

        let rets = returns::simple_returns(&closes);
        Self {
            ema_8: ema::calculate_ema(&closes, EMA_FAST),
            ema_21: ema::calculate_ema(&closes, EMA_MID),
            ema_55: ema::calculate_ema(&closes, EMA_SLOW),
            volatility_20: rolling::rolling_std(&rets, ROLLING_WINDOW),
            zscore_20: rolling::rolling_zscore(&closes, ROLLING_WINDOW),
            returns: rets,
        }
    }

    /// The latest row, pairing each column's tail with the latest close.
    pub fn latest(&self, series: &BarSeries) -> LatestRow {
        let last = |col: &[f64]| col.last().copied().unwrap_or(f64::NAN);
        LatestRow {
            close: series.last_bar().close,
            ema_8: last(&self.ema_8),
            ema_21: last(&self.ema_21),
            ema_55: last(&self.ema_55),
            ret: last(&self.returns),
            volatility_20: last(&self.volatility_20),
            zscore_20: last(&self.zscore_20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Bar;

    fn series(closes: &[f64]) -> BarSeries {
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: (i as i64 + 1) * 900_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect();
        BarSeries::new("^GSPC", bars).unwrap()
    }

    #[test]
    fn columns_match_input_length() {
        let s = series(&vec![100.0; 60]);
        let cols = DerivedColumns::compute(&s);
        assert_eq!(cols.ema_8.len(), 60);
        assert_eq!(cols.ema_55.len(), 60);
        assert_eq!(cols.returns.len(), 60);
        assert_eq!(cols.volatility_20.len(), 60);
        assert_eq!(cols.zscore_20.len(), 60);
    }

    #[test]
    fn short_series_has_nan_tail_for_rolling_stats() {
        // 10 bars: EMAs exist (seeded recursion) but rolling stats are all NaN.
        let s = series(&(1..=10).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let cols = DerivedColumns::compute(&s);
        let row = cols.latest(&s);
        assert!(row.ema_8.is_finite());
        assert!(row.volatility_20.is_nan());
        assert!(row.zscore_20.is_nan());
        assert!(!row.is_complete());
    }

    #[test]
    fn long_series_latest_row_complete() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.5).sin()).collect();
        let s = series(&closes);
        let cols = DerivedColumns::compute(&s);
        assert!(cols.latest(&s).is_complete());
    }

    #[test]
    fn volatility_needs_twenty_returns() {
        // returns[0] is NaN, so the first defined volatility is at index 20.
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let s = series(&closes);
        let cols = DerivedColumns::compute(&s);
        assert!(cols.volatility_20[19].is_nan());
        assert!(cols.volatility_20[20].is_finite());
        // z-score over closes needs only 20 bars.
        assert!(cols.zscore_20[18].is_nan());
        assert!(cols.zscore_20[19].is_finite());
    }

    #[test]
    fn recompute_is_bit_identical() {
        // NaN warm-up prefixes force a bitwise comparison.
        fn assert_bits_eq(a: &[f64], b: &[f64]) {
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b.iter()) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }

        let closes: Vec<f64> = (0..90).map(|i| 4000.0 + (i as f64 * 1.3).cos() * 25.0).collect();
        let s = series(&closes);
        let a = DerivedColumns::compute(&s);
        let b = DerivedColumns::compute(&s);
        assert_eq!(a.ema_8, b.ema_8);
        assert_bits_eq(&a.returns, &b.returns);
        assert_bits_eq(&a.volatility_20, &b.volatility_20);
        assert_bits_eq(&a.zscore_20, &b.zscore_20);
    }
}
