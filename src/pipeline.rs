// =============================================================================
// Signal Pipeline — bars + aux reading -> SignalSnapshot
// =============================================================================
//
// The single entry point the refresh loop calls once per cycle:
//
//   1. Enforce the 55-bar minimum before any arithmetic
//   2. Compute derived indicator columns (pure, recomputed from scratch)
//   3. Score the latest row against the aux reading
//   4. Classify the ensemble score into a bias label
//   5. Assemble the immutable snapshot
//
// Every step is a pure function of its inputs; a failed run leaves nothing
// behind. Re-entrant by construction — callers may evaluate several
// instruments in parallel without coordination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::indicators::{DerivedColumns, MIN_BARS};
use crate::series::BarSeries;
use crate::signals::{self, bias, ScoreBreakdown};
use crate::types::{AuxReading, BiasLabel};

/// Latest indicator values carried on the snapshot for presentation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatestIndicators {
    pub ema_8: f64,
    pub ema_21: f64,
    pub ema_55: f64,
    pub last_return: f64,
    pub volatility_20: f64,
    pub zscore_20: f64,
}

/// Immutable result of one pipeline run. Created once per refresh cycle,
/// handed to presentation, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub symbol: String,
    pub latest_close: f64,
    /// Latest auxiliary volatility-index level (e.g. VIX).
    pub latest_aux: f64,
    pub indicators: LatestIndicators,
    pub scores: ScoreBreakdown,
    pub bias: BiasLabel,
    /// Wall-clock time of computation, not a market timestamp.
    pub generated_at: DateTime<Utc>,
}

/// Run the full pipeline over a validated bar series and the cycle's aux
/// reading.
///
/// `aux` is `None` when the collaborator had no reading this cycle, which
/// maps to `MissingAux`. A series shorter than [`MIN_BARS`] — or one whose
/// latest derived row is still NaN — maps to `InsufficientHistory`.
pub fn compute_snapshot(
    series: &BarSeries,
    aux: Option<AuxReading>,
) -> Result<SignalSnapshot, PipelineError> {
    if series.len() < MIN_BARS {
        return Err(PipelineError::InsufficientHistory {
            required: MIN_BARS,
            available: series.len(),
        });
    }

    let columns = DerivedColumns::compute(series);
    let row = columns.latest(series);

    let scores = signals::score(&row, series.len(), aux)?;
    let label = bias::classify(scores.ensemble_score);

    debug!(
        symbol = series.symbol(),
        close = row.close,
        ensemble = scores.ensemble_score,
        bias = %label,
        "pipeline run complete"
    );

    Ok(SignalSnapshot {
        symbol: series.symbol().to_string(),
        latest_close: row.close,
        latest_aux: aux.map(|a| a.value).unwrap_or(f64::NAN),
        indicators: LatestIndicators {
            ema_8: row.ema_8,
            ema_21: row.ema_21,
            ema_55: row.ema_55,
            last_return: row.ret,
            volatility_20: row.volatility_20,
            zscore_20: row.zscore_20,
        },
        scores,
        bias: label,
        generated_at: Utc::now(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
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

    fn aux(value: f64) -> Option<AuxReading> {
        Some(AuxReading::new(value, 60 * 900_000))
    }

    /// The worked example: 60 bars flat at 100.0 except the last at 105.0,
    /// calm volatility regime (aux = 15).
    #[test]
    fn worked_example_step_to_105() {
        let mut closes = vec![100.0; 59];
        closes.push(105.0);
        let s = series(&closes);

        let snap = compute_snapshot(&s, aux(15.0)).expect("should produce a snapshot");

        assert_eq!(snap.symbol, "^GSPC");
        assert_eq!(snap.latest_close, 105.0);
        assert_eq!(snap.latest_aux, 15.0);

        // Return of the final bar: (105 - 100) / 100.
        assert!((snap.indicators.last_return - 0.05).abs() < 1e-12);

        // Z-score strongly positive: window mean 100.25, sample std sqrt(1.25).
        let expected_z = 4.75 / 1.25f64.sqrt();
        assert!((snap.indicators.zscore_20 - expected_z).abs() < 1e-9);
        assert!(snap.indicators.zscore_20 > 4.0);

        // EMAs seeded at 100, single step: e8 jumps most, e55 least.
        assert!((snap.indicators.ema_8 - (100.0 + 5.0 * 2.0 / 9.0)).abs() < 1e-9);
        assert!((snap.indicators.ema_21 - (100.0 + 5.0 * 2.0 / 22.0)).abs() < 1e-9);
        assert!((snap.indicators.ema_55 - (100.0 + 5.0 * 2.0 / 56.0)).abs() < 1e-9);

        // Bullish stack fires, oversold does not => momentum 0.5.
        assert_eq!(snap.scores.momentum_score, 0.5);

        // 0.25*0.5 + 0.35*0.05 + 0.40*0.045 = 0.1605 => FLAT.
        assert!((snap.scores.ensemble_score - 0.1605).abs() < 1e-12);
        assert!(!snap.scores.dampened);
        assert_eq!(snap.bias, BiasLabel::Flat);
    }

    #[test]
    fn ten_bars_is_insufficient() {
        let s = series(&(1..=10).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let err = compute_snapshot(&s, aux(15.0)).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InsufficientHistory {
                required: MIN_BARS,
                available: 10
            }
        );
    }

    #[test]
    fn missing_aux_is_surfaced() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.5).sin()).collect();
        let s = series(&closes);
        assert_eq!(
            compute_snapshot(&s, None).unwrap_err(),
            PipelineError::MissingAux
        );
    }

    #[test]
    fn high_aux_dampens_the_same_series() {
        let mut closes = vec![100.0; 59];
        closes.push(105.0);
        let s = series(&closes);

        let calm = compute_snapshot(&s, aux(20.0)).unwrap();
        let stressed = compute_snapshot(&s, aux(30.0)).unwrap();
        assert!(!calm.scores.dampened);
        assert!(stressed.scores.dampened);
        assert!(
            (stressed.scores.ensemble_score - 0.6 * calm.scores.ensemble_score).abs() < 1e-15
        );
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let closes: Vec<f64> = (0..70).map(|i| 4500.0 + (i as f64 * 0.8).sin() * 12.0).collect();
        let s = series(&closes);
        let a = compute_snapshot(&s, aux(18.0)).unwrap();
        let b = compute_snapshot(&s, aux(18.0)).unwrap();
        assert_eq!(a.scores.ensemble_score, b.scores.ensemble_score);
        assert_eq!(a.bias, b.bias);
        assert_eq!(a.indicators.zscore_20, b.indicators.zscore_20);
    }

    #[test]
    fn extension_preserves_prefix_indicators() {
        // Extending the series must not change historical derived values.
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.4).cos()).collect();
        let short = DerivedColumns::compute(&series(&closes));

        let mut extended = closes.clone();
        extended.extend_from_slice(&[101.0, 100.2, 99.8]);
        let long = DerivedColumns::compute(&series(&extended));

        assert_eq!(&long.ema_8[..60], &short.ema_8[..]);
        assert_eq!(&long.ema_55[..60], &short.ema_55[..]);
        // Rolling columns carry NaN warm-up prefixes, so compare bitwise.
        for (a, b) in long.zscore_20[..60].iter().zip(short.zscore_20.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        for (a, b) in long.volatility_20[..60].iter().zip(short.volatility_20.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn sharp_drop_goes_short() {
        // 59 bars at 100, last at 40: return -0.60, z-score deeply oversold
        // (momentum 0.5), bearish EMA stack.
        // 0.25*0.5 + 0.35*(-0.60) + 0.40*(-0.54) = -0.301 => SHORT.
        let mut closes = vec![100.0; 59];
        closes.push(40.0);
        let s = series(&closes);
        let snap = compute_snapshot(&s, aux(15.0)).unwrap();
        assert_eq!(snap.scores.momentum_score, 0.5);
        assert!((snap.scores.ensemble_score - (-0.301)).abs() < 1e-12);
        assert_eq!(snap.bias, BiasLabel::Short);
    }
}
