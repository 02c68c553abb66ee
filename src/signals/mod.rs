// =============================================================================
// Signal Scorer — momentum + placeholder estimates -> ensemble score
// =============================================================================
//
// Combines the latest indicator row with the auxiliary volatility reading
// into a bounded ensemble score:
//
//   momentum   = (z-score < -1) + (EMA8 > EMA21 > EMA55), normalized by 2
//   regression = latest simple return            (placeholder, not a model)
//   model      = latest simple return * 0.9      (placeholder, not a model)
//   ensemble   = 0.25*momentum + 0.35*regression + 0.40*model
//   if aux > 20: ensemble *= 0.6                 (high-volatility dampening)
//
// The "regression" and "model" estimates are literal passthroughs of the
// latest return. They are kept verbatim so the ensemble arithmetic stays
// reproducible; substituting a fitted model would change observable output.

pub mod bias;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::indicators::{LatestRow, MIN_BARS};
use crate::types::AuxReading;

/// Ensemble weights. Fixed by the signal definition, not configurable.
pub const MOMENTUM_WEIGHT: f64 = 0.25;
pub const REGRESSION_WEIGHT: f64 = 0.35;
pub const MODEL_WEIGHT: f64 = 0.40;

/// Z-score below which the mean-reversion oversold condition fires.
pub const OVERSOLD_ZSCORE: f64 = -1.0;

/// Aux readings strictly above this level dampen the ensemble score.
pub const HIGH_VOL_THRESHOLD: f64 = 20.0;
pub const HIGH_VOL_MULTIPLIER: f64 = 0.6;

/// Scaling applied to the latest return for the placeholder model estimate.
const MODEL_ESTIMATE_SCALE: f64 = 0.9;

/// Full breakdown of one scoring pass, kept for the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Exactly 0.0, 0.5, or 1.0.
    pub momentum_score: f64,
    pub regression_estimate: f64,
    pub model_estimate: f64,
    /// Weighted sum after any volatility dampening.
    pub ensemble_score: f64,
    /// Whether the high-volatility multiplier was applied.
    pub dampened: bool,
}

/// Momentum score: sum of two binary conditions over the latest row,
/// normalized to [0, 1] by dividing by 2.
pub fn momentum_score(row: &LatestRow) -> f64 {
    let mut hits = 0u8;
    if row.zscore_20 < OVERSOLD_ZSCORE {
        hits += 1;
    }
    if crate::indicators::ema::ema_stack_bullish(row.ema_8, row.ema_21, row.ema_55) {
        hits += 1;
    }
    f64::from(hits) / 2.0
}

/// Score the latest indicator row against the auxiliary volatility reading.
///
/// Fails with `InsufficientHistory` when the series is shorter than
/// [`MIN_BARS`] or the latest row still contains NaN warm-up values —
/// arithmetic over undefined inputs is never attempted. Fails with
/// `MissingAux` when the aux reading is absent or non-finite.
pub fn score(
    row: &LatestRow,
    bars_available: usize,
    aux: Option<AuxReading>,
) -> Result<ScoreBreakdown, PipelineError> {
    if bars_available < MIN_BARS || !row.is_complete() {
        return Err(PipelineError::InsufficientHistory {
            required: MIN_BARS,
            available: bars_available,
        });
    }

    let aux = aux.ok_or(PipelineError::MissingAux)?;
    if !aux.value.is_finite() {
        return Err(PipelineError::MissingAux);
    }

    let momentum = momentum_score(row);
    let regression_estimate = row.ret;
    let model_estimate = row.ret * MODEL_ESTIMATE_SCALE;

    let mut ensemble = MOMENTUM_WEIGHT * momentum
        + REGRESSION_WEIGHT * regression_estimate
        + MODEL_WEIGHT * model_estimate;

    // Strictly greater than the threshold: an aux reading of exactly 20
    // does not dampen.
    let dampened = aux.value > HIGH_VOL_THRESHOLD;
    if dampened {
        ensemble *= HIGH_VOL_MULTIPLIER;
    }

    Ok(ScoreBreakdown {
        momentum_score: momentum,
        regression_estimate,
        model_estimate,
        ensemble_score: ensemble,
        dampened,
    })
}
