// =============================================================================
// Bias Classifier
// =============================================================================
//
// Maps the ensemble score to a discrete stance with fixed thresholds. No
// hysteresis and no carried state: each call is independent given its input.
//
//   score >  0.25  => LONG
//   score < -0.25  => SHORT
//   otherwise      => FLAT   (the boundary values are FLAT)

use crate::types::BiasLabel;

/// Ensemble-score magnitude a signal must strictly exceed to leave FLAT.
pub const BIAS_THRESHOLD: f64 = 0.25;

/// Classify an ensemble score into a trading bias.
pub fn classify(ensemble_score: f64) -> BiasLabel {
    if ensemble_score > BIAS_THRESHOLD {
        BiasLabel::Long
    } else if ensemble_score < -BIAS_THRESHOLD {
        BiasLabel::Short
    } else {
        BiasLabel::Flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values_are_flat() {
        assert_eq!(classify(0.25), BiasLabel::Flat);
        assert_eq!(classify(-0.25), BiasLabel::Flat);
        assert_eq!(classify(0.0), BiasLabel::Flat);
    }

    #[test]
    fn strictly_beyond_threshold_flips() {
        assert_eq!(classify(0.2500001), BiasLabel::Long);
        assert_eq!(classify(-0.2500001), BiasLabel::Short);
        assert_eq!(classify(1.0), BiasLabel::Long);
        assert_eq!(classify(-1.0), BiasLabel::Short);
    }

    #[test]
    fn stateless_repeat_calls_agree() {
        for _ in 0..3 {
            assert_eq!(classify(0.3), BiasLabel::Long);
        }
    }
}
