// =============================================================================
// Rolling Window Statistics
// =============================================================================
//
// Trailing-window mean, sample standard deviation (ddof = 1), and z-score.
// Every function returns a column the same length as its input; indices
// before the window fills — or whose window contains a NaN — are NaN, so
// insufficient history propagates visibly rather than defaulting to zero.

/// Trailing-window mean. NaN until `window` observations are available or
/// when the window contains a non-finite value.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling_stat(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing-window sample standard deviation (ddof = 1).
///
/// A window of size 1 has no degrees of freedom and yields NaN.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling_stat(values, window, sample_std)
}

/// Trailing-window z-score: (value - mean) / std, both over the same
/// `window`, sample standard deviation.
///
/// A zero standard deviation (flat window) yields NaN rather than ±inf.
pub fn rolling_zscore(values: &[f64], window: usize) -> Vec<f64> {
    rolling_stat(values, window, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let std = sample_std(w);
        if std == 0.0 {
            f64::NAN
        } else {
            (w[w.len() - 1] - mean) / std
        }
    })
}

fn sample_std(window: &[f64]) -> f64 {
    let n = window.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = window.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = window.iter().map(|x| (x - mean).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

fn rolling_stat(values: &[f64], window: usize, stat: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    if window == 0 {
        result.resize(values.len(), f64::NAN);
        return result;
    }

    for i in 0..values.len() {
        if i + 1 < window {
            result.push(f64::NAN);
            continue;
        }
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| !v.is_finite()) {
            result.push(f64::NAN);
        } else {
            result.push(stat(slice));
        }
    }
    result
}
