// =============================================================================
// Bar & BarSeries — validated OHLCV input for the pipeline
// =============================================================================
//
// A BarSeries is the only way bars enter the pipeline. Construction validates
// the ordering invariant once (non-empty, strictly increasing timestamps, no
// duplicates) so every downstream computation can rely on it. The pipeline
// does NOT sort on the caller's behalf — an out-of-order series is a caller
// bug and fails fast with `InvalidSeries`.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// A single OHLCV bar. Timestamp is unix milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronologically ordered bar sequence for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series from already-sorted bars, validating the ordering
    /// invariant.
    ///
    /// Fails with `InvalidSeries` when:
    /// - `bars` is empty
    /// - any timestamp is not strictly greater than its predecessor
    ///   (duplicates included)
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, PipelineError> {
        if bars.is_empty() {
            return Err(PipelineError::invalid_series("empty bar sequence"));
        }

        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(PipelineError::invalid_series(format!(
                    "timestamps not strictly increasing: {} then {}",
                    pair[0].timestamp, pair[1].timestamp
                )));
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The most recent bar. Guaranteed to exist by construction.
    pub fn last_bar(&self) -> &Bar {
        self.bars.last().expect("BarSeries is never empty")
    }
}
