// =============================================================================
// Shared types for the SPX bias engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Discretized trading stance derived from the ensemble score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiasLabel {
    Long,
    Short,
    Flat,
}

impl Default for BiasLabel {
    fn default() -> Self {
        Self::Flat
    }
}

impl std::fmt::Display for BiasLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
            Self::Flat => write!(f, "FLAT"),
        }
    }
}

/// A single volatility-index level aligned to the tail of the bar series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuxReading {
    /// Index level (e.g. the latest VIX close).
    pub value: f64,
    /// Market timestamp of the reading, unix milliseconds.
    pub timestamp: i64,
}

impl AuxReading {
    pub fn new(value: f64, timestamp: i64) -> Self {
        Self { value, timestamp }
    }
}
