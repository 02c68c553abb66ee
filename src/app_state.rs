// =============================================================================
// Central Application State
// =============================================================================
//
// Shared between the refresh loop (writer) and the HTTP API (readers). The
// pipeline itself is stateless; everything retained between cycles lives
// here.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared values.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::pipeline::SignalSnapshot;
use crate::runtime_config::RuntimeConfig;

/// A recorded error event from the most recent failed refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Central application state shared across tasks via `Arc<AppState>`.
pub struct AppState {
    /// Monotonically increasing version counter, incremented on every
    /// stored snapshot or error so clients can cheaply detect changes.
    pub state_version: AtomicU64,

    pub runtime_config: RwLock<RuntimeConfig>,

    /// Latest successfully computed snapshot. A failed cycle leaves the
    /// previous one in place.
    pub last_snapshot: RwLock<Option<SignalSnapshot>>,

    /// Error from the most recent failed cycle, cleared on success.
    pub last_error: RwLock<Option<ErrorRecord>>,

    /// When the last refresh attempt finished (success or failure).
    pub last_refresh_at: RwLock<Option<DateTime<Utc>>>,

    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            runtime_config: RwLock::new(config),
            last_snapshot: RwLock::new(None),
            last_error: RwLock::new(None),
            last_refresh_at: RwLock::new(None),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    /// Store the result of a successful refresh cycle.
    pub fn store_snapshot(&self, snapshot: SignalSnapshot) {
        *self.last_snapshot.write() = Some(snapshot);
        *self.last_error.write() = None;
        *self.last_refresh_at.write() = Some(Utc::now());
        self.increment_version();
    }

    /// Record a failed refresh cycle without disturbing the last snapshot.
    pub fn store_error(&self, message: String) {
        *self.last_error.write() = Some(ErrorRecord {
            message,
            at: Utc::now().to_rfc3339(),
        });
        *self.last_refresh_at.write() = Some(Utc::now());
        self.increment_version();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::LatestIndicators;
    use crate::signals::ScoreBreakdown;
    use crate::types::BiasLabel;

    fn snapshot() -> SignalSnapshot {
        SignalSnapshot {
            symbol: "^GSPC".into(),
            latest_close: 4500.0,
            latest_aux: 15.0,
            indicators: LatestIndicators {
                ema_8: 4500.0,
                ema_21: 4499.0,
                ema_55: 4498.0,
                last_return: 0.001,
                volatility_20: 0.002,
                zscore_20: 0.4,
            },
            scores: ScoreBreakdown {
                momentum_score: 0.5,
                regression_estimate: 0.001,
                model_estimate: 0.0009,
                ensemble_score: 0.12,
                dampened: false,
            },
            bias: BiasLabel::Flat,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn store_snapshot_clears_error_and_bumps_version() {
        let state = AppState::new(RuntimeConfig::default());
        state.store_error("fetch failed".into());
        assert!(state.last_error.read().is_some());
        let v = state.current_state_version();

        state.store_snapshot(snapshot());
        assert!(state.last_error.read().is_none());
        assert!(state.last_snapshot.read().is_some());
        assert!(state.current_state_version() > v);
    }

    #[test]
    fn failed_cycle_keeps_previous_snapshot() {
        let state = AppState::new(RuntimeConfig::default());
        state.store_snapshot(snapshot());
        state.store_error("provider timeout".into());
        assert!(state.last_snapshot.read().is_some());
        assert!(state.last_error.read().is_some());
    }
}
