// =============================================================================
// Runtime Configuration — engine settings with atomic save
// =============================================================================
//
// Every field carries `#[serde(default)]` so that adding new fields never
// breaks loading an older config file. Persistence uses an atomic tmp +
// rename pattern to prevent corruption on crash.
//
// Signal thresholds, ensemble weights, and the volatility-dampening constants
// are deliberately NOT here: they define the signal and live as constants in
// the `signals` module.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbol() -> String {
    "^GSPC".to_string()
}

fn default_aux_symbol() -> String {
    "^VIX".to_string()
}

fn default_range() -> String {
    "5d".to_string()
}

fn default_interval() -> String {
    "15m".to_string()
}

fn default_refresh_secs() -> u64 {
    300
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the bias engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Equity index the pipeline scores.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Auxiliary volatility index used for signal dampening.
    #[serde(default = "default_aux_symbol")]
    pub aux_symbol: String,

    /// Chart range requested from the data provider (e.g. "5d").
    #[serde(default = "default_range")]
    pub range: String,

    /// Bar interval requested from the data provider (e.g. "15m").
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Seconds between refresh cycles. Mirrors the provider-side cache TTL.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// HTTP bind address for the presentation API.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            aux_symbol: default_aux_symbol(),
            range: default_range(),
            interval: default_interval(),
            refresh_secs: default_refresh_secs(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = %config.symbol,
            aux_symbol = %config.aux_symbol,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.symbol, "^GSPC");
        assert_eq!(cfg.aux_symbol, "^VIX");
        assert_eq!(cfg.range, "5d");
        assert_eq!(cfg.interval, "15m");
        assert_eq!(cfg.refresh_secs, 300);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.symbol, "^GSPC");
        assert_eq!(cfg.refresh_secs, 300);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "symbol": "^NDX", "refresh_secs": 60 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.symbol, "^NDX");
        assert_eq!(cfg.refresh_secs, 60);
        assert_eq!(cfg.aux_symbol, "^VIX");
        assert_eq!(cfg.interval, "15m");
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.symbol, cfg2.symbol);
        assert_eq!(cfg.refresh_secs, cfg2.refresh_secs);
        assert_eq!(cfg.bind_addr, cfg2.bind_addr);
    }
}
