//! # Config Loader — Loads and validates TOML configuration
//!
//! Reads `threatglobe.toml` (or a custom path) and deserializes into typed
//! config structs. Every section is optional; a missing file yields defaults
//! so the globe always starts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{GlobeError, GlobeResult};
use crate::palette::StaticTheme;
use crate::types::{DisplayMode, FilterState, Timeframe};

/// Top-level threat globe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub view: ViewConfig,
    /// Raw token overrides merged over the stock theme.
    #[serde(default)]
    pub theme: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "info".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { capacity: crate::DEFAULT_EVENT_CAPACITY }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub refresh_ms: u64,
    #[serde(default = "default_true")]
    pub seed: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { refresh_ms: crate::DEFAULT_REFRESH_MS, seed: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub display: String,
    pub spin: bool,
    pub timeframe: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            display: "points".into(),
            spin: true,
            timeframe: "24h".into(),
        }
    }
}

fn default_true() -> bool { true }

impl GlobeConfig {
    /// Load config from a TOML file path.
    pub fn load(path: impl AsRef<Path>) -> GlobeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: GlobeConfig = toml::from_str(&content)
            .map_err(|e| GlobeError::Config(format!("Failed to parse config: {}", e)))?;
        info!(
            path = %path.display(),
            capacity = config.store.capacity,
            refresh_ms = config.feed.refresh_ms,
            display = %config.view.display,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Save current config to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> GlobeResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GlobeError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Initial filter snapshot derived from the view and feed sections.
    /// Unrecognized display/timeframe strings fall back to defaults with a
    /// warning rather than refusing to start.
    pub fn filter_state(&self) -> FilterState {
        let mut filters = FilterState::default();
        filters.display = match DisplayMode::parse(&self.view.display) {
            Some(mode) => mode,
            None => {
                warn!(display = %self.view.display, "Unrecognized display mode, using points");
                DisplayMode::Points
            }
        };
        filters.timeframe = match Timeframe::parse(&self.view.timeframe) {
            Some(tf) => tf,
            None => {
                warn!(timeframe = %self.view.timeframe, "Unrecognized timeframe, using 24h");
                Timeframe::Last24Hours
            }
        };
        filters.spin = self.view.spin;
        filters.refresh_ms = self.feed.refresh_ms;
        filters
    }

    /// Stock theme with any `[theme]` overrides applied on top.
    pub fn theme(&self) -> StaticTheme {
        let mut theme = StaticTheme::with_defaults();
        for (token, value) in &self.theme {
            theme.set(token, value);
        }
        theme
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            store: StoreConfig::default(),
            feed: FeedConfig::default(),
            view: ViewConfig::default(),
            theme: HashMap::new(),
        }
    }
}
