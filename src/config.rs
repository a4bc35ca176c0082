//! Dashboard configuration
//!
//! Timing of the simulated upload and the location of the persisted store.
//! Every field has a default, so a partial JSON file is enough.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "Flora";

/// Default store file, relative to the working directory
pub const DEFAULT_STORE_FILE: &str = "flora-store.json";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Progress added per upload tick (percent)
    pub progress_step: u8,
    /// Interval between upload ticks (ms)
    pub tick_interval_ms: u64,
    /// Simulated processing time (ms)
    pub processing_delay_ms: u64,
    /// Delay between success and navigating to the dashboard (ms)
    pub redirect_delay_ms: u64,
    /// Backing file of the local store
    pub store_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            progress_step: 5,
            tick_interval_ms: 100,
            processing_delay_ms: 2000,
            redirect_delay_ms: 2000,
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, DashboardError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(DashboardError::ConfigError(format!(
                "progress_step must be within 1..=100, got {}",
                self.progress_step
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(DashboardError::ConfigError(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}
