use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Largest board, in cells, the engine accepts
pub const MAX_CELLS: usize = 1 << 20;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid (columns)
    pub grid_width: usize,
    /// Height of the game grid (rows)
    pub grid_height: usize,
    /// Tick pacing used by the loop driver
    pub speed: SpeedConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            speed: SpeedConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(5, 5)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let cells = self.grid_width.checked_mul(self.grid_height);
        if !matches!(cells, Some(n) if n > 0 && n <= MAX_CELLS) {
            return Err(EngineError::InvalidDimensions {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&raw).context("Failed to deserialize game config")?;
        config.validate().context("Invalid game config")?;
        Ok(config)
    }
}

/// Linear speed-up: every point shortens the tick, down to a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// Delay between ticks at score 0
    pub base_delay_ms: u64,
    /// Fraction of the base delay removed per point scored
    pub speedup_per_point: f64,
    /// Smallest fraction of the base delay a tick may shrink to
    pub min_speed_factor: f64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 250,
            speedup_per_point: 0.01,
            min_speed_factor: 0.2,
        }
    }
}

impl SpeedConfig {
    pub fn tick_delay(&self, score: u32) -> Duration {
        let factor = (1.0 - score as f64 * self.speedup_per_point).max(self.min_speed_factor);
        Duration::from_millis(((self.base_delay_ms as f64 * factor).round() as u64).max(1))
    }
}
