//! TOML configuration file support.
//!
//! Every key is optional; command-line flags take precedence over the file.
//!
//! ```toml
//! # preservalife.toml
//! [simulation]
//! seed = 42
//! max_steps = 50
//! max_samples = 1000
//!
//! [session]
//! tier = "medium"
//! pressure = 90
//! temperature = 36
//! layout = "layout.csv"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::types::{Celsius, MmHg, QualityTier, Setpoints};

/// Root configuration structure for preservalife.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

/// Settings for the `simulate` command.
#[derive(Debug, Default, Deserialize)]
pub struct SimulationConfig {
    /// Seed for the random generator; wall-clock nanoseconds when absent.
    pub seed: Option<u64>,

    /// Commands per trace.
    pub max_steps: Option<usize>,

    /// Number of traces.
    pub max_samples: Option<usize>,
}

/// Initial session settings for the `demo` command.
#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    pub tier: Option<QualityTier>,

    /// Initial pressure setpoint (mmHg), clamped into range.
    pub pressure: Option<MmHg>,

    /// Initial temperature setpoint (°C), clamped into range.
    pub temperature: Option<Celsius>,

    /// Layout sheet to import instead of the built-in demo grid.
    pub layout: Option<PathBuf>,
}

impl SessionConfig {
    /// Setpoints from the file, falling back to the defaults per field.
    pub fn setpoints(&self) -> Setpoints {
        let defaults = Setpoints::default();
        Setpoints::new(
            self.pressure.unwrap_or(defaults.pressure()),
            self.temperature.unwrap_or(defaults.temperature()),
        )
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
