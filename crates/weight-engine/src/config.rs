//! Analysis configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) gives the standard ±10% analysis.
//!
//! ```toml
//! [analysis]
//! tolerance = 0.10
//! adjustment_epsilon_kg = 0.001
//! parse_timeout_ms = 10000
//! default_gr_unit = "kg"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shipment_types::WeightUnit;

use crate::band::{ensure_tolerance, DEFAULT_TOLERANCE};
use crate::error::{ReconcileError, Result};

/// Top-level layout of the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Tolerance fraction, e.g. 0.10 for ±10%
    pub tolerance: f64,

    /// A line counts as adjusted when its new weight moves by more than this
    pub adjustment_epsilon_kg: f64,

    /// Per-document text extraction budget
    pub parse_timeout_ms: u64,

    /// Unit assumed for a GR total printed without one
    pub default_gr_unit: WeightUnit,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            adjustment_epsilon_kg: 0.001,
            parse_timeout_ms: 10_000,
            default_gr_unit: WeightUnit::Kg,
        }
    }
}

impl AnalysisConfig {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Config` if the file cannot be read, the TOML
    /// is malformed, or a value is out of range.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReconcileError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(s: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(s).map_err(|e| ReconcileError::Config(e.to_string()))?;
        file.analysis.validate()?;
        Ok(file.analysis)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_tolerance(self.tolerance).map_err(|e| ReconcileError::Config(e.to_string()))?;

        if !self.adjustment_epsilon_kg.is_finite() || self.adjustment_epsilon_kg < 0.0 {
            return Err(ReconcileError::Config(format!(
                "adjustment_epsilon_kg must be >= 0 (got {})",
                self.adjustment_epsilon_kg
            )));
        }

        if self.parse_timeout_ms == 0 {
            return Err(ReconcileError::Config(
                "parse_timeout_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn parse_timeout(&self) -> Duration {
        Duration::from_millis(self.parse_timeout_ms)
    }
}
