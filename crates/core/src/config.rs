//! Reproducibility harness configuration.
//!
//! Loaded from YAML. Every section has defaults, so an empty file (or no
//! file at all) runs the standard four-case suite with seed 0.
//!
//! ```yaml
//! seed: 42
//! closure: general
//! baseline:
//!   action: compare
//!   path: baselines/w3.bin
//! cases:
//!   - { num_columns: 10, num_levels: 71 }
//! ranges:
//!   thetal_zi: { low: 280.0, high: 320.0 }
//! ```

use crate::baseline::{BaselineAction, RandomRanges};
use crate::core_types::ClosureMode;
use crate::error::{ConfigError, InputError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shape of one reproducibility case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseShape {
    pub num_columns: usize,
    pub num_levels: usize,
}

impl CaseShape {
    #[must_use]
    pub const fn new(num_columns: usize, num_levels: usize) -> Self {
        Self {
            num_columns,
            num_levels,
        }
    }
}

/// Shapes exercised when no cases are configured.
pub const DEFAULT_CASES: [CaseShape; 4] = [
    CaseShape::new(10, 71),
    CaseShape::new(10, 12),
    CaseShape::new(7, 16),
    CaseShape::new(2, 7),
];

/// Where and how to use the reference trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub action: BaselineAction,
    pub path: PathBuf,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            action: BaselineAction::None,
            path: PathBuf::from("w3_baseline.bin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Seed for the input generator.
    pub seed: u64,
    pub closure: ClosureMode,
    pub baseline: BaselineConfig,
    pub cases: Vec<CaseShape>,
    pub ranges: RandomRanges,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            closure: ClosureMode::General,
            baseline: BaselineConfig::default(),
            cases: DEFAULT_CASES.to_vec(),
            ranges: RandomRanges::default(),
        }
    }
}

impl HarnessConfig {
    /// Load and validate a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the sampling ranges.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidRange`] for an unusable sampling range.
    pub fn validate(&self) -> Result<(), InputError> {
        self.ranges.validate()
    }
}
