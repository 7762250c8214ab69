//! Error types for shape checks, input validation and configuration.

use crate::core_types::Real;
use thiserror::Error;

/// Errors raised before a kernel call when buffers or inputs are unusable.
///
/// Numeric content never produces one of these inside the kernel itself; the
/// kernel only rejects buffers whose shape disagrees with the declared grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// A buffer length disagrees with the declared grid shape.
    #[error("field `{field}`: expected {expected} values, got {actual}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A value violates the physical constraint the harness expects.
    #[error("field `{field}` at level {level}, column {column}: {value} violates `{constraint}`")]
    OutOfRange {
        field: &'static str,
        level: usize,
        column: usize,
        value: Real,
        constraint: &'static str,
    },

    /// Scenario construction needs more columns than were requested.
    #[error("scenario needs at least {required} columns, got {actual}")]
    TooFewColumns { required: usize, actual: usize },

    /// A random-sampling range is empty or non-finite.
    #[error("random range for `{field}` must satisfy low < high and be finite, got [{low}, {high})")]
    InvalidRange {
        field: &'static str,
        low: Real,
        high: Real,
    },
}

impl InputError {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            field,
            expected,
            actual,
        }
    }
}

/// Errors raised while loading harness configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for `HarnessConfig`.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration parsed but describes an unusable run.
    #[error("invalid config: {0}")]
    Invalid(#[from] InputError),
}
