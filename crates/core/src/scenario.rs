//! Convective boundary-layer test profile.
//!
//! A reasonable convective profile: variance peaks in the lower troposphere,
//! heat flux changes sign through the layer, and the lowest interface is
//! weakly unstable. Each successive column scales `thl_sec` by `column + 1`
//! while every other input is held fixed, so `|w3|` must grow with column
//! index at every interior interface.

use crate::atmosphere::ThirdMomentData;
use crate::core_types::{ClosureMode, Real};
use crate::error::InputError;
use crate::grid::{preprocess_column, InterfaceField, MidpointField};
use std::cmp::Ordering;
use thiserror::Error;

/// Largest `|w3|` accepted at an interior interface of a convective profile.
pub const W3_BOUND: Real = 10.0;

/// Interface-grid profiles of one column, top of model first.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvectiveProfile {
    /// Interface heights (m).
    pub zi_grid: Vec<Real>,
    /// Vertical velocity variance (m²/s²).
    pub w_sec_zi: Vec<Real>,
    /// Potential temperature variance (K²) of the first column.
    pub thl_sec: Vec<Real>,
    /// Vertical heat flux (K m/s).
    pub wthl_sec: Vec<Real>,
    /// Return-to-isotropy timescale (s).
    pub isotropy_zi: Vec<Real>,
    /// Brunt-Väisälä frequency.
    pub brunt_zi: Vec<Real>,
    /// Potential temperature (K).
    pub thetal_zi: Vec<Real>,
}

impl Default for ConvectiveProfile {
    fn default() -> Self {
        Self {
            zi_grid: vec![9000.0, 5000.0, 1500.0, 900.0, 500.0, 0.0],
            w_sec_zi: vec![0.2, 0.3, 0.5, 0.4, 0.3, 0.1],
            thl_sec: vec![0.5, 0.9, 1.2, 0.8, 0.4, 0.3],
            wthl_sec: vec![0.003, -0.03, -0.04, -0.01, 0.01, 0.03],
            isotropy_zi: vec![2000.0, 3000.0, 5000.0, 2000.0, 1000.0, 500.0],
            brunt_zi: vec![4e-5, 3e-5, 3e-5, 2e-5, 2e-5, -1e-5],
            thetal_zi: vec![330.0, 325.0, 320.0, 310.0, 300.0, 301.0],
        }
    }
}

impl ConvectiveProfile {
    /// Minimum columns for the column-scaling comparison to be meaningful.
    pub const MIN_COLUMNS: usize = 2;

    /// Number of cell centers described by the profile.
    pub fn num_levels(&self) -> usize {
        self.zi_grid.len().saturating_sub(1)
    }

    /// Build a kernel bundle with `num_columns` columns.
    ///
    /// Runs the grid preprocessor on `zi_grid` and `w_sec_zi`, then fills
    /// every column, scaling `thl_sec` by `column + 1`.
    ///
    /// # Errors
    ///
    /// - [`InputError::TooFewColumns`] if `num_columns < 2`
    /// - [`InputError::DimensionMismatch`] if a profile length differs from `zi_grid`
    pub fn build(
        &self,
        num_columns: usize,
        closure: ClosureMode,
    ) -> Result<ThirdMomentData, InputError> {
        if num_columns < Self::MIN_COLUMNS {
            return Err(InputError::TooFewColumns {
                required: Self::MIN_COLUMNS,
                actual: num_columns,
            });
        }

        let nl = self.num_levels();
        let grid = preprocess_column(&self.zi_grid, &self.w_sec_zi);
        let zi = |name, profile: &[Real]| {
            InterfaceField::from_profile(name, num_columns, nl, profile)
        };
        let zt = |name, profile: &[Real]| {
            MidpointField::from_profile(name, num_columns, nl, profile)
        };

        let mut data = ThirdMomentData::new(num_columns, nl, closure);
        data.w_sec = zt("w_sec", &grid.w_sec)?;
        data.dz_zt = zt("dz_zt", &grid.dz_zt)?;
        data.tke = zt("tke", &grid.tke)?;
        data.dz_zi = zi("dz_zi", &grid.dz_zi)?;
        data.wthl_sec = zi("wthl_sec", &self.wthl_sec)?;
        data.w_sec_zi = zi("w_sec_zi", &self.w_sec_zi)?;
        data.isotropy_zi = zi("isotropy_zi", &self.isotropy_zi)?;
        data.brunt_zi = zi("brunt_zi", &self.brunt_zi)?;
        data.thetal_zi = zi("thetal_zi", &self.thetal_zi)?;

        let mut thl_sec = zi("thl_sec", &self.thl_sec)?;
        for c in 0..num_columns {
            let scale = (c + 1) as Real;
            for v in thl_sec.column_mut(c) {
                *v *= scale;
            }
        }
        data.thl_sec = thl_sec;

        Ok(data)
    }

    /// Build and compute the scenario under both closure modes.
    ///
    /// Returns `(general, reduced)`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::build`].
    pub fn compute_both(
        &self,
        num_columns: usize,
    ) -> Result<(ThirdMomentData, ThirdMomentData), InputError> {
        let mut general = self.build(num_columns, ClosureMode::General)?;
        general.compute()?;
        let mut reduced = general.clone();
        reduced.closure = ClosureMode::ReducedTke;
        reduced.compute()?;
        Ok((general, reduced))
    }
}

/// A convective-profile property that did not hold.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyViolation {
    #[error("{closure}: w3[{level}] of column {column} is {value:e} at a boundary")]
    NonZeroBoundary {
        closure: ClosureMode,
        column: usize,
        level: usize,
        value: Real,
    },

    #[error("w3[{level}] of column {column} is {value:e}, outside ±{bound}")]
    Unbounded {
        column: usize,
        level: usize,
        value: Real,
        bound: Real,
    },

    #[error("column {column} has no positive interior w3")]
    NoPositiveSkewness { column: usize },

    #[error(
        "|w3[{level}]| of column {column} ({value:e}) does not exceed the previous column ({previous:e})"
    )]
    NotIncreasing {
        column: usize,
        level: usize,
        previous: Real,
        value: Real,
    },

    #[error("reduced-tke: w3[{level}] of column {column} is {value:e}, expected 0")]
    NonZeroReduced {
        column: usize,
        level: usize,
        value: Real,
    },
}

/// Check a computed convective scenario.
///
/// `general` and `reduced` are the same inputs computed under each closure
/// mode, as returned by [`ConvectiveProfile::compute_both`]. An empty result
/// means every property holds.
pub fn check_convective_properties(
    general: &ThirdMomentData,
    reduced: &ThirdMomentData,
) -> Vec<PropertyViolation> {
    let mut violations = Vec::new();
    let nl = general.num_levels();

    for (column, w3) in general.w3.columns().enumerate() {
        for level in [0, nl] {
            if w3[level] != 0.0 {
                violations.push(PropertyViolation::NonZeroBoundary {
                    closure: general.closure,
                    column,
                    level,
                    value: w3[level],
                });
            }
        }

        let interior = &w3.as_slice()[1..nl.max(1)];
        for (i, &value) in interior.iter().enumerate() {
            if value.is_nan() || value.abs() >= W3_BOUND {
                violations.push(PropertyViolation::Unbounded {
                    column,
                    level: i + 1,
                    value,
                    bound: W3_BOUND,
                });
            }
        }
        if !interior.iter().any(|&v| v > 0.0) {
            violations.push(PropertyViolation::NoPositiveSkewness { column });
        }

        if column > 0 {
            let below = general.w3.column(column - 1);
            for level in 1..nl {
                let previous = below[level].abs();
                let value = w3[level].abs();
                if value.partial_cmp(&previous) != Some(Ordering::Greater) {
                    violations.push(PropertyViolation::NotIncreasing {
                        column,
                        level,
                        previous,
                        value,
                    });
                }
            }
        }
    }

    for (column, w3) in reduced.w3.columns().enumerate() {
        if let Some(level) = w3.as_slice().iter().position(|&v| v != 0.0) {
            violations.push(PropertyViolation::NonZeroReduced {
                column,
                level,
                value: w3[level],
            });
        }
    }

    violations
}
