//! Grid preprocessing from interface heights.
//!
//! Derives the cell-center grid, layer thicknesses on both grids, and the
//! midpoint second moments (`w_sec`, `tke`) that the third-moment kernel
//! consumes. Levels are ordered top-to-bottom, so interface heights decrease
//! with index and every thickness is a positive difference.
//!
//! ```text
//!  zi[0]  ───────────────  top of model      dz_zi[0] = 0
//!  zt[0]        ·          dz_zt[0] = zi[0] - zi[1]
//!  zi[1]  ───────────────                    dz_zi[1] = zt[0] - zt[1]
//!  zt[1]        ·
//!   ...
//!  zi[n]  ───────────────  surface           dz_zi[n] = zt[n-1]
//! ```
//!
//! No bounds checking happens here: non-monotonic heights give non-positive
//! thicknesses, which callers catch with [`ThirdMomentData::validate`].
//!
//! [`ThirdMomentData::validate`]: crate::atmosphere::ThirdMomentData::validate

use super::column_field::{InterfaceField, MidpointField};
use crate::core_types::{Real, TKE_FROM_W_SEC};
use crate::error::InputError;
use rayon::prelude::*;

/// Preprocessed quantities for a single column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreprocessedColumn {
    /// Cell-center heights (m), `num_levels` values.
    pub zt_grid: Vec<Real>,
    /// Vertical velocity variance at cell centers (m²/s²).
    pub w_sec: Vec<Real>,
    /// Turbulent kinetic energy at cell centers (m²/s²).
    pub tke: Vec<Real>,
    /// Cell thickness (m), `num_levels` values.
    pub dz_zt: Vec<Real>,
    /// Center-to-center spacing at interfaces (m), `num_levels + 1` values.
    pub dz_zi: Vec<Real>,
}

/// Preprocess one column from its interface heights and interface `w_sec`.
///
/// Both slices hold `num_levels + 1` interface values. If their lengths differ
/// the shorter one bounds the level count.
#[must_use]
pub fn preprocess_column(zi_grid: &[Real], w_sec_zi: &[Real]) -> PreprocessedColumn {
    let num_levels = zi_grid.len().min(w_sec_zi.len()).saturating_sub(1);

    let zt_grid: Vec<Real> = (0..num_levels)
        .map(|n| 0.5 * (zi_grid[n] + zi_grid[n + 1]))
        .collect();
    let w_sec: Vec<Real> = (0..num_levels)
        .map(|n| 0.5 * (w_sec_zi[n] + w_sec_zi[n + 1]))
        .collect();
    let tke = w_sec.iter().map(|&w| TKE_FROM_W_SEC * w).collect();
    let dz_zt = (0..num_levels)
        .map(|n| zi_grid[n] - zi_grid[n + 1])
        .collect();

    let mut dz_zi = vec![0.0; num_levels + 1];
    for n in 1..num_levels {
        dz_zi[n] = zt_grid[n - 1] - zt_grid[n];
    }
    // Lowest interface extends from the lowest cell center down to the surface.
    if let Some(&lowest) = zt_grid.last() {
        dz_zi[num_levels] = lowest;
    }

    PreprocessedColumn {
        zt_grid,
        w_sec,
        tke,
        dz_zt,
        dz_zi,
    }
}

/// Preprocessed quantities for every column, as typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPreprocessOutput {
    pub zt_grid: MidpointField,
    pub w_sec: MidpointField,
    pub tke: MidpointField,
    pub dz_zt: MidpointField,
    pub dz_zi: InterfaceField,
}

/// Preprocess every column in parallel.
///
/// # Errors
///
/// Returns [`InputError::DimensionMismatch`] if `w_sec_zi` does not have the
/// same shape as `zi_grid`.
pub fn preprocess(
    zi_grid: &InterfaceField,
    w_sec_zi: &InterfaceField,
) -> Result<GridPreprocessOutput, InputError> {
    if w_sec_zi.num_columns() != zi_grid.num_columns()
        || w_sec_zi.num_levels() != zi_grid.num_levels()
    {
        return Err(InputError::dimension_mismatch(
            "w_sec_zi",
            zi_grid.len(),
            w_sec_zi.len(),
        ));
    }

    let num_columns = zi_grid.num_columns();
    let num_levels = zi_grid.num_levels();

    let columns: Vec<PreprocessedColumn> = (0..num_columns)
        .into_par_iter()
        .map(|c| preprocess_column(zi_grid.column(c).as_slice(), w_sec_zi.column(c).as_slice()))
        .collect();

    let mut out = GridPreprocessOutput {
        zt_grid: MidpointField::new(num_columns, num_levels),
        w_sec: MidpointField::new(num_columns, num_levels),
        tke: MidpointField::new(num_columns, num_levels),
        dz_zt: MidpointField::new(num_columns, num_levels),
        dz_zi: InterfaceField::new(num_columns, num_levels),
    };
    for (c, column) in columns.iter().enumerate() {
        out.zt_grid.column_mut(c).copy_from_slice(&column.zt_grid);
        out.w_sec.column_mut(c).copy_from_slice(&column.w_sec);
        out.tke.column_mut(c).copy_from_slice(&column.tke);
        out.dz_zt.column_mut(c).copy_from_slice(&column.dz_zt);
        out.dz_zi.column_mut(c).copy_from_slice(&column.dz_zi);
    }

    Ok(out)
}
