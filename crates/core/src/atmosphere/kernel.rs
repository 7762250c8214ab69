//! Column-parallel third-moment kernel.
//!
//! Each column's `w3` profile depends only on that column's inputs, so the
//! kernel is a rayon parallel map over columns with no shared mutable state.
//! Results are identical for any thread count.

use super::third_moment::{interface_w3, FTermInputs, Stencil};
use crate::core_types::{ClosureMode, Real};
use crate::error::InputError;
use crate::grid::{
    ColumnField, ColumnSlice, Interface, InterfaceField, Midpoint, MidpointField, VerticalGrid,
};
use rayon::prelude::*;
use tracing::debug;

/// Borrowed kernel inputs for every column.
#[derive(Clone, Copy, Debug)]
pub struct ThirdMomentInputs<'a> {
    pub w_sec: &'a MidpointField,
    pub dz_zt: &'a MidpointField,
    pub tke: &'a MidpointField,
    pub dz_zi: &'a InterfaceField,
    pub thl_sec: &'a InterfaceField,
    pub wthl_sec: &'a InterfaceField,
    pub w_sec_zi: &'a InterfaceField,
    pub isotropy_zi: &'a InterfaceField,
    pub brunt_zi: &'a InterfaceField,
    pub thetal_zi: &'a InterfaceField,
}

/// One column of kernel inputs.
#[derive(Clone, Copy, Debug)]
pub struct ColumnInputs<'a> {
    pub w_sec: ColumnSlice<'a, Midpoint>,
    pub dz_zt: ColumnSlice<'a, Midpoint>,
    pub tke: ColumnSlice<'a, Midpoint>,
    pub dz_zi: ColumnSlice<'a, Interface>,
    pub thl_sec: ColumnSlice<'a, Interface>,
    pub wthl_sec: ColumnSlice<'a, Interface>,
    pub w_sec_zi: ColumnSlice<'a, Interface>,
    pub isotropy_zi: ColumnSlice<'a, Interface>,
    pub brunt_zi: ColumnSlice<'a, Interface>,
    pub thetal_zi: ColumnSlice<'a, Interface>,
}

fn check_shape<G: VerticalGrid>(
    name: &'static str,
    field: &ColumnField<G>,
    num_columns: usize,
    num_levels: usize,
) -> Result<(), InputError> {
    if field.num_columns() == num_columns && field.num_levels() == num_levels {
        Ok(())
    } else {
        Err(InputError::dimension_mismatch(
            name,
            num_columns * G::points(num_levels),
            field.len(),
        ))
    }
}

impl<'a> ThirdMomentInputs<'a> {
    /// Number of columns, taken from `w_sec`.
    pub fn num_columns(&self) -> usize {
        self.w_sec.num_columns()
    }

    /// Number of cell centers per column, taken from `w_sec`.
    pub fn num_levels(&self) -> usize {
        self.w_sec.num_levels()
    }

    /// Verify every field agrees with the shape of `w_sec`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DimensionMismatch`] naming the first field whose
    /// shape differs.
    pub fn check_shapes(&self) -> Result<(), InputError> {
        let (nc, nl) = (self.num_columns(), self.num_levels());
        check_shape("dz_zt", self.dz_zt, nc, nl)?;
        check_shape("tke", self.tke, nc, nl)?;
        check_shape("dz_zi", self.dz_zi, nc, nl)?;
        check_shape("thl_sec", self.thl_sec, nc, nl)?;
        check_shape("wthl_sec", self.wthl_sec, nc, nl)?;
        check_shape("w_sec_zi", self.w_sec_zi, nc, nl)?;
        check_shape("isotropy_zi", self.isotropy_zi, nc, nl)?;
        check_shape("brunt_zi", self.brunt_zi, nc, nl)?;
        check_shape("thetal_zi", self.thetal_zi, nc, nl)
    }

    /// Typed view of one column.
    ///
    /// # Panics
    ///
    /// Panics if `column` is out of range.
    pub fn column(&self, column: usize) -> ColumnInputs<'a> {
        ColumnInputs {
            w_sec: self.w_sec.column(column),
            dz_zt: self.dz_zt.column(column),
            tke: self.tke.column(column),
            dz_zi: self.dz_zi.column(column),
            thl_sec: self.thl_sec.column(column),
            wthl_sec: self.wthl_sec.column(column),
            w_sec_zi: self.w_sec_zi.column(column),
            isotropy_zi: self.isotropy_zi.column(column),
            brunt_zi: self.brunt_zi.column(column),
            thetal_zi: self.thetal_zi.column(column),
        }
    }
}

impl ColumnInputs<'_> {
    /// Number of cell centers in this column.
    #[inline]
    pub fn num_levels(&self) -> usize {
        self.w_sec.len()
    }

    /// Shared factors at interior interface `k`.
    #[inline]
    fn fterm_inputs(&self, k: usize) -> FTermInputs {
        FTermInputs::new(
            self.dz_zi[k],
            self.dz_zt[k],
            self.dz_zt[k - 1],
            self.isotropy_zi[k],
            self.brunt_zi[k],
            self.thetal_zi[k],
        )
    }

    /// Stencil at interior interface `k`: cell centers k-1/k, interfaces k-1/k/k+1.
    #[inline]
    fn stencil(&self, k: usize) -> Stencil {
        Stencil {
            wthl: self.wthl_sec[k],
            wthl_above: self.wthl_sec[k - 1],
            wthl_below: self.wthl_sec[k + 1],
            thl_above: self.thl_sec[k - 1],
            thl_below: self.thl_sec[k + 1],
            w_sec: self.w_sec[k],
            w_sec_above: self.w_sec[k - 1],
            w_sec_zi: self.w_sec_zi[k],
            tke: self.tke[k],
            tke_above: self.tke[k - 1],
        }
    }
}

/// Compute `w3` for one column.
///
/// `w3` must hold `num_levels + 1` interface values. Under
/// [`ClosureMode::ReducedTke`] every value is set to zero without evaluating
/// the closure. Under [`ClosureMode::General`] interior interfaces get the
/// closure value and the top and surface interfaces are set to zero.
pub fn compute_column(mode: ClosureMode, column: &ColumnInputs<'_>, w3: &mut [Real]) {
    if mode == ClosureMode::ReducedTke {
        w3.fill(0.0);
        return;
    }

    let num_levels = column.num_levels();
    for k in 1..num_levels {
        w3[k] = interface_w3(&column.fterm_inputs(k), &column.stencil(k));
    }

    // No skewness through the model top or the surface.
    if let Some(top) = w3.first_mut() {
        *top = 0.0;
    }
    if let Some(bottom) = w3.get_mut(num_levels) {
        *bottom = 0.0;
    }
}

/// Compute the diagnostic third moment of vertical velocity for every column.
///
/// # Arguments
///
/// * `mode` - Closure mode, selected once for the whole call
/// * `inputs` - Second-moment statistics on both grids
/// * `w3` - Output on the interface grid, overwritten in place
///
/// # Errors
///
/// Returns [`InputError::DimensionMismatch`] if any input or `w3` disagrees
/// with the shape of `inputs.w_sec`. Numeric content is never rejected;
/// degenerate inputs propagate as NaN or infinity.
pub fn compute_diag_third_moment(
    mode: ClosureMode,
    inputs: &ThirdMomentInputs<'_>,
    w3: &mut InterfaceField,
) -> Result<(), InputError> {
    inputs.check_shapes()?;
    check_shape("w3", w3, inputs.num_columns(), inputs.num_levels())?;

    debug!(
        "Computing w3: {} columns x {} levels, closure {}",
        inputs.num_columns(),
        inputs.num_levels(),
        mode
    );

    w3.par_columns_mut().for_each(|(c, column_w3)| {
        compute_column(mode, &inputs.column(c), column_w3);
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owned {
        w_sec: MidpointField,
        dz_zt: MidpointField,
        tke: MidpointField,
        dz_zi: InterfaceField,
        thl_sec: InterfaceField,
        wthl_sec: InterfaceField,
        w_sec_zi: InterfaceField,
        isotropy_zi: InterfaceField,
        brunt_zi: InterfaceField,
        thetal_zi: InterfaceField,
    }

    impl Owned {
        fn uniform(num_columns: usize, num_levels: usize) -> Self {
            let zt = |v| MidpointField::with_value(num_columns, num_levels, v);
            let zi = |v| InterfaceField::with_value(num_columns, num_levels, v);
            Self {
                w_sec: zt(0.3),
                dz_zt: zt(100.0),
                tke: zt(0.45),
                dz_zi: zi(100.0),
                thl_sec: zi(0.5),
                wthl_sec: zi(0.01),
                w_sec_zi: zi(0.3),
                isotropy_zi: zi(1000.0),
                brunt_zi: zi(1e-5),
                thetal_zi: zi(300.0),
            }
        }

        fn inputs(&self) -> ThirdMomentInputs<'_> {
            ThirdMomentInputs {
                w_sec: &self.w_sec,
                dz_zt: &self.dz_zt,
                tke: &self.tke,
                dz_zi: &self.dz_zi,
                thl_sec: &self.thl_sec,
                wthl_sec: &self.wthl_sec,
                w_sec_zi: &self.w_sec_zi,
                isotropy_zi: &self.isotropy_zi,
                brunt_zi: &self.brunt_zi,
                thetal_zi: &self.thetal_zi,
            }
        }
    }

    #[test]
    fn reduced_closure_zeroes_everything() {
        let owned = Owned::uniform(3, 6);
        let mut w3 = InterfaceField::with_value(3, 6, 42.0);
        compute_diag_third_moment(ClosureMode::ReducedTke, &owned.inputs(), &mut w3).unwrap();
        assert!(w3.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn boundaries_are_zero_in_general_mode() {
        let owned = Owned::uniform(2, 6);
        let mut w3 = InterfaceField::with_value(2, 6, 42.0);
        compute_diag_third_moment(ClosureMode::General, &owned.inputs(), &mut w3).unwrap();
        for c in 0..2 {
            assert_eq!(w3.get(0, c), 0.0);
            assert_eq!(w3.get(6, c), 0.0);
            for k in 1..6 {
                assert!(w3.get(k, c).is_finite());
                assert_ne!(w3.get(k, c), 42.0, "interior interface {k} not written");
            }
        }
    }

    #[test]
    fn columns_are_independent() {
        let mut owned = Owned::uniform(3, 5);
        // Perturb column 1 only.
        for k in 0..6 {
            owned.thl_sec.set(k, 1, 0.1 * (k as Real + 1.0));
        }
        let mut w3 = InterfaceField::new(3, 5);
        compute_diag_third_moment(ClosureMode::General, &owned.inputs(), &mut w3).unwrap();
        assert_eq!(w3.column(0).as_slice(), w3.column(2).as_slice());
        assert_ne!(w3.column(0).as_slice(), w3.column(1).as_slice());
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let mut owned = Owned::uniform(2, 5);
        owned.brunt_zi = InterfaceField::new(2, 4);
        let mut w3 = InterfaceField::new(2, 5);
        let err = compute_diag_third_moment(ClosureMode::General, &owned.inputs(), &mut w3)
            .unwrap_err();
        assert!(matches!(
            err,
            InputError::DimensionMismatch {
                field: "brunt_zi",
                ..
            }
        ));

        let owned = Owned::uniform(2, 5);
        let mut w3 = InterfaceField::new(3, 5);
        assert!(compute_diag_third_moment(ClosureMode::General, &owned.inputs(), &mut w3).is_err());
    }

    #[test]
    fn single_level_column_has_only_boundaries() {
        let owned = Owned::uniform(1, 1);
        let mut w3 = InterfaceField::with_value(1, 1, 3.0);
        compute_diag_third_moment(ClosureMode::General, &owned.inputs(), &mut w3).unwrap();
        assert_eq!(w3.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn zero_interface_spacing_does_not_panic() {
        let mut owned = Owned::uniform(1, 4);
        owned.dz_zi.fill(0.0);
        let mut w3 = InterfaceField::new(1, 4);
        compute_diag_third_moment(ClosureMode::General, &owned.inputs(), &mut w3).unwrap();
        assert!(w3.as_slice()[1..4].iter().all(|v| !v.is_finite()));
        assert_eq!(w3.get(0, 0), 0.0);
        assert_eq!(w3.get(4, 0), 0.0);
    }
}
