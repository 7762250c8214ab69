//! Owned input/output bundle for one kernel invocation.

use super::kernel::{compute_diag_third_moment, ThirdMomentInputs};
use crate::core_types::{ClosureMode, Real};
use crate::error::InputError;
use crate::grid::{ColumnField, InterfaceField, MidpointField, VerticalGrid};

/// All buffers for one third-moment computation, plus the closure mode.
///
/// Mirrors the shape of a driver call: ten input fields on the two grids
/// and the `w3` output on the interface grid. Owned by the caller for the
/// duration of a call; nothing persists between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ThirdMomentData {
    pub closure: ClosureMode,

    // Cell-center grid
    pub w_sec: MidpointField,
    pub dz_zt: MidpointField,
    pub tke: MidpointField,

    // Interface grid
    pub dz_zi: InterfaceField,
    pub thl_sec: InterfaceField,
    pub wthl_sec: InterfaceField,
    pub w_sec_zi: InterfaceField,
    pub isotropy_zi: InterfaceField,
    pub brunt_zi: InterfaceField,
    pub thetal_zi: InterfaceField,

    /// Output: third moment of vertical velocity.
    pub w3: InterfaceField,
}

impl ThirdMomentData {
    /// Create a zero-filled bundle.
    ///
    /// # Arguments
    ///
    /// * `num_columns` - Number of independent columns
    /// * `num_levels` - Cell centers per column; interfaces are `num_levels + 1`
    /// * `closure` - Closure mode used by [`Self::compute`]
    #[must_use]
    pub fn new(num_columns: usize, num_levels: usize, closure: ClosureMode) -> Self {
        let zt = || MidpointField::new(num_columns, num_levels);
        let zi = || InterfaceField::new(num_columns, num_levels);
        Self {
            closure,
            w_sec: zt(),
            dz_zt: zt(),
            tke: zt(),
            dz_zi: zi(),
            thl_sec: zi(),
            wthl_sec: zi(),
            w_sec_zi: zi(),
            isotropy_zi: zi(),
            brunt_zi: zi(),
            thetal_zi: zi(),
            w3: zi(),
        }
    }

    pub fn num_columns(&self) -> usize {
        self.w_sec.num_columns()
    }

    pub fn num_levels(&self) -> usize {
        self.w_sec.num_levels()
    }

    pub fn num_interfaces(&self) -> usize {
        self.w3.points_per_column()
    }

    /// Number of `w3` values across all columns.
    pub fn total_w3(&self) -> usize {
        self.w3.len()
    }

    /// Borrow the kernel inputs.
    pub fn inputs(&self) -> ThirdMomentInputs<'_> {
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

    /// Run the kernel with this bundle's closure mode, writing into `self.w3`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DimensionMismatch`] if a field was replaced with
    /// one of a different shape.
    pub fn compute(&mut self) -> Result<(), InputError> {
        let Self {
            closure,
            w_sec,
            dz_zt,
            tke,
            dz_zi,
            thl_sec,
            wthl_sec,
            w_sec_zi,
            isotropy_zi,
            brunt_zi,
            thetal_zi,
            w3,
        } = self;
        let inputs = ThirdMomentInputs {
            w_sec,
            dz_zt,
            tke,
            dz_zi,
            thl_sec,
            wthl_sec,
            w_sec_zi,
            isotropy_zi,
            brunt_zi,
            thetal_zi,
        };
        compute_diag_third_moment(*closure, &inputs, w3)
    }

    /// Input fields in canonical order, with their names.
    ///
    /// This order is used by the random generator and the trace codec.
    pub fn input_fields(&self) -> [(&'static str, &[Real]); 10] {
        [
            ("w_sec", self.w_sec.as_slice()),
            ("dz_zt", self.dz_zt.as_slice()),
            ("tke", self.tke.as_slice()),
            ("dz_zi", self.dz_zi.as_slice()),
            ("thl_sec", self.thl_sec.as_slice()),
            ("wthl_sec", self.wthl_sec.as_slice()),
            ("w_sec_zi", self.w_sec_zi.as_slice()),
            ("isotropy_zi", self.isotropy_zi.as_slice()),
            ("brunt_zi", self.brunt_zi.as_slice()),
            ("thetal_zi", self.thetal_zi.as_slice()),
        ]
    }

    /// Mutable input fields in canonical order, with their names.
    pub fn input_fields_mut(&mut self) -> [(&'static str, &mut [Real]); 10] {
        [
            ("w_sec", self.w_sec.as_mut_slice()),
            ("dz_zt", self.dz_zt.as_mut_slice()),
            ("tke", self.tke.as_mut_slice()),
            ("dz_zi", self.dz_zi.as_mut_slice()),
            ("thl_sec", self.thl_sec.as_mut_slice()),
            ("wthl_sec", self.wthl_sec.as_mut_slice()),
            ("w_sec_zi", self.w_sec_zi.as_mut_slice()),
            ("isotropy_zi", self.isotropy_zi.as_mut_slice()),
            ("brunt_zi", self.brunt_zi.as_mut_slice()),
            ("thetal_zi", self.thetal_zi.as_mut_slice()),
        ]
    }

    /// Check the physical constraints the kernel's callers are expected to meet.
    ///
    /// The kernel never calls this; it is the caller-side validation layer.
    ///
    /// # Errors
    ///
    /// Returns the first [`InputError::OutOfRange`] found, scanning fields in
    /// canonical order and each field column by column.
    pub fn validate(&self) -> Result<(), InputError> {
        require(&self.w_sec, "w_sec", ">= 0", |v| v >= 0.0)?;
        require(&self.dz_zt, "dz_zt", "> 0", |v| v > 0.0)?;
        require(&self.tke, "tke", "> 0", |v| v > 0.0)?;
        require(&self.dz_zi, "dz_zi", ">= 0", |v| v >= 0.0)?;
        require(&self.thl_sec, "thl_sec", ">= 0", |v| v >= 0.0)?;
        require(&self.w_sec_zi, "w_sec_zi", ">= 0", |v| v >= 0.0)?;
        require(&self.isotropy_zi, "isotropy_zi", ">= 0", |v| v >= 0.0)?;
        require(&self.thetal_zi, "thetal_zi", ">= 0", |v| v >= 0.0)
    }
}

fn require<G: VerticalGrid>(
    field: &ColumnField<G>,
    name: &'static str,
    constraint: &'static str,
    ok: fn(Real) -> bool,
) -> Result<(), InputError> {
    for (column, values) in field.columns().enumerate() {
        if let Some(level) = values.as_slice().iter().position(|&v| !ok(v)) {
            return Err(InputError::OutOfRange {
                field: name,
                level,
                column,
                value: values[level],
                constraint,
            });
        }
    }
    Ok(())
}
