//! C interface to the SHOC third-moment kernel.
//!
//! All buffers are caller-owned `double` arrays in column-major order:
//! element `(level, column)` lives at `level + column * points`, where
//! `points` is `num_levels` on the midpoint grid and `num_levels + 1` on the
//! interface grid. Every function returns a [`W3ErrorCode`]; on failure the
//! message is available from [`shoc_w3_get_last_error`].

mod error;
mod helpers;

pub use error::{shoc_w3_get_last_error, shoc_w3_get_last_error_code, W3ErrorCode};

use error::DefaultW3Error;
use helpers::{buffer_len, finish, input, output};
use shoc_w3_core::grid::{ColumnField, VerticalGrid};
use shoc_w3_core::{
    compute_diag_third_moment, preprocess_column, ClosureMode, InterfaceField, ThirdMomentInputs,
};

/// Copy one caller buffer into a typed field.
///
/// # Safety
/// `ptr` must be valid for reads of `num_columns * G::points(num_levels)` values.
unsafe fn read_field<G: VerticalGrid>(
    ptr: *const f64,
    num_columns: usize,
    num_levels: usize,
    name: &'static str,
) -> Result<ColumnField<G>, DefaultW3Error> {
    let len = buffer_len(num_columns, G::points(num_levels), G::NAME)?;
    let values = input(ptr, len, name)?;
    Ok(ColumnField::from_vec(
        name,
        num_columns,
        num_levels,
        values.to_vec(),
    )?)
}

fn check_levels(num_levels: usize) -> Result<(), DefaultW3Error> {
    if num_levels.checked_add(1).is_some() {
        Ok(())
    } else {
        Err(DefaultW3Error::invalid_dimensions(
            "num_levels + 1 overflows",
        ))
    }
}

unsafe fn preprocess_into(
    zi_grid: *const f64,
    w_sec_zi: *const f64,
    num_levels: usize,
    out_zt_grid: *mut f64,
    out_w_sec: *mut f64,
    out_tke: *mut f64,
    out_dz_zt: *mut f64,
    out_dz_zi: *mut f64,
) -> Result<(), DefaultW3Error> {
    check_levels(num_levels)?;
    let zi_grid = input(zi_grid, num_levels + 1, "zi_grid")?;
    let w_sec_zi = input(w_sec_zi, num_levels + 1, "w_sec_zi")?;
    let outputs = [
        ("out_zt_grid", out_zt_grid),
        ("out_w_sec", out_w_sec),
        ("out_tke", out_tke),
        ("out_dz_zt", out_dz_zt),
        ("out_dz_zi", out_dz_zi),
    ];
    if let Some((name, _)) = outputs.iter().find(|(_, ptr)| ptr.is_null()) {
        return Err(DefaultW3Error::null_pointer(name));
    }

    let column = preprocess_column(zi_grid, w_sec_zi);
    output(out_zt_grid, num_levels, "out_zt_grid")?.copy_from_slice(&column.zt_grid);
    output(out_w_sec, num_levels, "out_w_sec")?.copy_from_slice(&column.w_sec);
    output(out_tke, num_levels, "out_tke")?.copy_from_slice(&column.tke);
    output(out_dz_zt, num_levels, "out_dz_zt")?.copy_from_slice(&column.dz_zt);
    output(out_dz_zi, num_levels + 1, "out_dz_zi")?.copy_from_slice(&column.dz_zi);
    Ok(())
}

/// Derive midpoint quantities for one column from its interface profile.
///
/// # Parameters
/// - `zi_grid`, `w_sec_zi`: `num_levels + 1` interface values, top first
/// - `out_zt_grid`, `out_w_sec`, `out_tke`, `out_dz_zt`: `num_levels` values each
/// - `out_dz_zi`: `num_levels + 1` values
///
/// # Returns
/// - `W3ErrorCode::Ok` (0) on success, with every output written
/// - `W3ErrorCode::NullPointer` (1) if any pointer is null; nothing is written
/// - `W3ErrorCode::InvalidDimensions` (2) if `num_levels + 1` overflows
///
/// # Safety
/// Every pointer must be non-null and valid for the number of values listed
/// above. Output buffers must not overlap the inputs or each other.
#[no_mangle]
pub unsafe extern "C" fn shoc_w3_preprocess_column(
    zi_grid: *const f64,
    w_sec_zi: *const f64,
    num_levels: usize,
    out_zt_grid: *mut f64,
    out_w_sec: *mut f64,
    out_tke: *mut f64,
    out_dz_zt: *mut f64,
    out_dz_zi: *mut f64,
) -> W3ErrorCode {
    finish(preprocess_into(
        zi_grid,
        w_sec_zi,
        num_levels,
        out_zt_grid,
        out_w_sec,
        out_tke,
        out_dz_zt,
        out_dz_zi,
    ))
}

unsafe fn compute_into(
    num_columns: usize,
    num_levels: usize,
    shoc_1p5tke: bool,
    w_sec: *const f64,
    dz_zt: *const f64,
    tke: *const f64,
    dz_zi: *const f64,
    thl_sec: *const f64,
    wthl_sec: *const f64,
    w_sec_zi: *const f64,
    isotropy_zi: *const f64,
    brunt_zi: *const f64,
    thetal_zi: *const f64,
    out_w3: *mut f64,
) -> Result<(), DefaultW3Error> {
    check_levels(num_levels)?;
    let (nc, nl) = (num_columns, num_levels);
    let w_sec = read_field(w_sec, nc, nl, "w_sec")?;
    let dz_zt = read_field(dz_zt, nc, nl, "dz_zt")?;
    let tke = read_field(tke, nc, nl, "tke")?;
    let dz_zi = read_field(dz_zi, nc, nl, "dz_zi")?;
    let thl_sec = read_field(thl_sec, nc, nl, "thl_sec")?;
    let wthl_sec = read_field(wthl_sec, nc, nl, "wthl_sec")?;
    let w_sec_zi = read_field(w_sec_zi, nc, nl, "w_sec_zi")?;
    let isotropy_zi = read_field(isotropy_zi, nc, nl, "isotropy_zi")?;
    let brunt_zi = read_field(brunt_zi, nc, nl, "brunt_zi")?;
    let thetal_zi = read_field(thetal_zi, nc, nl, "thetal_zi")?;
    if out_w3.is_null() {
        return Err(DefaultW3Error::null_pointer("out_w3"));
    }

    let inputs = ThirdMomentInputs {
        w_sec: &w_sec,
        dz_zt: &dz_zt,
        tke: &tke,
        dz_zi: &dz_zi,
        thl_sec: &thl_sec,
        wthl_sec: &wthl_sec,
        w_sec_zi: &w_sec_zi,
        isotropy_zi: &isotropy_zi,
        brunt_zi: &brunt_zi,
        thetal_zi: &thetal_zi,
    };
    let mut w3 = InterfaceField::new(nc, nl);
    compute_diag_third_moment(ClosureMode::from_1p5tke_flag(shoc_1p5tke), &inputs, &mut w3)?;

    output(out_w3, w3.len(), "out_w3")?.copy_from_slice(w3.as_slice());
    Ok(())
}

/// Diagnose the third moment of vertical velocity for every column.
///
/// # Parameters
/// - `shoc_1p5tke`: `true` selects the reduced 1.5-order TKE closure, which
///   writes zero to every `w3` value
/// - `w_sec`, `dz_zt`, `tke`: midpoint grid, `num_columns * num_levels` values
/// - `dz_zi`, `thl_sec`, `wthl_sec`, `w_sec_zi`, `isotropy_zi`, `brunt_zi`,
///   `thetal_zi`: interface grid, `num_columns * (num_levels + 1)` values
/// - `out_w3`: interface grid output
///
/// # Returns
/// - `W3ErrorCode::Ok` (0) on success, with `out_w3` fully written
/// - `W3ErrorCode::NullPointer` (1) if any pointer is null; `out_w3` is untouched
/// - `W3ErrorCode::InvalidDimensions` (2) if the buffer sizes overflow
///
/// Non-finite inputs are not rejected and propagate into `out_w3`.
///
/// # Safety
/// Every pointer must be non-null and valid for the number of values listed
/// above. `out_w3` must not overlap any input.
#[no_mangle]
pub unsafe extern "C" fn shoc_w3_compute_diag_third_moment(
    num_columns: usize,
    num_levels: usize,
    shoc_1p5tke: bool,
    w_sec: *const f64,
    dz_zt: *const f64,
    tke: *const f64,
    dz_zi: *const f64,
    thl_sec: *const f64,
    wthl_sec: *const f64,
    w_sec_zi: *const f64,
    isotropy_zi: *const f64,
    brunt_zi: *const f64,
    thetal_zi: *const f64,
    out_w3: *mut f64,
) -> W3ErrorCode {
    finish(compute_into(
        num_columns,
        num_levels,
        shoc_1p5tke,
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
        out_w3,
    ))
}
