use crate::error::{with_last_error_mut, DefaultW3Error, W3Error, W3ErrorCode};
use std::ffi::CString;
use std::slice;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl W3Error) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record `error` and return its code.
#[inline]
pub(crate) fn track_error(error: &impl W3Error) -> W3ErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
/// Called on every successful operation.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = W3ErrorCode::Ok;
    });
}

/// Map a `Result` onto an FFI status, recording the error on failure.
pub(crate) fn finish(result: Result<(), DefaultW3Error>) -> W3ErrorCode {
    match result {
        Ok(()) => {
            clear_last_error();
            W3ErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// `columns * points` as a buffer length, rejecting overflow.
pub(crate) fn buffer_len(
    num_columns: usize,
    points: usize,
    grid: &str,
) -> Result<usize, DefaultW3Error> {
    num_columns
        .checked_mul(points)
        .filter(|&len| len <= isize::MAX as usize / std::mem::size_of::<f64>())
        .ok_or_else(|| {
            DefaultW3Error::invalid_dimensions(&format!(
                "{num_columns} columns x {points} {grid} points overflows a buffer"
            ))
        })
}

/// Borrow `len` values behind a caller pointer.
///
/// # Safety
/// `ptr` must be non-null and valid for reads of `len` values.
pub(crate) unsafe fn input<'a>(
    ptr: *const f64,
    len: usize,
    name: &str,
) -> Result<&'a [f64], DefaultW3Error> {
    if ptr.is_null() {
        return Err(DefaultW3Error::null_pointer(name));
    }
    // SAFETY: non-null checked above; validity for `len` reads is the caller's contract.
    Ok(slice::from_raw_parts(ptr, len))
}

/// Mutably borrow `len` values behind a caller pointer.
///
/// # Safety
/// `ptr` must be non-null, valid for writes of `len` values and not aliased.
pub(crate) unsafe fn output<'a>(
    ptr: *mut f64,
    len: usize,
    name: &str,
) -> Result<&'a mut [f64], DefaultW3Error> {
    if ptr.is_null() {
        return Err(DefaultW3Error::null_pointer(name));
    }
    // SAFETY: non-null checked above; validity and exclusivity are the caller's contract.
    Ok(slice::from_raw_parts_mut(ptr, len))
}
