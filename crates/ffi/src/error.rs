use shoc_w3_core::InputError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// `code()` is what crosses the boundary; `msg()` is kept in thread-local
/// storage for [`shoc_w3_get_last_error`].
pub(crate) trait W3Error {
    fn code(&self) -> W3ErrorCode;

    fn msg(&self) -> &str;
}

/// Default [`W3Error`] carrying a code and a formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultW3Error {
    code: W3ErrorCode,
    msg: String,
}

impl DefaultW3Error {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"w_sec"`, `"out_w3"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: W3ErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for grid dimensions that cannot describe a buffer.
    pub fn invalid_dimensions(message: &str) -> Self {
        Self {
            code: W3ErrorCode::InvalidDimensions,
            msg: format!("Invalid dimensions: {message}"),
        }
    }
}

impl From<InputError> for DefaultW3Error {
    fn from(error: InputError) -> Self {
        Self::invalid_dimensions(&error.to_string())
    }
}

impl W3Error for DefaultW3Error {
    fn code(&self) -> W3ErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by the third-moment functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum W3ErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Column or level counts overflow the addressable buffer size.
    InvalidDimensions = 2,
}

impl From<DefaultW3Error> for W3ErrorCode {
    fn from(error: DefaultW3Error) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The `CString` is owned here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, W3ErrorCode)> =
        const { RefCell::new((None, W3ErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, W3ErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, W3ErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// W3ErrorCode err = shoc_w3_compute_diag_third_moment(ncol, nlev, false, ...);
/// if (err != W3ErrorCode::Ok) {
///     const char* error = shoc_w3_get_last_error();
///     if (error) {
///         printf("w3 failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn shoc_w3_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code for this thread.
///
/// Returns `W3ErrorCode::Ok` (0) if the last call succeeded.
#[no_mangle]
pub extern "C" fn shoc_w3_get_last_error_code() -> W3ErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
