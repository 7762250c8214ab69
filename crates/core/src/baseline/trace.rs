//! Binary reference-trace codec.
//!
//! # File Format
//!
//! Records are concatenated, one per case. All integers and floats are
//! little-endian.
//!
//! ```text
//! [magic: 4 bytes] "W3TR"
//! [version: u32]
//! [num_columns: u32]
//! [num_levels: u32]
//! [num_interfaces: u32]
//! [shoc_1p5tke: u8]
//! 11 × { [len: u64] [len × f64] }
//!     w_sec, dz_zt, tke, dz_zi, thl_sec, wthl_sec,
//!     w_sec_zi, isotropy_zi, brunt_zi, thetal_zi, w3
//! ```

use crate::atmosphere::ThirdMomentData;
use crate::core_types::{ClosureMode, Real};
use crate::error::InputError;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Record magic.
pub const TRACE_MAGIC: [u8; 4] = *b"W3TR";

/// Current format version.
pub const TRACE_VERSION: u32 = 1;

/// Largest interface field a record may declare, in values.
pub const MAX_FIELD_VALUES: usize = 1 << 24;

/// Errors from reading, writing or comparing reference traces.
#[derive(Error, Debug)]
pub enum BaselineError {
    /// Underlying I/O failure.
    #[error("trace I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The trace ended in the middle of a record.
    #[error("trace truncated while reading {0}")]
    Truncated(&'static str),

    /// Record does not start with the expected magic.
    #[error("bad record magic {0:?}")]
    BadMagic([u8; 4]),

    /// Record written by an unknown format version.
    #[error("unsupported trace version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Recorded shape differs from the case being compared.
    #[error(
        "case {case}: recorded shape {recorded:?} differs from computed shape {computed:?} \
         (columns, levels, interfaces)"
    )]
    ShapeMismatch {
        case: usize,
        recorded: (usize, usize, usize),
        computed: (usize, usize, usize),
    },

    /// Recorded inputs differ from the regenerated ones.
    #[error("case {case}: recorded input `{field}` differs at index {index}")]
    InputDrift {
        case: usize,
        field: &'static str,
        index: usize,
    },

    /// Freshly computed `w3` is not bit-identical to the baseline.
    #[error("case {case}: w3[{index}] = {actual:e}, baseline {expected:e}")]
    Mismatch {
        case: usize,
        index: usize,
        expected: Real,
        actual: Real,
    },

    /// A recorded length or shape cannot be represented.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// A case could not be built or computed.
    #[error(transparent)]
    Input(#[from] InputError),
}

fn read_exact_or<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    what: &'static str,
) -> Result<(), BaselineError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            BaselineError::Truncated(what)
        } else {
            BaselineError::Io(e)
        }
    })
}

fn read_u32<R: Read>(reader: &mut R, what: &'static str) -> Result<u32, BaselineError> {
    let mut buf = [0u8; 4];
    read_exact_or(reader, &mut buf, what)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R, what: &'static str) -> Result<u64, BaselineError> {
    let mut buf = [0u8; 8];
    read_exact_or(reader, &mut buf, what)?;
    Ok(u64::from_le_bytes(buf))
}

fn write_dim<W: Write>(writer: &mut W, value: usize) -> Result<(), BaselineError> {
    let value = u32::try_from(value)
        .map_err(|_| BaselineError::Malformed(format!("dimension {value} exceeds u32")))?;
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn check_field_size(num_columns: usize, num_interfaces: usize) -> Result<(), BaselineError> {
    match num_columns.checked_mul(num_interfaces) {
        Some(len) if len <= MAX_FIELD_VALUES => Ok(()),
        _ => Err(BaselineError::Malformed(format!(
            "{num_columns} columns x {num_interfaces} interfaces exceeds {MAX_FIELD_VALUES} values"
        ))),
    }
}

fn write_field<W: Write>(writer: &mut W, values: &[Real]) -> Result<(), BaselineError> {
    writer.write_all(&(values.len() as u64).to_le_bytes())?;
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

fn read_field<R: Read>(
    reader: &mut R,
    field: &'static str,
    out: &mut [Real],
) -> Result<(), BaselineError> {
    let len = read_u64(reader, field)?;
    if usize::try_from(len).ok() != Some(out.len()) {
        return Err(BaselineError::Malformed(format!(
            "field `{field}` holds {len} values, header implies {}",
            out.len()
        )));
    }
    let mut buf = [0u8; 8];
    for value in out.iter_mut() {
        read_exact_or(reader, &mut buf, field)?;
        *value = Real::from_le_bytes(buf);
    }
    Ok(())
}

/// Append one record to `writer`.
///
/// # Errors
///
/// Returns [`BaselineError::Io`] on write failure, or
/// [`BaselineError::Malformed`] if a dimension does not fit in `u32` or a
/// field exceeds [`MAX_FIELD_VALUES`].
pub fn write_record<W: Write>(
    writer: &mut W,
    data: &ThirdMomentData,
) -> Result<(), BaselineError> {
    check_field_size(data.num_columns(), data.num_interfaces())?;
    writer.write_all(&TRACE_MAGIC)?;
    writer.write_all(&TRACE_VERSION.to_le_bytes())?;
    write_dim(writer, data.num_columns())?;
    write_dim(writer, data.num_levels())?;
    write_dim(writer, data.num_interfaces())?;
    writer.write_all(&[u8::from(data.closure.is_1p5tke())])?;

    for (_, values) in data.input_fields() {
        write_field(writer, values)?;
    }
    write_field(writer, data.w3.as_slice())
}

/// Read the next record from `reader`.
///
/// Returns `Ok(None)` at a clean end of stream (no bytes left before a record).
///
/// # Errors
///
/// Returns [`BaselineError`] for truncated, malformed or foreign records.
pub fn read_record<R: Read>(reader: &mut R) -> Result<Option<ThirdMomentData>, BaselineError> {
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        match reader.read(&mut magic[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(BaselineError::Truncated("magic")),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    if magic != TRACE_MAGIC {
        return Err(BaselineError::BadMagic(magic));
    }

    let version = read_u32(reader, "version")?;
    if version != TRACE_VERSION {
        return Err(BaselineError::UnsupportedVersion {
            found: version,
            expected: TRACE_VERSION,
        });
    }

    let num_columns = read_u32(reader, "num_columns")? as usize;
    let num_levels = read_u32(reader, "num_levels")? as usize;
    let num_interfaces = read_u32(reader, "num_interfaces")? as usize;
    if num_levels.checked_add(1) != Some(num_interfaces) {
        return Err(BaselineError::Malformed(format!(
            "num_interfaces {num_interfaces} != num_levels {num_levels} + 1"
        )));
    }
    check_field_size(num_columns, num_interfaces)?;
    let mut flag = [0u8; 1];
    read_exact_or(reader, &mut flag, "shoc_1p5tke")?;

    let mut data = ThirdMomentData::new(
        num_columns,
        num_levels,
        ClosureMode::from_1p5tke_flag(flag[0] != 0),
    );
    for (name, values) in data.input_fields_mut() {
        read_field(reader, name, values)?;
    }
    read_field(reader, "w3", data.w3.as_mut_slice())?;

    Ok(Some(data))
}
