//! Physical and closure constants shared by the preprocessor and kernel.
//!
//! # References
//!
//! - Bogenschutz, P.A. & Krueger, S.K. (2013). "A simplified PDF parameterization
//!   of subgrid-scale clouds and turbulence for cloud-resolving models." JAMES, 5.
//! - Canuto, V.M. et al. (2001). "Ocean turbulence. Part I: One-point closure model."
//!   J. Phys. Oceanogr., 31.

/// Floating-point type used by every field.
///
/// Reference traces are recorded in double precision, so the kernel is too.
pub type Real = f64;

/// Gravitational acceleration (m/s²).
pub const GRAVITY: Real = 9.80616;

/// Isotropic estimate of turbulent kinetic energy from vertical variance: TKE = 1.5 × w'².
pub const TKE_FROM_W_SEC: Real = 1.5;

/// Closure constant of the diagnostic third-moment formula.
pub const C_DIAG_3RD_MOM: Real = 7.0;

/// Closure coefficient a0 = (0.52 / c²) / (c − 2).
pub const A0: Real = (0.52 / (C_DIAG_3RD_MOM * C_DIAG_3RD_MOM)) / (C_DIAG_3RD_MOM - 2.0);

/// Closure coefficient a1 = 0.87 / c².
pub const A1: Real = 0.87 / (C_DIAG_3RD_MOM * C_DIAG_3RD_MOM);

/// Closure coefficient a2 = 0.5 / c.
pub const A2: Real = 0.5 / C_DIAG_3RD_MOM;

/// Closure coefficient a3 = 0.6 / (c (c − 2)).
pub const A3: Real = 0.6 / (C_DIAG_3RD_MOM * (C_DIAG_3RD_MOM - 2.0));

/// Closure coefficient a4 = 2.4 / (3c + 5).
pub const A4: Real = 2.4 / (3.0 * C_DIAG_3RD_MOM + 5.0);

/// Closure coefficient a5 = 0.6 / (c (3 + 5c)).
pub const A5: Real = 0.6 / (C_DIAG_3RD_MOM * (3.0 + 5.0 * C_DIAG_3RD_MOM));
