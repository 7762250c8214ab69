//! Third-order moment of vertical velocity for boundary-layer turbulence.
//!
//! This module diagnoses `w'³`, the vertical-velocity skewness used by SHOC
//! (Simplified Higher-Order Closure) to decide whether a column is convective:
//! - Closure formula at a single interface (`third_moment`)
//! - Column-parallel kernel over staggered grids (`kernel`)
//! - Owned input/output bundle and caller-side validation (`data`)
//!
//! # Scientific Background
//!
//! In a convective boundary layer, narrow strong updrafts and broad weak
//! downdrafts skew the vertical-velocity distribution positively. Higher-order
//! closures carry this through `w'³`, diagnosed here from second moments and
//! their vertical gradients. Under a 1.5-order TKE closure no skewness term
//! exists and `w3` is identically zero.
//!
//! # References
//!
//! - Bogenschutz, P.A. & Krueger, S.K. (2013). "A simplified PDF parameterization
//!   of subgrid-scale clouds and turbulence for cloud-resolving models." JAMES, 5.
//! - Canuto, V.M. et al. (2001). "Ocean turbulence. Part I: One-point closure model."
//!   J. Phys. Oceanogr., 31.

mod data;
mod kernel;
pub mod third_moment;

pub use data::ThirdMomentData;
pub use kernel::{compute_column, compute_diag_third_moment, ColumnInputs, ThirdMomentInputs};
