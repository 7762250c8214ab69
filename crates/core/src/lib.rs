//! SHOC Third-Moment Core Library
//!
//! Diagnoses the third moment of vertical velocity (`w3`) on the staggered
//! vertical grids of the Simplified Higher-Order Closure (SHOC), the
//! boundary-layer turbulence scheme used by atmospheric models.
//!
//! ## Layout
//!
//! - Typed column fields for the midpoint and interface grids
//! - A grid preprocessor deriving midpoint heights, spacings, variance and TKE
//! - The closure formula and the column-parallel kernel
//! - A convective boundary-layer scenario for property checks
//! - A reproducibility harness with seeded inputs and bit-exact reference traces

// Core types and constants
pub mod core_types;

// Grids and kernel
pub mod atmosphere;
pub mod grid;

// Scenarios and reproducibility harness
pub mod baseline;
pub mod config;
pub mod scenario;

pub mod error;

// Re-export core types
pub use core_types::{ClosureMode, Real};

pub use atmosphere::{compute_column, compute_diag_third_moment, ThirdMomentData, ThirdMomentInputs};
pub use grid::{preprocess, preprocess_column, InterfaceField, MidpointField};

pub use baseline::{run_reproducibility_suite, BaselineAction, BaselineError, RandomRanges};
pub use config::HarnessConfig;
pub use error::{ConfigError, InputError};
pub use scenario::ConvectiveProfile;
