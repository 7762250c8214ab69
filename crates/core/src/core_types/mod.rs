//! Core types and constants

pub mod closure;
pub mod constants;

pub use closure::ClosureMode;
pub use constants::*;
