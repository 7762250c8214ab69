//! Reproducibility harness: seeded inputs, reference traces and the
//! strategies that generate or check them.
//!
//! The kernel never depends on anything here.

pub mod random;
pub mod strategy;
pub mod trace;

pub use random::{RandomRanges, SampleRange};
pub use strategy::{
    compute_cases, open_strategy, run_reproducibility_suite, BaselineAction, BaselineReport,
    BaselineStrategy, CompareBaseline, GenerateBaseline, NoBaseline,
};
pub use trace::{
    read_record, write_record, BaselineError, MAX_FIELD_VALUES, TRACE_MAGIC, TRACE_VERSION,
};
