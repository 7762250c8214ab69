//! Staggered vertical grids and grid preprocessing

pub mod column_field;
pub mod preprocess;

// Re-export main types
pub use column_field::{
    ColumnField, ColumnSlice, Interface, InterfaceField, Midpoint, MidpointField, VerticalGrid,
};
pub use preprocess::{preprocess, preprocess_column, GridPreprocessOutput, PreprocessedColumn};
