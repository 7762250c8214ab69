//! Column-major field storage on the two staggered vertical grids.
//!
//! Every field is a flat `Vec<Real>` indexed by `(level, column)` as
//! `level + column * points_per_column`. The grid a field lives on is part of
//! its type, so a midpoint buffer cannot be handed to a slot expecting an
//! interface buffer.

use crate::core_types::Real;
use crate::error::InputError;
use rayon::prelude::*;
use std::marker::PhantomData;
use std::ops::Index;

/// A vertical grid: how many points a column holds for a given level count.
pub trait VerticalGrid: Copy + Send + Sync + 'static {
    /// Short grid name used in diagnostics.
    const NAME: &'static str;

    /// Points per column for `num_levels` cell centers.
    fn points(num_levels: usize) -> usize;
}

/// Cell-center ("zt") grid: one point per level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Midpoint;

/// Cell-interface ("zi") grid: one point per level plus the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interface;

impl VerticalGrid for Midpoint {
    const NAME: &'static str = "zt";

    #[inline]
    fn points(num_levels: usize) -> usize {
        num_levels
    }
}

impl VerticalGrid for Interface {
    const NAME: &'static str = "zi";

    #[inline]
    fn points(num_levels: usize) -> usize {
        num_levels + 1
    }
}

/// Dense column-major field on grid `G`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnField<G: VerticalGrid> {
    data: Vec<Real>,
    num_columns: usize,
    num_levels: usize,
    _grid: PhantomData<G>,
}

/// Field on the cell-center grid.
pub type MidpointField = ColumnField<Midpoint>;

/// Field on the cell-interface grid.
pub type InterfaceField = ColumnField<Interface>;

impl<G: VerticalGrid> ColumnField<G> {
    /// Create a field initialized to zero
    ///
    /// # Arguments
    ///
    /// * `num_columns` - Number of independent columns
    /// * `num_levels` - Number of cell centers per column
    #[must_use]
    pub fn new(num_columns: usize, num_levels: usize) -> Self {
        Self::with_value(num_columns, num_levels, 0.0)
    }

    /// Create a field initialized to `value` everywhere
    #[must_use]
    pub fn with_value(num_columns: usize, num_levels: usize, value: Real) -> Self {
        Self {
            data: vec![value; num_columns * G::points(num_levels)],
            num_columns,
            num_levels,
            _grid: PhantomData,
        }
    }

    /// Wrap an existing column-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DimensionMismatch`] if `data` does not hold exactly
    /// `num_columns * G::points(num_levels)` values.
    pub fn from_vec(
        field: &'static str,
        num_columns: usize,
        num_levels: usize,
        data: Vec<Real>,
    ) -> Result<Self, InputError> {
        let expected = num_columns * G::points(num_levels);
        if data.len() != expected {
            return Err(InputError::dimension_mismatch(field, expected, data.len()));
        }
        Ok(Self {
            data,
            num_columns,
            num_levels,
            _grid: PhantomData,
        })
    }

    /// Replicate a single column profile into every column.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DimensionMismatch`] if `profile` does not hold
    /// `G::points(num_levels)` values.
    pub fn from_profile(
        field: &'static str,
        num_columns: usize,
        num_levels: usize,
        profile: &[Real],
    ) -> Result<Self, InputError> {
        let points = G::points(num_levels);
        if profile.len() != points {
            return Err(InputError::dimension_mismatch(field, points, profile.len()));
        }
        let mut data = Vec::with_capacity(num_columns * points);
        for _ in 0..num_columns {
            data.extend_from_slice(profile);
        }
        Ok(Self {
            data,
            num_columns,
            num_levels,
            _grid: PhantomData,
        })
    }

    /// Number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Number of cell centers per column (independent of the grid).
    #[inline]
    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    /// Points per column on this field's grid.
    #[inline]
    pub fn points_per_column(&self) -> usize {
        G::points(self.num_levels)
    }

    /// Flat offset of `(level, column)`.
    #[inline]
    pub fn offset(&self, level: usize, column: usize) -> usize {
        level + column * self.points_per_column()
    }

    /// Value at `(level, column)`
    ///
    /// # Panics
    ///
    /// Panics if the level or column is out of bounds
    #[must_use]
    pub fn get(&self, level: usize, column: usize) -> Real {
        assert!(
            level < self.points_per_column() && column < self.num_columns,
            "({level}, {column}) out of bounds on {} grid",
            G::NAME
        );
        self.data[self.offset(level, column)]
    }

    /// Set the value at `(level, column)`
    ///
    /// # Panics
    ///
    /// Panics if the level or column is out of bounds
    pub fn set(&mut self, level: usize, column: usize, value: Real) {
        assert!(
            level < self.points_per_column() && column < self.num_columns,
            "({level}, {column}) out of bounds on {} grid",
            G::NAME
        );
        let idx = self.offset(level, column);
        self.data[idx] = value;
    }

    /// Fill entire field with a value
    pub fn fill(&mut self, value: Real) {
        self.data.fill(value);
    }

    /// Flat column-major view
    #[must_use]
    pub fn as_slice(&self) -> &[Real] {
        &self.data
    }

    /// Mutable flat column-major view
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        &mut self.data
    }

    /// Total number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the field stores no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Typed read-only view of one column.
    ///
    /// # Panics
    ///
    /// Panics if `column >= num_columns`.
    #[must_use]
    pub fn column(&self, column: usize) -> ColumnSlice<'_, G> {
        let points = self.points_per_column();
        let start = column * points;
        ColumnSlice::new(&self.data[start..start + points])
    }

    /// Mutable view of one column.
    ///
    /// # Panics
    ///
    /// Panics if `column >= num_columns`.
    pub fn column_mut(&mut self, column: usize) -> &mut [Real] {
        let points = self.points_per_column();
        let start = column * points;
        &mut self.data[start..start + points]
    }

    /// Iterate over typed column views in column order.
    pub fn columns(&self) -> impl Iterator<Item = ColumnSlice<'_, G>> + '_ {
        (0..self.num_columns).map(move |c| self.column(c))
    }

    /// Parallel iterator over mutable columns, paired with their column index.
    pub fn par_columns_mut<'a>(
        &'a mut self,
    ) -> impl IndexedParallelIterator<Item = (usize, &'a mut [Real])> + 'a {
        let points = self.points_per_column().max(1);
        self.data.par_chunks_mut(points).enumerate()
    }
}

/// Read-only view of one column on grid `G`.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSlice<'a, G: VerticalGrid> {
    values: &'a [Real],
    _grid: PhantomData<G>,
}

impl<'a, G: VerticalGrid> ColumnSlice<'a, G> {
    /// Wrap a column's values.
    #[inline]
    pub fn new(values: &'a [Real]) -> Self {
        Self {
            values,
            _grid: PhantomData,
        }
    }

    /// Number of points in the column.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Underlying values.
    #[inline]
    pub fn as_slice(&self) -> &'a [Real] {
        self.values
    }
}

impl<G: VerticalGrid> Index<usize> for ColumnSlice<'_, G> {
    type Output = Real;

    #[inline]
    fn index(&self, level: usize) -> &Real {
        &self.values[level]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_field_has_one_extra_point() {
        let zt = MidpointField::new(3, 5);
        let zi = InterfaceField::new(3, 5);
        assert_eq!(zt.points_per_column(), 5);
        assert_eq!(zi.points_per_column(), 6);
        assert_eq!(zt.len(), 15);
        assert_eq!(zi.len(), 18);
    }

    #[test]
    fn column_major_offsets() {
        let mut field = InterfaceField::new(2, 4);
        field.set(2, 1, 7.5);
        // level + column * (num_levels + 1)
        assert_eq!(field.as_slice()[2 + 5], 7.5);
        assert_eq!(field.get(2, 1), 7.5);
        assert_eq!(field.column(1)[2], 7.5);
        assert_eq!(field.column(0)[2], 0.0);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = MidpointField::from_vec("w_sec", 2, 3, vec![0.0; 7]).unwrap_err();
        assert_eq!(err, InputError::dimension_mismatch("w_sec", 6, 7));
    }

    #[test]
    fn from_profile_replicates() {
        let field = InterfaceField::from_profile("zi", 3, 2, &[3.0, 2.0, 1.0]).unwrap();
        for column in field.columns() {
            assert_eq!(column.as_slice(), &[3.0, 2.0, 1.0]);
        }
        assert!(InterfaceField::from_profile("zi", 3, 2, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn par_columns_mut_visits_every_column_once() {
        let mut field = MidpointField::new(8, 4);
        field.par_columns_mut().for_each(|(c, col)| {
            for v in col.iter_mut() {
                *v = c as Real;
            }
        });
        for c in 0..8 {
            assert!(field.column(c).as_slice().iter().all(|&v| v == c as Real));
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_bounds_panics() {
        let field = MidpointField::new(1, 3);
        let _ = field.get(3, 0);
    }
}
