//! Seeded random inputs for reproducibility runs.
//!
//! Values only need to be reproducible and range-constrained, not physical;
//! the same seed and ranges always yield the same bundle.

use crate::atmosphere::ThirdMomentData;
use crate::core_types::Real;
use crate::error::InputError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-open sampling range `[low, high)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub low: Real,
    pub high: Real,
}

impl SampleRange {
    #[must_use]
    pub const fn new(low: Real, high: Real) -> Self {
        Self { low, high }
    }

    fn check(&self, field: &'static str) -> Result<(), InputError> {
        if self.low.is_finite() && self.high.is_finite() && self.low < self.high {
            Ok(())
        } else {
            Err(InputError::InvalidRange {
                field,
                low: self.low,
                high: self.high,
            })
        }
    }
}

impl Default for SampleRange {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// One sampling range per kernel input field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomRanges {
    pub w_sec: SampleRange,
    pub dz_zt: SampleRange,
    pub tke: SampleRange,
    pub dz_zi: SampleRange,
    pub thl_sec: SampleRange,
    pub wthl_sec: SampleRange,
    pub w_sec_zi: SampleRange,
    pub isotropy_zi: SampleRange,
    pub brunt_zi: SampleRange,
    pub thetal_zi: SampleRange,
}

impl RandomRanges {
    /// Ranges in the canonical field order of [`ThirdMomentData::input_fields`].
    pub fn in_field_order(&self) -> [SampleRange; 10] {
        [
            self.w_sec,
            self.dz_zt,
            self.tke,
            self.dz_zi,
            self.thl_sec,
            self.wthl_sec,
            self.w_sec_zi,
            self.isotropy_zi,
            self.brunt_zi,
            self.thetal_zi,
        ]
    }

    /// Reject empty or non-finite ranges.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidRange`] for the first bad range.
    pub fn validate(&self) -> Result<(), InputError> {
        const NAMES: [&str; 10] = [
            "w_sec",
            "dz_zt",
            "tke",
            "dz_zi",
            "thl_sec",
            "wthl_sec",
            "w_sec_zi",
            "isotropy_zi",
            "brunt_zi",
            "thetal_zi",
        ];
        for (name, range) in NAMES.into_iter().zip(self.in_field_order()) {
            range.check(name)?;
        }
        Ok(())
    }
}

impl ThirdMomentData {
    /// Fill every input field with uniform samples.
    ///
    /// Fields are visited in canonical order, each column-major, so a seeded
    /// generator reproduces the bundle exactly. `w3` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidRange`] before sampling anything if a
    /// range is unusable.
    pub fn randomize<R: Rng>(
        &mut self,
        rng: &mut R,
        ranges: &RandomRanges,
    ) -> Result<(), InputError> {
        ranges.validate()?;
        for ((_, values), range) in self
            .input_fields_mut()
            .into_iter()
            .zip(ranges.in_field_order())
        {
            for v in values.iter_mut() {
                *v = rng.random_range(range.low..range.high);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::ClosureMode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn same_seed_same_inputs() {
        let mut a = ThirdMomentData::new(3, 7, ClosureMode::General);
        let mut b = ThirdMomentData::new(3, 7, ClosureMode::General);
        a.randomize(&mut StdRng::seed_from_u64(7), &RandomRanges::default())
            .unwrap();
        b.randomize(&mut StdRng::seed_from_u64(7), &RandomRanges::default())
            .unwrap();
        assert_eq!(a, b);

        let mut c = ThirdMomentData::new(3, 7, ClosureMode::General);
        c.randomize(&mut StdRng::seed_from_u64(8), &RandomRanges::default())
            .unwrap();
        assert_ne!(a.thl_sec, c.thl_sec);
    }

    #[test]
    fn samples_respect_ranges() {
        let ranges = RandomRanges {
            thetal_zi: SampleRange::new(280.0, 320.0),
            brunt_zi: SampleRange::new(-1e-4, 1e-4),
            ..RandomRanges::default()
        };
        let mut data = ThirdMomentData::new(4, 12, ClosureMode::General);
        data.randomize(&mut StdRng::seed_from_u64(1), &ranges).unwrap();

        assert!(data
            .thetal_zi
            .as_slice()
            .iter()
            .all(|v| (280.0..320.0).contains(v)));
        assert!(data
            .brunt_zi
            .as_slice()
            .iter()
            .all(|v| (-1e-4..1e-4).contains(v)));
        assert!(data.w_sec.as_slice().iter().all(|v| (0.0..1.0).contains(v)));
        assert!(data.w3.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_range_is_rejected_before_sampling() {
        let ranges = RandomRanges {
            dz_zi: SampleRange::new(1.0, 1.0),
            ..RandomRanges::default()
        };
        let mut data = ThirdMomentData::new(1, 3, ClosureMode::General);
        let err = data
            .randomize(&mut StdRng::seed_from_u64(1), &ranges)
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidRange { field: "dz_zi", .. }));
        assert!(data.w_sec.as_slice().iter().all(|&v| v == 0.0));
    }
}
