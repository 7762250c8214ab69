//! Closure-mode selection for the third-moment diagnostic.

use serde::{Deserialize, Serialize};

/// Which turbulence closure the kernel evaluates.
///
/// Selected once per kernel call, never per level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosureMode {
    /// Full diagnostic third-moment closure.
    #[default]
    General,

    /// 1.5-order TKE closure. Carries no skewness term, so `w3` is identically zero.
    ReducedTke,
}

impl ClosureMode {
    /// Map the external `shoc_1p5tke` flag onto a closure mode.
    #[must_use]
    pub fn from_1p5tke_flag(shoc_1p5tke: bool) -> Self {
        if shoc_1p5tke {
            Self::ReducedTke
        } else {
            Self::General
        }
    }

    /// The `shoc_1p5tke` flag this mode corresponds to.
    #[must_use]
    pub fn is_1p5tke(self) -> bool {
        matches!(self, Self::ReducedTke)
    }
}

impl std::fmt::Display for ClosureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClosureMode::General => write!(f, "general"),
            ClosureMode::ReducedTke => write!(f, "reduced-tke"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_round_trip() {
        assert_eq!(ClosureMode::from_1p5tke_flag(false), ClosureMode::General);
        assert_eq!(ClosureMode::from_1p5tke_flag(true), ClosureMode::ReducedTke);
        assert!(ClosureMode::ReducedTke.is_1p5tke());
        assert!(!ClosureMode::General.is_1p5tke());
    }

    #[test]
    fn parses_kebab_case() {
        let mode: ClosureMode = serde_yaml::from_str("reduced-tke").unwrap();
        assert_eq!(mode, ClosureMode::ReducedTke);
        assert_eq!(ClosureMode::default(), ClosureMode::General);
    }
}
