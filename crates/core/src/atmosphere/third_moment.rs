//! Diagnostic third moment of vertical velocity at a single interface.
//!
//! Implements the algebraic third-moment closure used by SHOC (Bogenschutz &
//! Krueger 2013), itself a simplification of the Canuto et al. (2001) model.
//! The closure relates `w'³` to local gradients of the second moments:
//!
//! ```text
//! w3 = (aa1 - 1.2 x1 - 1.5 f5) / (c - 1.2 x0 + aa0)
//! ```
//!
//! where the `f`, `omega`, `x`/`y` and `aa` groups are built below from the
//! variances, heat flux, buoyancy frequency and return-to-isotropy timescale
//! on a three-point vertical stencil around the interface.
//!
//! All powers are spelled out as products so the floating-point evaluation
//! order is fixed; reference traces are compared bit for bit.
//!
//! # References
//!
//! - Bogenschutz, P.A. & Krueger, S.K. (2013). JAMES, 5, 195-211.
//! - Canuto, V.M. et al. (2001). J. Phys. Oceanogr., 31, 1413-1426.

use crate::core_types::{Real, A0, A1, A2, A3, A4, A5, C_DIAG_3RD_MOM, GRAVITY};

#[inline(always)]
fn square(x: Real) -> Real {
    x * x
}

#[inline(always)]
fn cube(x: Real) -> Real {
    x * x * x
}

/// Grid and stability factors shared by the `f` terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FTermInputs {
    /// 1 / `dz_zi` at the interface.
    pub thedz: Real,
    /// 1 / (thickness of the two adjacent cells).
    pub thedz2: Real,
    /// Return-to-isotropy timescale (s).
    pub iso: Real,
    /// `iso²`.
    pub isosqrd: Real,
    /// Subgrid buoyancy term `iso² N²`.
    pub buoy_sgs2: Real,
    /// Buoyancy parameter `g / θ_l`.
    pub bet2: Real,
}

impl FTermInputs {
    /// Build the shared factors for one interface.
    ///
    /// # Arguments
    ///
    /// * `dz_zi` - Center-to-center spacing at the interface (m)
    /// * `dz_zt` - Thickness of the cell below the interface (m)
    /// * `dz_zt_above` - Thickness of the cell above the interface (m)
    /// * `isotropy` - Return-to-isotropy timescale (s)
    /// * `brunt` - Brunt-Väisälä frequency squared (s⁻²)
    /// * `thetal` - Liquid water potential temperature (K)
    #[inline]
    #[must_use]
    pub fn new(
        dz_zi: Real,
        dz_zt: Real,
        dz_zt_above: Real,
        isotropy: Real,
        brunt: Real,
        thetal: Real,
    ) -> Self {
        let iso = isotropy;
        let isosqrd = square(iso);
        Self {
            thedz: 1.0 / dz_zi,
            thedz2: 1.0 / (dz_zt + dz_zt_above),
            iso,
            isosqrd,
            buoy_sgs2: isosqrd * brunt,
            bet2: GRAVITY / thetal,
        }
    }
}

/// Second-moment values on the vertical stencil around interface `k`.
///
/// "above" is one index lower (toward the model top), "below" one index higher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stencil {
    /// `wthl_sec` at interfaces k, k-1, k+1.
    pub wthl: Real,
    pub wthl_above: Real,
    pub wthl_below: Real,
    /// `thl_sec` at interfaces k-1, k+1.
    pub thl_above: Real,
    pub thl_below: Real,
    /// `w_sec` at the cell centers k (below) and k-1 (above).
    pub w_sec: Real,
    pub w_sec_above: Real,
    /// `w_sec_zi` at interface k.
    pub w_sec_zi: Real,
    /// `tke` at the cell centers k and k-1.
    pub tke: Real,
    pub tke_above: Real,
}

/// Gradient-forcing terms f0..f5.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FTerms {
    pub f0: Real,
    pub f1: Real,
    pub f2: Real,
    pub f3: Real,
    pub f4: Real,
    pub f5: Real,
}

impl FTerms {
    /// Evaluate f0..f5 from the shared factors and the local stencil.
    #[inline]
    #[must_use]
    pub fn new(inp: &FTermInputs, s: &Stencil) -> Self {
        let d_thl = s.thl_above - s.thl_below;
        let d_wthl = s.wthl_above - s.wthl_below;
        let d_w_sec = s.w_sec_above - s.w_sec;
        let d_tke = s.tke_above - s.tke;

        let f0 = inp.thedz2
            * cube(inp.bet2)
            * square(inp.isosqrd)
            * s.wthl
            * d_thl;

        let f1 = inp.thedz2
            * square(inp.bet2)
            * cube(inp.iso)
            * (s.wthl * d_wthl + 0.5 * s.w_sec_zi * d_thl);

        let f2 = inp.thedz * inp.bet2 * inp.isosqrd * s.wthl * d_w_sec
            + 2.0 * inp.thedz2 * inp.bet2 * inp.isosqrd * s.w_sec_zi * d_wthl;

        let f3 = inp.thedz2 * inp.bet2 * inp.isosqrd * s.w_sec_zi * d_wthl
            + inp.thedz * inp.bet2 * inp.isosqrd * (s.wthl * d_tke);

        let f4 = inp.thedz * inp.iso * s.w_sec_zi * (d_w_sec + d_tke);

        let f5 = inp.thedz * inp.iso * s.w_sec_zi * d_w_sec;

        Self {
            f0,
            f1,
            f2,
            f3,
            f4,
            f5,
        }
    }
}

/// Pressure-correlation weights omega0..omega2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OmegaTerms {
    pub omega0: Real,
    pub omega1: Real,
    pub omega2: Real,
}

impl OmegaTerms {
    #[inline]
    #[must_use]
    pub fn new(buoy_sgs2: Real, f3: Real, f4: Real) -> Self {
        let omega0 = A4 / (1.0 - A5 * buoy_sgs2);
        let omega1 = omega0 / (2.0 * C_DIAG_3RD_MOM);
        let omega2 = omega1 * f3 + (5.0 / 4.0) * omega0 * f4;
        Self {
            omega0,
            omega1,
            omega2,
        }
    }
}

/// Intermediate closure groups x0, y0, x1, y1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XyTerms {
    pub x0: Real,
    pub y0: Real,
    pub x1: Real,
    pub y1: Real,
}

impl XyTerms {
    #[inline]
    #[must_use]
    pub fn new(buoy_sgs2: Real, f: &FTerms) -> Self {
        let stab = 1.0 - A3 * buoy_sgs2;
        let denom = 1.0 - (A1 + A3) * buoy_sgs2;

        let x0 = (A2 * buoy_sgs2 * stab) / denom;
        let y0 = (2.0 * A2 * buoy_sgs2 * x0) / stab;
        let x1 = (A0 * f.f0 + A1 * f.f1 + A2 * stab * f.f2) / denom;
        let y1 = (2.0 * A2 * (buoy_sgs2 * x1 + (A0 / A1) * f.f0 + f.f1)) / stab;

        Self { x0, y0, x1, y1 }
    }
}

/// Combined coefficients aa0 and aa1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AaTerms {
    pub aa0: Real,
    pub aa1: Real,
}

impl AaTerms {
    #[inline]
    #[must_use]
    pub fn new(omega: &OmegaTerms, xy: &XyTerms) -> Self {
        Self {
            aa0: omega.omega0 * xy.x0 + omega.omega1 * xy.y0,
            aa1: omega.omega0 * xy.x1 + omega.omega1 * xy.y1 + omega.omega2,
        }
    }
}

/// Final closure: third moment from the combined groups.
#[inline]
#[must_use]
pub fn w3_from_terms(aa: &AaTerms, x0: Real, x1: Real, f5: Real) -> Real {
    (aa.aa1 - 1.2 * x1 - 1.5 * f5) / (C_DIAG_3RD_MOM - 1.2 * x0 + aa.aa0)
}

/// Third moment of vertical velocity at one interior interface.
#[inline]
#[must_use]
pub fn interface_w3(inp: &FTermInputs, stencil: &Stencil) -> Real {
    let f = FTerms::new(inp, stencil);
    let omega = OmegaTerms::new(inp.buoy_sgs2, f.f3, f.f4);
    let xy = XyTerms::new(inp.buoy_sgs2, &f);
    let aa = AaTerms::new(&omega, &xy);
    w3_from_terms(&aa, xy.x0, xy.x1, f.f5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn neutral_stencil() -> Stencil {
        Stencil {
            wthl: 0.0,
            wthl_above: 0.0,
            wthl_below: 0.0,
            thl_above: 1.0,
            thl_below: 1.0,
            w_sec: 0.3,
            w_sec_above: 0.3,
            w_sec_zi: 0.3,
            tke: 0.45,
            tke_above: 0.45,
        }
    }

    #[test]
    fn shared_factors() {
        let inp = FTermInputs::new(500.0, 400.0, 600.0, 2000.0, 2e-5, 310.0);
        assert_eq!(inp.thedz, 1.0 / 500.0);
        assert_eq!(inp.thedz2, 1.0 / 1000.0);
        assert_eq!(inp.isosqrd, 4.0e6);
        assert_relative_eq!(inp.buoy_sgs2, 80.0, max_relative = 1e-12);
        assert_relative_eq!(inp.bet2, GRAVITY / 310.0);
    }

    #[test]
    fn no_gradients_no_skewness() {
        // Without gradients every f term vanishes, and with neutral
        // stratification x0 and aa0 vanish too, so w3 = 0 / c.
        let inp = FTermInputs::new(500.0, 400.0, 600.0, 2000.0, 0.0, 300.0);
        let f = FTerms::new(&inp, &neutral_stencil());
        assert_eq!(
            f,
            FTerms {
                f0: 0.0,
                f1: 0.0,
                f2: 0.0,
                f3: 0.0,
                f4: 0.0,
                f5: 0.0
            }
        );
        assert_eq!(interface_w3(&inp, &neutral_stencil()), 0.0);
    }

    #[test]
    fn neutral_omega_terms() {
        let omega = OmegaTerms::new(0.0, 0.0, 0.0);
        assert_eq!(omega.omega0, A4);
        assert_eq!(omega.omega1, A4 / 14.0);
        assert_eq!(omega.omega2, 0.0);
    }

    #[test]
    fn decreasing_variance_with_height_is_positively_skewed() {
        // w_sec smaller above than below: f5 < 0 drives w3 positive.
        let inp = FTermInputs::new(500.0, 400.0, 600.0, 1000.0, 0.0, 300.0);
        let stencil = Stencil {
            w_sec_above: 0.2,
            w_sec: 0.4,
            tke_above: 0.3,
            tke: 0.6,
            ..neutral_stencil()
        };
        let w3 = interface_w3(&inp, &stencil);
        assert!(w3.is_finite());
        assert!(w3 > 0.0, "expected positive skewness, got {w3}");
    }

    #[test]
    fn f4_sums_the_two_differences() {
        // Unit factors leave f4 equal to the sum itself.
        let inp = FTermInputs::new(1.0, 400.0, 600.0, 1.0, 0.0, 300.0);
        let stencil = Stencil {
            w_sec_above: 0.45,
            w_sec: 0.35,
            w_sec_zi: 1.0,
            tke_above: 0.675,
            tke: 0.525,
            ..neutral_stencil()
        };
        let f = FTerms::new(&inp, &stencil);
        assert_eq!(f.f4.to_bits(), 0.25000000000000006_f64.to_bits());
        assert_ne!(f.f4.to_bits(), 0.2500000000000001_f64.to_bits());
    }

    #[test]
    fn zero_interface_spacing_propagates_non_finite() {
        let inp = FTermInputs::new(0.0, 400.0, 600.0, 1000.0, 1e-5, 300.0);
        let stencil = Stencil {
            w_sec_above: 0.2,
            ..neutral_stencil()
        };
        assert!(!interface_w3(&inp, &stencil).is_finite());
    }
}
