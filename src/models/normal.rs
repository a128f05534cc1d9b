//! Standard normal CDF/PDF evaluators.
//!
//! Every evaluator computes `N(x) = 0.5·erfc(-x/√2)`, which is the same quantity as
//! `0.5·(1 + erf(x/√2))` but keeps relative accuracy in the lower tail where the
//! `1 + erf` form cancels to zero. The upper tail is obtained by reflection, so
//! `N(x)` and `N(-x)` both stay accurate for deep in- and out-of-the-money terms.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::CdfMethod;
use crate::models::traits::NormalDistribution;

/// Density of the standard normal distribution.
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Normal CDF from `libm::erfc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErfcNormal;

impl NormalDistribution for ErfcNormal {
    fn cdf(&self, x: f64) -> f64 {
        0.5 * libm::erfc(-x * FRAC_1_SQRT_2)
    }

    fn name(&self) -> &'static str {
        "erfc"
    }
}

/// Normal CDF from the `statrs` standard normal.
#[derive(Debug, Clone)]
pub struct StatrsNormal {
    dist: Normal,
}

impl StatrsNormal {
    pub fn new() -> Self {
        Self {
            dist: Normal::new(0.0, 1.0).expect("unit normal parameters are valid"),
        }
    }
}

impl Default for StatrsNormal {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalDistribution for StatrsNormal {
    fn cdf(&self, x: f64) -> f64 {
        self.dist.cdf(x)
    }

    fn name(&self) -> &'static str {
        "statrs"
    }
}

/// Abramowitz & Stegun 7.1.26 rational approximation, absolute error < 1.5e-7.
///
/// The polynomial yields `erfc(z)` directly for `z >= 0`, so the tail is formed
/// without subtracting from one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbramowitzStegunNormal;

impl AbramowitzStegunNormal {
    /// Documented absolute error bound of the approximation.
    pub const MAX_ABS_ERROR: f64 = 1.5e-7;

    fn erfc_non_negative(z: f64) -> f64 {
        let a1 = 0.254829592;
        let a2 = -0.284496736;
        let a3 = 1.421413741;
        let a4 = -1.453152027;
        let a5 = 1.061405429;
        let p = 0.3275911;

        let t = 1.0 / (1.0 + p * z);
        ((((a5 * t + a4) * t + a3) * t + a2) * t + a1) * t * (-z * z).exp()
    }
}

impl NormalDistribution for AbramowitzStegunNormal {
    fn cdf(&self, x: f64) -> f64 {
        let tail = 0.5 * Self::erfc_non_negative(x.abs() * FRAC_1_SQRT_2);
        if x < 0.0 {
            tail
        } else {
            1.0 - tail
        }
    }

    fn name(&self) -> &'static str {
        "abramowitz-stegun"
    }
}

/// Evaluator selected by [`CdfMethod`].
#[derive(Debug, Clone)]
pub enum StandardNormal {
    Erfc(ErfcNormal),
    Statrs(StatrsNormal),
    AbramowitzStegun(AbramowitzStegunNormal),
}

impl StandardNormal {
    pub fn new(method: CdfMethod) -> Self {
        match method {
            CdfMethod::Erfc => StandardNormal::Erfc(ErfcNormal),
            CdfMethod::Statrs => StandardNormal::Statrs(StatrsNormal::new()),
            CdfMethod::AbramowitzStegun => {
                StandardNormal::AbramowitzStegun(AbramowitzStegunNormal)
            }
        }
    }
}

impl Default for StandardNormal {
    fn default() -> Self {
        Self::new(CdfMethod::default())
    }
}

impl NormalDistribution for StandardNormal {
    fn cdf(&self, x: f64) -> f64 {
        match self {
            StandardNormal::Erfc(d) => d.cdf(x),
            StandardNormal::Statrs(d) => d.cdf(x),
            StandardNormal::AbramowitzStegun(d) => d.cdf(x),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            StandardNormal::Erfc(d) => d.name(),
            StandardNormal::Statrs(d) => d.name(),
            StandardNormal::AbramowitzStegun(d) => d.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // N(x) at selected points, 16 significant digits
    const REFERENCE: [(f64, f64); 7] = [
        (-3.0, 0.0013498980316300957),
        (-1.0, 0.15865525393145707),
        (-0.5, 0.3085375387259869),
        (0.0, 0.5),
        (0.5, 0.6914624612740131),
        (1.0, 0.8413447460685429),
        (2.0, 0.9772498680518208),
    ];

    #[test]
    fn test_pdf_values() {
        assert_relative_eq!(normal_pdf(0.0), 0.3989422804014327, epsilon = 1e-15);
        assert_relative_eq!(normal_pdf(1.0), 0.24197072451914337, epsilon = 1e-15);
        assert_eq!(normal_pdf(1.5), normal_pdf(-1.5));
        assert_eq!(normal_pdf(50.0), 0.0);
    }

    #[test]
    fn test_erfc_matches_reference() {
        for (x, expected) in REFERENCE {
            assert_relative_eq!(ErfcNormal.cdf(x), expected, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_statrs_matches_reference() {
        let dist = StatrsNormal::new();
        for (x, expected) in REFERENCE {
            assert_relative_eq!(dist.cdf(x), expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_abramowitz_stegun_error_bound() {
        let dist = AbramowitzStegunNormal;
        for (x, expected) in REFERENCE {
            assert!(
                (dist.cdf(x) - expected).abs() < AbramowitzStegunNormal::MAX_ABS_ERROR,
                "A&S cdf({}) = {} vs {}",
                x,
                dist.cdf(x),
                expected
            );
        }
    }

    #[test]
    fn test_symmetry() {
        for method in [CdfMethod::Erfc, CdfMethod::Statrs, CdfMethod::AbramowitzStegun] {
            let dist = StandardNormal::new(method);
            for x in [0.1, 0.7, 1.9, 4.2] {
                assert_relative_eq!(dist.cdf(x) + dist.cdf(-x), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_lower_tail_keeps_significant_digits() {
        // N(-10) = 7.619853024160593e-24; the 1 + erf form returns exactly 0 here
        let n = ErfcNormal.cdf(-10.0);
        assert_relative_eq!(n, 7.619853024160593e-24, max_relative = 1e-12);

        let n = StatrsNormal::new().cdf(-10.0);
        assert_relative_eq!(n, 7.619853024160593e-24, max_relative = 1e-10);

        // Rational approximation: relative error stays small in the far tail
        let n = AbramowitzStegunNormal.cdf(-10.0);
        assert!(n > 0.0);
        assert_relative_eq!(n, 7.619853024160593e-24, max_relative = 5e-2);
    }

    #[test]
    fn test_bounds() {
        let dist = StandardNormal::default();
        assert_eq!(dist.name(), "erfc");
        for x in [-40.0, -8.5, 0.0, 8.5, 40.0] {
            let c = dist.cdf(x);
            assert!((0.0..=1.0).contains(&c), "cdf({}) = {}", x, c);
        }
        assert!(dist.cdf(-9.0) > 0.0);
    }
}
