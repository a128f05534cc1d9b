use crate::config::CalendarConvention;
use crate::contract::OptionType;

/// What the first-order underlying Greeks are taken with respect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeltaConvention {
    /// Delta and gamma with respect to spot S0
    #[default]
    Spot,
    /// Delta and gamma with respect to the forward F0; produced when no carry
    /// yield was supplied with a forward contract
    Forward,
}

/// Which valuation produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExpiryBranch {
    #[default]
    ClosedForm,
    /// Discounted payoff below the time or volatility floor
    Intrinsic,
}

/// Annualized, unscaled Greeks as produced by the formulas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct RawGreeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
    pub phi: f64,
    pub vanna: f64,
    pub vomma: f64,
}

/// Price and sensitivities of one European option.
///
/// Scaled variants: vega per vol point (0.01), theta per day (divided by the
/// day-count denominator), rho and phi per basis point (1/10000).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreeksResult {
    pub option_type: OptionType,
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    /// dV/dσ for a change of 1.00 in volatility
    pub vega_per_vol: f64,
    pub vega_per_vol_point: f64,
    pub theta_per_year: f64,
    pub theta_per_day: f64,
    pub rho_per_1: f64,
    pub rho_per_basis_point: f64,
    /// Dividend rho, dV/dq
    pub phi_per_1: f64,
    pub phi_per_basis_point: f64,
    /// d²V/dS·dσ, present when higher-order Greeks were requested
    pub vanna: Option<f64>,
    /// d²V/dσ², present when higher-order Greeks were requested
    pub vomma: Option<f64>,
    pub delta_convention: DeltaConvention,
    pub expiry_branch: ExpiryBranch,
    /// T after flooring
    pub effective_time_to_expiry: f64,
    /// σ after flooring
    pub effective_volatility: f64,
    pub time_clamped: bool,
    pub volatility_clamped: bool,
}

impl GreeksResult {
    pub(crate) fn from_raw(
        option_type: OptionType,
        raw: RawGreeks,
        calendar: &CalendarConvention,
        higher_order: bool,
    ) -> Self {
        Self {
            option_type,
            price: raw.price,
            delta: raw.delta,
            gamma: raw.gamma,
            vega_per_vol: raw.vega,
            vega_per_vol_point: raw.vega * 0.01,
            theta_per_year: raw.theta,
            theta_per_day: raw.theta / calendar.day_count_basis_denominator,
            rho_per_1: raw.rho,
            rho_per_basis_point: raw.rho / 10000.0,
            phi_per_1: raw.phi,
            phi_per_basis_point: raw.phi / 10000.0,
            vanna: higher_order.then_some(raw.vanna),
            vomma: higher_order.then_some(raw.vomma),
            delta_convention: DeltaConvention::Spot,
            expiry_branch: ExpiryBranch::ClosedForm,
            effective_time_to_expiry: 0.0,
            effective_volatility: 0.0,
            time_clamped: false,
            volatility_clamped: false,
        }
    }

    /// Whether every reported figure is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.price,
            self.delta,
            self.gamma,
            self.vega_per_vol,
            self.theta_per_year,
            self.rho_per_1,
            self.phi_per_1,
        ]
        .iter()
        .chain(self.vanna.iter())
        .chain(self.vomma.iter())
        .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_scaling() {
        let raw = RawGreeks {
            price: 6.0,
            delta: 0.5,
            gamma: 0.02,
            vega: 27.0,
            theta: -7.3,
            rho: 25.0,
            phi: -30.0,
            vanna: 0.1,
            vomma: 2.0,
        };
        let r = GreeksResult::from_raw(OptionType::Call, raw, &CalendarConvention::calendar(), false);
        assert_eq!(r.vega_per_vol_point, 0.27);
        assert_eq!(r.theta_per_day, -7.3 / 365.0);
        assert_eq!(r.rho_per_basis_point, 0.0025);
        assert_eq!(r.phi_per_basis_point, -0.003);
        assert!(r.vanna.is_none() && r.vomma.is_none());

        let r = GreeksResult::from_raw(OptionType::Call, raw, &CalendarConvention::trading(), true);
        assert_eq!(r.theta_per_day, -7.3 / 252.0);
        assert_eq!(r.vanna, Some(0.1));
        assert_eq!(r.vomma, Some(2.0));
        assert!(r.is_finite());
    }
}
