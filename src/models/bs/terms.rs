// src/models/bs/terms.rs

//! Characteristic terms shared by every Black-Scholes-Merton formula.
//!
//! The builder evaluates each transcendental once. Price and every Greek read the
//! same `N(d1)`, `N(d2)`, `n(d1)` and discount factors, so results stay internally
//! consistent (delta and gamma use exactly the values the price used).
//!
//! Spot form:    d1 = (ln(S0/K) + (r - q + σ²/2)·T) / (σ·√T)
//! Forward form: d1 = (ln(F0/K) + σ²·T/2) / (σ·√T)
//! Both:         d2 = d1 - σ·√T

use crate::contract::{MarketInputs, NormalizedContract};
use crate::models::traits::NormalDistribution;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacteristicTerms {
    pub d1: f64,
    pub d2: f64,
    pub cdf_d1: f64,
    pub cdf_d2: f64,
    pub cdf_neg_d1: f64,
    pub cdf_neg_d2: f64,
    pub pdf_d1: f64,
    /// `S0·e^{-qT}` in spot form, `DF·F0` in forward form
    pub discounted_underlying: f64,
    /// `e^{-rT}` or the supplied DF
    pub discount_factor: f64,
    /// `e^{-qT}` when a carry yield is known
    pub carry_factor: Option<f64>,
    pub sqrt_t: f64,
    pub sigma_sqrt_t: f64,
}

impl CharacteristicTerms {
    /// Spot parametrization. Inputs must already be validated (`S0, K > 0`, `T, σ` floored).
    #[allow(clippy::too_many_arguments)]
    pub fn spot<D: NormalDistribution + ?Sized>(
        spot: f64,
        strike: f64,
        t: f64,
        sigma: f64,
        r: f64,
        q: f64,
        dist: &D,
    ) -> Self {
        let sqrt_t = t.sqrt();
        let sigma_sqrt_t = sigma * sqrt_t;
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
        let carry = (-q * t).exp();
        Self::from_d1(
            d1,
            sigma_sqrt_t,
            sqrt_t,
            spot * carry,
            (-r * t).exp(),
            Some(carry),
            dist,
        )
    }

    /// Forward parametrization. `carry` is `e^{-qT}` if the yield is known.
    pub fn forward<D: NormalDistribution + ?Sized>(
        forward: f64,
        discount_factor: f64,
        strike: f64,
        t: f64,
        sigma: f64,
        carry: Option<f64>,
        dist: &D,
    ) -> Self {
        let sqrt_t = t.sqrt();
        let sigma_sqrt_t = sigma * sqrt_t;
        let d1 = ((forward / strike).ln() + 0.5 * sigma * sigma * t) / sigma_sqrt_t;
        Self::from_d1(
            d1,
            sigma_sqrt_t,
            sqrt_t,
            discount_factor * forward,
            discount_factor,
            carry,
            dist,
        )
    }

    /// Terms for a normalized contract in its own parametrization.
    pub fn for_contract<D: NormalDistribution + ?Sized>(
        contract: &NormalizedContract,
        dist: &D,
    ) -> Self {
        let t = contract.time_to_expiry;
        let sigma = contract.volatility;
        match contract.market {
            MarketInputs::Spot {
                spot,
                rate,
                dividend_yield,
            } => Self::spot(spot, contract.strike, t, sigma, rate, dividend_yield, dist),
            MarketInputs::Forward {
                forward,
                discount_factor,
                ..
            } => Self::forward(forward, discount_factor, contract.strike, t, sigma, None, dist),
        }
    }

    /// Zero-variance limit: the cumulative terms collapse to the exercise indicator
    /// (½ exactly at the money) and the density to zero.
    pub fn at_expiry(contract: &NormalizedContract) -> Self {
        let t = contract.time_to_expiry;
        let (discounted_underlying, discount_factor, carry_factor) = match contract.market {
            MarketInputs::Spot {
                spot,
                rate,
                dividend_yield,
            } => {
                let carry = (-dividend_yield * t).exp();
                (spot * carry, (-rate * t).exp(), Some(carry))
            }
            MarketInputs::Forward {
                forward,
                discount_factor,
                ..
            } => (discount_factor * forward, discount_factor, None),
        };

        let discounted_strike = contract.strike * discount_factor;
        let (d, weight) = if discounted_underlying > discounted_strike {
            (f64::INFINITY, 1.0)
        } else if discounted_underlying < discounted_strike {
            (f64::NEG_INFINITY, 0.0)
        } else {
            (0.0, 0.5)
        };

        Self {
            d1: d,
            d2: d,
            cdf_d1: weight,
            cdf_d2: weight,
            cdf_neg_d1: 1.0 - weight,
            cdf_neg_d2: 1.0 - weight,
            pdf_d1: 0.0,
            discounted_underlying,
            discount_factor,
            carry_factor,
            sqrt_t: t.sqrt(),
            sigma_sqrt_t: 0.0,
        }
    }

    fn from_d1<D: NormalDistribution + ?Sized>(
        d1: f64,
        sigma_sqrt_t: f64,
        sqrt_t: f64,
        discounted_underlying: f64,
        discount_factor: f64,
        carry_factor: Option<f64>,
        dist: &D,
    ) -> Self {
        let d2 = d1 - sigma_sqrt_t;
        Self {
            d1,
            d2,
            cdf_d1: dist.cdf(d1),
            cdf_d2: dist.cdf(d2),
            cdf_neg_d1: dist.cdf(-d1),
            cdf_neg_d2: dist.cdf(-d2),
            pdf_d1: dist.pdf(d1),
            discounted_underlying,
            discount_factor,
            carry_factor,
            sqrt_t,
            sigma_sqrt_t,
        }
    }

    /// `K·DF`
    pub fn discounted_strike(&self, strike: f64) -> f64 {
        strike * self.discount_factor
    }
}
