// src/models/bs/engine.rs

//! Closed-form Black-Scholes-Merton price and Greeks.
//!
//! Call:
//! ```text
//! price = S0·e^{-qT}·N(d1) - K·e^{-rT}·N(d2)
//! delta = e^{-qT}·N(d1)
//! theta = -S0·e^{-qT}·n(d1)·σ/(2√T) + q·S0·e^{-qT}·N(d1) - r·K·e^{-rT}·N(d2)
//! rho   = K·T·e^{-rT}·N(d2)
//! phi   = -T·S0·e^{-qT}·N(d1)
//! ```
//! Put:
//! ```text
//! price = K·e^{-rT}·N(-d2) - S0·e^{-qT}·N(-d1)
//! delta = e^{-qT}·N(d1) - e^{-qT}
//! theta = -S0·e^{-qT}·n(d1)·σ/(2√T) - q·S0·e^{-qT}·N(-d1) + r·K·e^{-rT}·N(-d2)
//! rho   = -K·T·e^{-rT}·N(-d2)
//! phi   = T·S0·e^{-qT}·N(-d1)
//! ```
//! Both: `gamma = e^{-qT}·n(d1)/(S0·σ·√T)`, `vega = S0·e^{-qT}·n(d1)·√T`,
//! `vanna = -e^{-qT}·n(d1)·d2/σ`, `vomma = vega·d1·d2/σ`.
//!
//! In forward form `DF·F0` replaces `S0·e^{-qT}` and `DF` replaces `e^{-rT}`.

use crate::config::PricingConfig;
use crate::contract::{Contract, NormalizedContract, OptionType};
use crate::error::InvalidParameterError;
use crate::models::bs::terms::CharacteristicTerms;
use crate::models::bs::types::{DeltaConvention, ExpiryBranch, GreeksResult, RawGreeks};
use crate::models::normal::StandardNormal;
use crate::models::traits::NormalDistribution;

/// Pricing engine bound to a configuration and a normal-distribution evaluator.
///
/// The engine holds no mutable state; one instance can price any number of
/// contracts from any number of threads.
#[derive(Debug, Clone)]
pub struct BsmEngine<D = StandardNormal> {
    config: PricingConfig,
    dist: D,
}

impl BsmEngine<StandardNormal> {
    /// Engine using the evaluator named by `config.cdf_method`.
    pub fn new(config: PricingConfig) -> Result<Self, InvalidParameterError> {
        let dist = StandardNormal::new(config.cdf_method);
        Self::with_distribution(config, dist)
    }
}

impl<D: NormalDistribution> BsmEngine<D> {
    /// Engine using a caller-supplied evaluator; `config.cdf_method` is ignored.
    pub fn with_distribution(config: PricingConfig, dist: D) -> Result<Self, InvalidParameterError> {
        config.validate()?;
        Ok(Self { config, dist })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn distribution(&self) -> &D {
        &self.dist
    }

    /// Validates, normalizes and prices `contract`.
    ///
    /// This is the only pricing entry point; a [`NormalizedContract`] assembled by
    /// hand cannot skip validation:
    ///
    /// ```compile_fail
    /// use bsm_greeks::{BsmEngine, Contract, OptionContract, OptionType, PricingConfig};
    ///
    /// let engine = BsmEngine::new(PricingConfig::default()).unwrap();
    /// let contract: Contract =
    ///     OptionContract::new(100.0, 100.0, 0.5, 0.2, 0.03, 0.01, OptionType::Call).into();
    /// let mut normalized = contract.normalize(engine.config()).unwrap();
    /// normalized.strike = 0.0;
    /// let _ = engine.price_normalized(&normalized);
    /// ```
    pub fn price(&self, contract: &Contract) -> Result<GreeksResult, InvalidParameterError> {
        let normalized = contract.normalize(&self.config)?;
        Ok(self.price_normalized(&normalized))
    }

    /// Prices a contract that has already been through [`Contract::normalize`].
    pub(crate) fn price_normalized(&self, contract: &NormalizedContract) -> GreeksResult {
        let (terms, branch) = if contract.degenerate {
            tracing::debug!(
                t = contract.time_to_expiry,
                sigma = contract.volatility,
                "pricing at intrinsic value below floors"
            );
            (CharacteristicTerms::at_expiry(contract), ExpiryBranch::Intrinsic)
        } else {
            (
                CharacteristicTerms::for_contract(contract, &self.dist),
                ExpiryBranch::ClosedForm,
            )
        };

        let (raw, convention) = match (contract.spot_inputs(), terms.carry_factor) {
            (Some((spot, rate, dividend_yield)), Some(carry)) => (
                spot_greeks(
                    contract.option_type,
                    &SpotMarket {
                        spot,
                        rate,
                        dividend_yield,
                        carry,
                    },
                    contract,
                    &terms,
                ),
                DeltaConvention::Spot,
            ),
            _ => {
                tracing::debug!("no carry yield supplied, returning forward-denominated greeks");
                (
                    forward_greeks(contract.option_type, contract, &terms),
                    DeltaConvention::Forward,
                )
            }
        };

        let mut result = GreeksResult::from_raw(
            contract.option_type,
            raw,
            &self.config.calendar,
            self.config.higher_order,
        );
        result.delta_convention = convention;
        result.expiry_branch = branch;
        result.effective_time_to_expiry = contract.time_to_expiry;
        result.effective_volatility = contract.volatility;
        result.time_clamped = contract.time_clamped;
        result.volatility_clamped = contract.volatility_clamped;
        result
    }
}

struct SpotMarket {
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    /// e^{-qT}
    carry: f64,
}

/// Density-driven pieces; all zero when there is no diffusion left (`σ√T = 0`).
struct DensityTerms {
    /// `S0·e^{-qT}·n(d1)·σ/(2√T)`
    time_decay: f64,
    /// `S0·e^{-qT}·n(d1)·√T`
    vega: f64,
}

fn density_terms(terms: &CharacteristicTerms, sigma: f64) -> DensityTerms {
    if terms.sigma_sqrt_t > 0.0 {
        let scaled = terms.discounted_underlying * terms.pdf_d1;
        DensityTerms {
            time_decay: scaled * sigma / (2.0 * terms.sqrt_t),
            vega: scaled * terms.sqrt_t,
        }
    } else {
        DensityTerms {
            time_decay: 0.0,
            vega: 0.0,
        }
    }
}

/// `(vanna, vomma)` given the factor multiplying `n(d1)` in delta.
fn second_order(terms: &CharacteristicTerms, sigma: f64, delta_factor: f64, vega: f64) -> (f64, f64) {
    if terms.sigma_sqrt_t > 0.0 {
        (
            -delta_factor * terms.pdf_d1 * terms.d2 / sigma,
            vega * terms.d1 * terms.d2 / sigma,
        )
    } else {
        (0.0, 0.0)
    }
}

fn spot_greeks(
    option_type: OptionType,
    market: &SpotMarket,
    contract: &NormalizedContract,
    terms: &CharacteristicTerms,
) -> RawGreeks {
    let t = contract.time_to_expiry;
    let sigma = contract.volatility;
    let k = contract.strike;
    let r = market.rate;
    let q = market.dividend_yield;
    let a = terms.discounted_underlying;
    let kd = terms.discounted_strike(k);

    let density = density_terms(terms, sigma);
    let gamma = if terms.sigma_sqrt_t > 0.0 {
        market.carry * terms.pdf_d1 / (market.spot * terms.sigma_sqrt_t)
    } else {
        0.0
    };
    let (vanna, vomma) = second_order(terms, sigma, market.carry, density.vega);

    let (price, delta, theta, rho, phi) = match option_type {
        OptionType::Call => (
            a * terms.cdf_d1 - kd * terms.cdf_d2,
            market.carry * terms.cdf_d1,
            -density.time_decay + q * a * terms.cdf_d1 - r * kd * terms.cdf_d2,
            k * t * terms.discount_factor * terms.cdf_d2,
            -t * a * terms.cdf_d1,
        ),
        OptionType::Put => (
            kd * terms.cdf_neg_d2 - a * terms.cdf_neg_d1,
            // e^{-qT}·(N(d1) - 1) written without the cancellation
            -market.carry * terms.cdf_neg_d1,
            -density.time_decay - q * a * terms.cdf_neg_d1 + r * kd * terms.cdf_neg_d2,
            -k * t * terms.discount_factor * terms.cdf_neg_d2,
            t * a * terms.cdf_neg_d1,
        ),
    };

    RawGreeks {
        price,
        delta,
        gamma,
        vega: density.vega,
        theta,
        rho,
        phi,
        vanna,
        vomma,
    }
}

/// Greeks with the forward as state variable (Black-76 with DF).
///
/// Delta and gamma are taken with respect to F0. Theta and rho hold F0 fixed, so rho
/// is `-T·V` and phi is zero: carry does not enter once the forward is given.
fn forward_greeks(
    option_type: OptionType,
    contract: &NormalizedContract,
    terms: &CharacteristicTerms,
) -> RawGreeks {
    let t = contract.time_to_expiry;
    let sigma = contract.volatility;
    let r = contract.rate();
    let df = terms.discount_factor;
    let a = terms.discounted_underlying;
    let kd = terms.discounted_strike(contract.strike);
    let forward = a / df;

    let density = density_terms(terms, sigma);
    let gamma = if terms.sigma_sqrt_t > 0.0 {
        df * terms.pdf_d1 / (forward * terms.sigma_sqrt_t)
    } else {
        0.0
    };
    let (vanna, vomma) = second_order(terms, sigma, df, density.vega);

    let (price, delta) = match option_type {
        OptionType::Call => (a * terms.cdf_d1 - kd * terms.cdf_d2, df * terms.cdf_d1),
        OptionType::Put => (kd * terms.cdf_neg_d2 - a * terms.cdf_neg_d1, -df * terms.cdf_neg_d1),
    };

    RawGreeks {
        price,
        delta,
        gamma,
        vega: density.vega,
        theta: r * price - density.time_decay,
        rho: -t * price,
        phi: 0.0,
        vanna,
        vomma,
    }
}
