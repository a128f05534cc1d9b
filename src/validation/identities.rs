//! Closed-form identities every consistent result must satisfy.

use crate::contract::{MarketInputs, NormalizedContract};
use crate::error::{ConsistencyViolation, Identity};
use crate::models::bs::{DeltaConvention, GreeksResult};

/// `(S0·e^{-qT}, K·e^{-rT})`, or `(DF·F0, K·DF)` in forward form, at the effective T.
pub fn discounted_legs(contract: &NormalizedContract) -> (f64, f64) {
    let t = contract.time_to_expiry;
    match contract.market {
        MarketInputs::Spot {
            spot,
            rate,
            dividend_yield,
        } => (
            spot * (-dividend_yield * t).exp(),
            contract.strike * (-rate * t).exp(),
        ),
        MarketInputs::Forward {
            forward,
            discount_factor,
            ..
        } => (discount_factor * forward, contract.strike * discount_factor),
    }
}

fn within(identity: Identity, residual: f64, tolerance: f64) -> Result<f64, ConsistencyViolation> {
    // NaN residuals fail as well
    if residual <= tolerance {
        Ok(residual)
    } else {
        Err(ConsistencyViolation::new(identity, residual, tolerance))
    }
}

/// `|C - P - (S0·e^{-qT} - K·e^{-rT})|` for the call and put on the same contract.
pub fn check_put_call_parity(
    call: &GreeksResult,
    put: &GreeksResult,
    contract: &NormalizedContract,
    tolerance: f64,
) -> Result<f64, ConsistencyViolation> {
    let (underlying, strike) = discounted_legs(contract);
    let residual = (call.price - put.price - (underlying - strike)).abs();
    within(Identity::PutCallParity, residual, tolerance)
}

/// Residual of the pricing PDE at the effective `T` and `sigma`.
///
/// Spot convention: `theta + ½σ²S0²·gamma + (r-q)·S0·delta - r·V`.
/// Forward convention: `theta + ½σ²F0²·gamma - r·V`, the forward carrying no drift.
pub fn check_pde(
    result: &GreeksResult,
    contract: &NormalizedContract,
    tolerance: f64,
) -> Result<f64, ConsistencyViolation> {
    let sigma = contract.volatility;
    let variance = 0.5 * sigma * sigma;
    let residual = match (result.delta_convention, contract.spot_inputs()) {
        (DeltaConvention::Spot, Some((spot, r, q))) => {
            result.theta_per_year
                + variance * spot * spot * result.gamma
                + (r - q) * spot * result.delta
                - r * result.price
        }
        _ => {
            let (discounted_forward, _) = discounted_legs(contract);
            let forward = match contract.market {
                MarketInputs::Forward { forward, .. } => forward,
                MarketInputs::Spot { .. } => discounted_forward,
            };
            result.theta_per_year + variance * forward * forward * result.gamma
                - contract.rate() * result.price
        }
    };
    within(Identity::PdeResidual, residual.abs(), tolerance)
}

/// Gamma and vega must be bit-identical between call and put.
pub fn check_symmetry(call: &GreeksResult, put: &GreeksResult) -> Vec<ConsistencyViolation> {
    [
        (Identity::GammaSymmetry, call.gamma, put.gamma),
        (Identity::VegaSymmetry, call.vega_per_vol, put.vega_per_vol),
    ]
    .into_iter()
    .filter(|(_, a, b)| a != b)
    .map(|(identity, a, b)| ConsistencyViolation::new(identity, (a - b).abs(), 0.0))
    .collect()
}
