//! Error types for the pricing kernel and its self-check layer.
//!
//! Only two kinds exist:
//! - [`InvalidParameterError`]: non-physical inputs, always surfaced to the caller.
//! - [`ConsistencyViolation`]: a diagnostic produced by the validator. Pricing never
//!   returns it and it never prevents a [`GreeksResult`](crate::GreeksResult) from
//!   being produced.

use std::fmt;
use thiserror::Error;

/// Rejection of a non-physical contract or configuration.
///
/// # Examples
/// ```
/// use bsm_greeks::InvalidParameterError;
///
/// let err = InvalidParameterError::NonPositiveSpot(-1.0);
/// assert_eq!(err.to_string(), "spot must be > 0, got -1");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidParameterError {
    #[error("spot must be > 0, got {0}")]
    NonPositiveSpot(f64),

    #[error("strike must be > 0, got {0}")]
    NonPositiveStrike(f64),

    #[error("time to expiry must be >= 0, got {0}")]
    NegativeTimeToExpiry(f64),

    #[error("volatility must be >= 0, got {0}")]
    NegativeVolatility(f64),

    #[error("unknown option type '{0}', expected 'call' or 'put'")]
    UnknownOptionType(String),

    #[error("forward must be > 0, got {0}")]
    NonPositiveForward(f64),

    #[error("discount factor must be in (0, 1], got {0}")]
    DiscountFactorOutOfRange(f64),

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Spot-only and forward-only fields were both supplied.
    #[error("cannot mix spot fields ({spot_fields}) with forward fields ({forward_fields})")]
    MixedParametrization {
        spot_fields: String,
        forward_fields: String,
    },

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("day-count basis denominator must be > 0 and finite, got {0}")]
    InvalidDayCountBasis(f64),

    #[error("{name} floor must be > 0 and finite, got {value}")]
    InvalidFloor { name: &'static str, value: f64 },
}

/// Greek compared by the finite-difference cross-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Greek {
    Delta,
    Gamma,
    Vega,
    Rho,
    Phi,
}

impl fmt::Display for Greek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Greek::Delta => "delta",
            Greek::Gamma => "gamma",
            Greek::Vega => "vega",
            Greek::Rho => "rho",
            Greek::Phi => "phi",
        };
        f.pad(name)
    }
}

/// Identity checked by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Identity {
    /// `C - P = S0·e^{-qT} - K·e^{-rT}`
    PutCallParity,
    /// `theta + ½σ²S²·gamma + (r-q)·S·delta - r·V = 0`
    PdeResidual,
    GammaSymmetry,
    VegaSymmetry,
    FiniteDifference(Greek),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::PutCallParity => f.write_str("put-call parity"),
            Identity::PdeResidual => f.write_str("BSM PDE residual"),
            Identity::GammaSymmetry => f.write_str("call/put gamma symmetry"),
            Identity::VegaSymmetry => f.write_str("call/put vega symmetry"),
            Identity::FiniteDifference(greek) => write!(f, "finite-difference {}", greek),
        }
    }
}

/// A failed self-check: which identity, by how much, against which tolerance.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{identity} violated: residual {residual:.3e} exceeds tolerance {tolerance:.3e}")]
pub struct ConsistencyViolation {
    pub identity: Identity,
    pub residual: f64,
    pub tolerance: f64,
}

impl ConsistencyViolation {
    pub fn new(identity: Identity, residual: f64, tolerance: f64) -> Self {
        Self {
            identity,
            residual,
            tolerance,
        }
    }
}

/// Rejects NaN and infinities for a named field.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, InvalidParameterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidParameterError::NonFinite { field, value })
    }
}
