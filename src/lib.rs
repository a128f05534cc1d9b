//! # bsm-greeks: Closed-Form European Option Pricing and Greeks
//!
//! `bsm-greeks` prices European calls and puts under Black-Scholes-Merton with a continuous
//! dividend (or carry) yield and returns the full first-order sensitivity set, with an
//! optional second-order extension and a self-check layer that audits every result against
//! the identities it must satisfy.
//!
//! ## Core Features
//!
//! - **Closed-form pricing**: price, delta, gamma, vega, theta, rho and phi (dividend rho)
//! - **Two parametrizations**: spot `(S0, r, q)` or forward `(F0, DF)` (Black-76 with discounting)
//! - **Unit conventions**: vega per vol point, theta per day, rho and phi per basis point
//! - **Numerically stable**: tail-accurate `N(x)` via `erfc`, floors on `T` and `sigma`
//! - **Self-checks**: put-call parity, the pricing PDE, call/put symmetry, finite differences
//!
//! ## Quick Start
//!
//! ```rust
//! use bsm_greeks::{price_and_greeks, CalendarConvention, OptionContract, OptionType};
//!
//! let contract = OptionContract::new(100.0, 100.0, 0.5, 0.20, 0.03, 0.01, OptionType::Call);
//! let greeks = price_and_greeks(contract, &CalendarConvention::calendar())?;
//!
//! assert!((greeks.price - 6.0901272).abs() < 1e-6);
//! assert!((greeks.theta_per_day - greeks.theta_per_year / 365.0).abs() < 1e-15);
//! # Ok::<(), bsm_greeks::InvalidParameterError>(())
//! ```
//!
//! ## Auditing a Result
//!
//! ```rust
//! use bsm_greeks::{default_configs, ContractBuilder, Validator};
//!
//! let contract = ContractBuilder::new()
//!     .forward(102.0)
//!     .discount_factor(0.97)
//!     .strike(100.0)
//!     .time_to_expiry(1.0)
//!     .volatility(0.25)
//!     .parse_option_type("put")
//!     .build()?;
//!
//! let report = Validator::new(default_configs::audit())?.audit(&contract)?;
//! assert!(report.is_consistent());
//! # Ok::<(), bsm_greeks::InvalidParameterError>(())
//! ```
//!
//! ## Configuration Presets
//!
//! - `calendar_days()`: 365-day theta basis (the default)
//! - `trading_days()`: 252-day theta basis
//! - `intrinsic_at_expiry()`: discounted payoff below the time or volatility floor
//! - `audit()`: higher-order Greeks on, for use with [`Validator`]
//!
//! ## Logging
//!
//! The crate emits `tracing` events (clamping, intrinsic valuation, forward-denominated
//! results, failed consistency checks) and installs no subscriber.

// ================================================================================================
// MODULES
// ================================================================================================

pub mod config;
pub mod contract;
pub mod error;
pub mod models;
pub mod validation;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Contract description and configuration
pub use config::{
    CalendarConvention, CdfMethod, ExpiryPolicy, PricingConfig, ThetaBasis, ValidationTolerances,
};
pub use contract::{
    Contract, ContractBuilder, ForwardContract, MarketInputs, NormalizedContract, OptionContract,
    OptionType,
};
pub use error::{ConsistencyViolation, Greek, Identity, InvalidParameterError};

// Pricing kernel
pub use models::bs::{BsmEngine, CharacteristicTerms, DeltaConvention, ExpiryBranch, GreeksResult};
pub use models::normal::{AbramowitzStegunNormal, ErfcNormal, StandardNormal, StatrsNormal};
pub use models::traits::NormalDistribution;

// Self-check layer
pub use validation::{
    check_pde, check_put_call_parity, check_symmetry, finite_difference_check, CheckOutcome,
    ConsistencyReport, FiniteDifferenceBumps, Validator,
};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured pricing settings for common use cases.
///
/// # Available Configurations
///
/// - [`calendar_days()`]: theta per calendar day
/// - [`trading_days()`]: theta per trading day
/// - [`intrinsic_at_expiry()`]: intrinsic valuation below the floors
/// - [`audit()`]: higher-order Greeks for validation runs
pub mod default_configs {
    use crate::config::PricingConfig;

    /// Reference settings: 365-day basis, clamped floors, erfc evaluator.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bsm_greeks::default_configs;
    ///
    /// let config = default_configs::calendar_days();
    /// assert_eq!(config.calendar.day_count_basis_denominator, 365.0);
    /// ```
    pub fn calendar_days() -> PricingConfig {
        PricingConfig::calendar_days()
    }

    /// Theta quoted per trading day (252 per year).
    ///
    /// # Example
    ///
    /// ```rust
    /// use bsm_greeks::{default_configs, ThetaBasis};
    ///
    /// let config = default_configs::trading_days();
    /// assert_eq!(config.calendar.theta_basis, ThetaBasis::Trading);
    /// ```
    pub fn trading_days() -> PricingConfig {
        PricingConfig::trading_days()
    }

    /// Values the option at its discounted payoff when `T` or `sigma` is below its floor,
    /// instead of clamping to the floor and using the closed form.
    pub fn intrinsic_at_expiry() -> PricingConfig {
        PricingConfig::intrinsic_at_expiry()
    }

    /// Vanna and vomma populated; otherwise the reference settings.
    pub fn audit() -> PricingConfig {
        PricingConfig::audit()
    }
}

// ================================================================================================
// PRICING ENTRY POINTS
// ================================================================================================

/// Price and Greeks of one European option under a calendar convention.
///
/// All other settings take their defaults: floors of 1e-6 years and 1e-8 volatility, the
/// erfc-based normal CDF and no higher-order Greeks.
///
/// # Errors
///
/// [`InvalidParameterError`] when the contract is non-physical (non-positive spot,
/// strike or forward, negative `T` or `sigma`, a discount factor outside `(0, 1]`,
/// non-finite input) or the calendar convention is invalid.
///
/// # Example
///
/// ```rust
/// use bsm_greeks::{price_and_greeks, CalendarConvention, OptionContract, OptionType};
///
/// let put = OptionContract::new(100.0, 100.0, 0.5, 0.20, 0.03, 0.01, OptionType::Put);
/// let greeks = price_and_greeks(put, &CalendarConvention::trading())?;
/// assert!(greeks.delta < 0.0);
/// # Ok::<(), bsm_greeks::InvalidParameterError>(())
/// ```
pub fn price_and_greeks(
    contract: impl Into<Contract>,
    calendar: &CalendarConvention,
) -> Result<GreeksResult, InvalidParameterError> {
    let config = PricingConfig::default().with_calendar(*calendar);
    price_and_greeks_with_config(contract, &config)
}

/// Price and Greeks under a full [`PricingConfig`].
///
/// Builds a throwaway [`BsmEngine`]; callers pricing many contracts should keep an engine.
pub fn price_and_greeks_with_config(
    contract: impl Into<Contract>,
    config: &PricingConfig,
) -> Result<GreeksResult, InvalidParameterError> {
    let engine = BsmEngine::new(config.clone())?;
    engine.price(&contract.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points_agree() {
        let contract = OptionContract::new(120.0, 100.0, 1.0, 0.25, 0.05, 0.0, OptionType::Call);
        let a = price_and_greeks(contract, &CalendarConvention::calendar()).unwrap();
        let b = price_and_greeks_with_config(contract, &default_configs::calendar_days()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_calendar_rejected() {
        let contract = OptionContract::new(100.0, 100.0, 0.5, 0.2, 0.03, 0.01, OptionType::Call);
        let calendar = CalendarConvention {
            day_count_basis_denominator: 0.0,
            ..CalendarConvention::calendar()
        };
        assert_eq!(
            price_and_greeks(contract, &calendar),
            Err(InvalidParameterError::InvalidDayCountBasis(0.0))
        );
    }

    #[test]
    fn test_invalid_contract_rejected() {
        let contract = OptionContract::new(-1.0, 100.0, 0.5, 0.2, 0.03, 0.01, OptionType::Call);
        assert_eq!(
            price_and_greeks(contract, &CalendarConvention::calendar()),
            Err(InvalidParameterError::NonPositiveSpot(-1.0))
        );
    }
}
