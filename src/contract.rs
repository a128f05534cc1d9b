//! Option contracts in spot or forward parametrization, plus the validation and
//! normalization step that runs before any formula is evaluated.

use std::fmt;
use std::str::FromStr;

use crate::config::{ExpiryPolicy, PricingConfig};
use crate::error::{ensure_finite, InvalidParameterError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// European exercise direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionType {
    Call,
    Put,
}

impl FromStr for OptionType {
    type Err = InvalidParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            _ => Err(InvalidParameterError::UnknownOptionType(s.to_string())),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.pad("call"),
            OptionType::Put => f.pad("put"),
        }
    }
}

/// Spot-parametrized European option.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptionContract {
    /// Underlying spot price S0
    pub spot: f64,
    /// Strike price K
    pub strike: f64,
    /// Time to expiry T in years
    pub time_to_expiry: f64,
    /// Annualized volatility as a decimal (0.20 for 20%)
    pub volatility: f64,
    /// Continuously compounded risk-free rate
    pub risk_free_rate: f64,
    /// Continuously compounded dividend (carry) yield
    pub dividend_yield: f64,
    pub option_type: OptionType,
}

impl OptionContract {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            volatility,
            risk_free_rate,
            dividend_yield,
            option_type,
        }
    }

    /// Same contract with the other exercise direction.
    pub fn with_option_type(self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        let spot = ensure_finite("spot", self.spot)?;
        validate_common(
            self.strike,
            self.time_to_expiry,
            self.volatility,
        )?;
        ensure_finite("risk_free_rate", self.risk_free_rate)?;
        ensure_finite("dividend_yield", self.dividend_yield)?;
        if spot <= 0.0 {
            return Err(InvalidParameterError::NonPositiveSpot(spot));
        }
        Ok(())
    }

    /// Converts to the forward parametrization via `F0 = S0·e^{(r-q)T}`, `DF = e^{-rT}`.
    ///
    /// The dividend yield travels with the forward so spot Greeks remain available.
    /// Negative rates give `DF > 1`, which the forward form rejects.
    pub fn to_forward(&self) -> Result<ForwardContract, InvalidParameterError> {
        self.validate()?;
        let t = self.time_to_expiry;
        let forward = ForwardContract {
            forward: self.spot * ((self.risk_free_rate - self.dividend_yield) * t).exp(),
            discount_factor: (-self.risk_free_rate * t).exp(),
            strike: self.strike,
            time_to_expiry: t,
            volatility: self.volatility,
            option_type: self.option_type,
            dividend_yield: Some(self.dividend_yield),
        };
        forward.validate()?;
        Ok(forward)
    }
}

/// Forward-parametrized European option.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForwardContract {
    /// Forward price F0 for the option's expiry
    pub forward: f64,
    /// Discount factor DF = e^{-rT}
    pub discount_factor: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub volatility: f64,
    pub option_type: OptionType,
    /// Carry yield; without it only forward-denominated Greeks can be produced
    #[cfg_attr(feature = "serde", serde(default))]
    pub dividend_yield: Option<f64>,
}

impl ForwardContract {
    pub fn new(
        forward: f64,
        discount_factor: f64,
        strike: f64,
        time_to_expiry: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            forward,
            discount_factor,
            strike,
            time_to_expiry,
            volatility,
            option_type,
            dividend_yield: None,
        }
    }

    pub fn with_dividend_yield(mut self, q: f64) -> Self {
        self.dividend_yield = Some(q);
        self
    }

    pub fn with_option_type(self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        let forward = ensure_finite("forward", self.forward)?;
        let df = ensure_finite("discount_factor", self.discount_factor)?;
        validate_common(self.strike, self.time_to_expiry, self.volatility)?;
        if let Some(q) = self.dividend_yield {
            ensure_finite("dividend_yield", q)?;
        }
        if forward <= 0.0 {
            return Err(InvalidParameterError::NonPositiveForward(forward));
        }
        if df <= 0.0 || df > 1.0 {
            return Err(InvalidParameterError::DiscountFactorOutOfRange(df));
        }
        Ok(())
    }

    /// Rate implied by the discount factor, `-ln(DF)/T`, zero at expiry.
    pub fn implied_rate(&self) -> f64 {
        implied_rate(self.discount_factor, self.time_to_expiry)
    }

    /// Converts to spot form given the carry yield: `S0 = F0·DF·e^{qT}`.
    pub fn to_spot(&self, dividend_yield: f64) -> Result<OptionContract, InvalidParameterError> {
        self.validate()?;
        ensure_finite("dividend_yield", dividend_yield)?;
        let t = self.time_to_expiry;
        let spot = OptionContract {
            spot: self.forward * self.discount_factor * (dividend_yield * t).exp(),
            strike: self.strike,
            time_to_expiry: t,
            volatility: self.volatility,
            risk_free_rate: self.implied_rate(),
            dividend_yield,
            option_type: self.option_type,
        };
        spot.validate()?;
        Ok(spot)
    }
}

/// Exactly one parametrization per pricing call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "parametrization", rename_all = "lowercase"))]
pub enum Contract {
    Spot(OptionContract),
    Forward(ForwardContract),
}

impl From<OptionContract> for Contract {
    fn from(c: OptionContract) -> Self {
        Contract::Spot(c)
    }
}

impl From<ForwardContract> for Contract {
    fn from(c: ForwardContract) -> Self {
        Contract::Forward(c)
    }
}

impl Contract {
    pub fn option_type(&self) -> OptionType {
        match self {
            Contract::Spot(c) => c.option_type,
            Contract::Forward(c) => c.option_type,
        }
    }

    pub fn strike(&self) -> f64 {
        match self {
            Contract::Spot(c) => c.strike,
            Contract::Forward(c) => c.strike,
        }
    }

    pub fn with_option_type(self, option_type: OptionType) -> Self {
        match self {
            Contract::Spot(c) => Contract::Spot(c.with_option_type(option_type)),
            Contract::Forward(c) => Contract::Forward(c.with_option_type(option_type)),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        match self {
            Contract::Spot(c) => c.validate(),
            Contract::Forward(c) => c.validate(),
        }
    }

    /// Validates the contract and applies the floors from `config`.
    ///
    /// Under [`ExpiryPolicy::Clamp`] a `T` or `sigma` below its floor is raised to the
    /// floor. Under [`ExpiryPolicy::Intrinsic`] the supplied values are kept and the
    /// contract is flagged as degenerate so the engine takes the payoff branch.
    pub fn normalize(&self, config: &PricingConfig) -> Result<NormalizedContract, InvalidParameterError> {
        self.validate()?;
        let (raw_t, raw_sigma) = match self {
            Contract::Spot(c) => (c.time_to_expiry, c.volatility),
            Contract::Forward(c) => (c.time_to_expiry, c.volatility),
        };

        let time_below = raw_t < config.time_floor;
        let vol_below = raw_sigma < config.volatility_floor;

        let (t, sigma, time_clamped, volatility_clamped) = match config.expiry_policy {
            ExpiryPolicy::Clamp => (
                raw_t.max(config.time_floor),
                raw_sigma.max(config.volatility_floor),
                time_below,
                vol_below,
            ),
            ExpiryPolicy::Intrinsic => (raw_t, raw_sigma, false, false),
        };
        if time_clamped || volatility_clamped {
            tracing::debug!(
                raw_t,
                raw_sigma,
                t,
                sigma,
                "clamped degenerate inputs to floors"
            );
        }

        let market = match self {
            Contract::Spot(c) => MarketInputs::Spot {
                spot: c.spot,
                rate: c.risk_free_rate,
                dividend_yield: c.dividend_yield,
            },
            // DF and F0 were quoted for the caller's T, so the rate and the spot
            // equivalent are implied there even when the formulas use a floored T
            Contract::Forward(c) => {
                let rate = implied_rate(c.discount_factor, raw_t);
                match c.dividend_yield {
                    Some(q) => MarketInputs::Spot {
                        spot: c.forward * c.discount_factor * (q * raw_t).exp(),
                        rate,
                        dividend_yield: q,
                    },
                    None => MarketInputs::Forward {
                        forward: c.forward,
                        discount_factor: c.discount_factor,
                        rate,
                    },
                }
            }
        };

        Ok(NormalizedContract {
            option_type: self.option_type(),
            strike: self.strike(),
            time_to_expiry: t,
            volatility: sigma,
            time_clamped,
            volatility_clamped,
            degenerate: config.expiry_policy == ExpiryPolicy::Intrinsic && (time_below || vol_below),
            market,
        })
    }
}

/// Market side of a normalized contract.
///
/// A forward contract with a carry yield normalizes to `Spot` with `S0 = F0·DF·e^{qT}`
/// and `r = -ln(DF)/T`; only a forward without carry stays `Forward`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarketInputs {
    Spot {
        spot: f64,
        rate: f64,
        dividend_yield: f64,
    },
    Forward {
        forward: f64,
        discount_factor: f64,
        /// `-ln(DF)/T` at the quoted time to expiry
        rate: f64,
    },
}

/// A validated contract with effective `T` and `sigma`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedContract {
    pub option_type: OptionType,
    pub strike: f64,
    /// Time to expiry actually used by the formulas
    pub time_to_expiry: f64,
    /// Volatility actually used by the formulas
    pub volatility: f64,
    pub time_clamped: bool,
    pub volatility_clamped: bool,
    /// Below a floor under the intrinsic policy
    pub degenerate: bool,
    pub market: MarketInputs,
}

impl NormalizedContract {
    /// `(S0, r, q)` when spot Greeks can be produced; a forward without carry has no
    /// spot equivalent.
    pub fn spot_inputs(&self) -> Option<(f64, f64, f64)> {
        match self.market {
            MarketInputs::Spot {
                spot,
                rate,
                dividend_yield,
            } => Some((spot, rate, dividend_yield)),
            MarketInputs::Forward { .. } => None,
        }
    }

    /// Risk-free rate, given or implied.
    pub fn rate(&self) -> f64 {
        match self.market {
            MarketInputs::Spot { rate, .. } | MarketInputs::Forward { rate, .. } => rate,
        }
    }
}

/// Incremental construction of a [`Contract`] from individually supplied fields.
///
/// `spot`/`risk_free_rate` select the spot form, `forward`/`discount_factor` the forward
/// form. Supplying fields from both is a construction error. `dividend_yield` is
/// accepted by both; it defaults to zero in spot form and stays absent in forward form.
///
/// ```
/// use bsm_greeks::{Contract, ContractBuilder};
///
/// let contract = ContractBuilder::new()
///     .spot(100.0)
///     .strike(100.0)
///     .time_to_expiry(0.5)
///     .volatility(0.2)
///     .risk_free_rate(0.03)
///     .dividend_yield(0.01)
///     .parse_option_type("call")
///     .build()
///     .unwrap();
/// assert!(matches!(contract, Contract::Spot(_)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    spot: Option<f64>,
    risk_free_rate: Option<f64>,
    forward: Option<f64>,
    discount_factor: Option<f64>,
    strike: Option<f64>,
    time_to_expiry: Option<f64>,
    volatility: Option<f64>,
    dividend_yield: Option<f64>,
    option_type: Option<Result<OptionType, InvalidParameterError>>,
}

impl ContractBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    pub fn risk_free_rate(mut self, r: f64) -> Self {
        self.risk_free_rate = Some(r);
        self
    }

    pub fn forward(mut self, forward: f64) -> Self {
        self.forward = Some(forward);
        self
    }

    pub fn discount_factor(mut self, df: f64) -> Self {
        self.discount_factor = Some(df);
        self
    }

    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    pub fn time_to_expiry(mut self, t: f64) -> Self {
        self.time_to_expiry = Some(t);
        self
    }

    pub fn volatility(mut self, sigma: f64) -> Self {
        self.volatility = Some(sigma);
        self
    }

    pub fn dividend_yield(mut self, q: f64) -> Self {
        self.dividend_yield = Some(q);
        self
    }

    pub fn option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = Some(Ok(option_type));
        self
    }

    /// Parses "call"/"put"; an unknown name fails at [`build`](Self::build).
    pub fn parse_option_type(mut self, name: &str) -> Self {
        self.option_type = Some(name.parse());
        self
    }

    pub fn build(self) -> Result<Contract, InvalidParameterError> {
        let spot_fields = named_fields(&[
            ("spot", self.spot.is_some()),
            ("risk_free_rate", self.risk_free_rate.is_some()),
        ]);
        let forward_fields = named_fields(&[
            ("forward", self.forward.is_some()),
            ("discount_factor", self.discount_factor.is_some()),
        ]);
        if !spot_fields.is_empty() && !forward_fields.is_empty() {
            return Err(InvalidParameterError::MixedParametrization {
                spot_fields,
                forward_fields,
            });
        }

        let option_type = self
            .option_type
            .ok_or(InvalidParameterError::MissingField("option_type"))??;
        let strike = self.strike.ok_or(InvalidParameterError::MissingField("strike"))?;
        let time_to_expiry = self
            .time_to_expiry
            .ok_or(InvalidParameterError::MissingField("time_to_expiry"))?;
        let volatility = self
            .volatility
            .ok_or(InvalidParameterError::MissingField("volatility"))?;

        let contract = if !forward_fields.is_empty() {
            Contract::Forward(ForwardContract {
                forward: self.forward.ok_or(InvalidParameterError::MissingField("forward"))?,
                discount_factor: self
                    .discount_factor
                    .ok_or(InvalidParameterError::MissingField("discount_factor"))?,
                strike,
                time_to_expiry,
                volatility,
                option_type,
                dividend_yield: self.dividend_yield,
            })
        } else {
            Contract::Spot(OptionContract {
                spot: self.spot.ok_or(InvalidParameterError::MissingField("spot"))?,
                strike,
                time_to_expiry,
                volatility,
                risk_free_rate: self
                    .risk_free_rate
                    .ok_or(InvalidParameterError::MissingField("risk_free_rate"))?,
                dividend_yield: self.dividend_yield.unwrap_or(0.0),
                option_type,
            })
        };
        contract.validate()?;
        Ok(contract)
    }
}

fn named_fields(fields: &[(&str, bool)]) -> String {
    fields
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate_common(strike: f64, t: f64, sigma: f64) -> Result<(), InvalidParameterError> {
    let strike = ensure_finite("strike", strike)?;
    let t = ensure_finite("time_to_expiry", t)?;
    let sigma = ensure_finite("volatility", sigma)?;
    if strike <= 0.0 {
        return Err(InvalidParameterError::NonPositiveStrike(strike));
    }
    if t < 0.0 {
        return Err(InvalidParameterError::NegativeTimeToExpiry(t));
    }
    if sigma < 0.0 {
        return Err(InvalidParameterError::NegativeVolatility(sigma));
    }
    Ok(())
}

fn implied_rate(discount_factor: f64, t: f64) -> f64 {
    if t > 0.0 {
        -discount_factor.ln() / t
    } else {
        0.0
    }
}
