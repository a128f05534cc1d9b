use crate::error::InvalidParameterError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether the per-day theta is quoted against calendar or trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThetaBasis {
    #[default]
    Calendar,
    Trading,
}

impl ThetaBasis {
    /// Conventional number of days per year for this basis.
    pub fn default_denominator(self) -> f64 {
        match self {
            ThetaBasis::Calendar => 365.0,
            ThetaBasis::Trading => 252.0,
        }
    }
}

/// Converts annualized theta into a per-day figure.
///
/// `theta_per_day = theta / day_count_basis_denominator`. The denominator always
/// governs; `theta_basis` names the convention and supplies the denominator when a
/// config file leaves it out, so `theta_basis = "trading"` alone means 252. An
/// explicit denominator is kept as given, even one that differs from the basis default.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "CalendarConventionFields"))]
pub struct CalendarConvention {
    /// Days per year, e.g. 365 or 252
    pub day_count_basis_denominator: f64,
    pub theta_basis: ThetaBasis,
}

/// On-disk form of [`CalendarConvention`]; the denominator is optional.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct CalendarConventionFields {
    day_count_basis_denominator: Option<f64>,
    #[serde(default)]
    theta_basis: ThetaBasis,
}

#[cfg(feature = "serde")]
impl From<CalendarConventionFields> for CalendarConvention {
    fn from(fields: CalendarConventionFields) -> Self {
        let basis = Self::for_basis(fields.theta_basis);
        Self {
            day_count_basis_denominator: fields
                .day_count_basis_denominator
                .unwrap_or(basis.day_count_basis_denominator),
            ..basis
        }
    }
}

impl Default for CalendarConvention {
    fn default() -> Self {
        Self::calendar()
    }
}

impl CalendarConvention {
    /// 365 calendar days per year.
    pub fn calendar() -> Self {
        Self::for_basis(ThetaBasis::Calendar)
    }

    /// 252 trading days per year.
    pub fn trading() -> Self {
        Self::for_basis(ThetaBasis::Trading)
    }

    pub fn for_basis(theta_basis: ThetaBasis) -> Self {
        Self {
            day_count_basis_denominator: theta_basis.default_denominator(),
            theta_basis,
        }
    }

    /// Checks the denominator only; any positive value is accepted for either basis.
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        let d = self.day_count_basis_denominator;
        if !(d.is_finite() && d > 0.0) {
            return Err(InvalidParameterError::InvalidDayCountBasis(d));
        }
        if d != self.theta_basis.default_denominator() {
            tracing::debug!(
                denominator = d,
                theta_basis = ?self.theta_basis,
                "day-count denominator differs from the basis default"
            );
        }
        Ok(())
    }
}

/// What to do when `T` or `sigma` falls below its floor.
///
/// `Clamp` raises the value to the floor and evaluates the closed form there, which
/// approximates the expiry limit. `Intrinsic` skips the closed form and returns the
/// discounted payoff with the Greeks of that deterministic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExpiryPolicy {
    #[default]
    Clamp,
    Intrinsic,
}

/// Normal CDF implementation used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CdfMethod {
    /// `libm::erfc`, accurate to machine precision in both tails
    #[default]
    Erfc,
    /// `statrs` normal distribution
    Statrs,
    /// Abramowitz & Stegun 7.1.26, absolute error below 1.5e-7
    AbramowitzStegun,
}

/// Tolerances used by the self-check layer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationTolerances {
    /// Absolute tolerance on the put-call parity residual
    #[cfg_attr(feature = "serde", serde(default = "default_parity_tolerance"))]
    pub parity: f64,
    /// Absolute tolerance on the PDE residual
    #[cfg_attr(feature = "serde", serde(default = "default_pde_tolerance"))]
    pub pde: f64,
    /// Relative tolerance between analytic and bumped Greeks
    #[cfg_attr(feature = "serde", serde(default = "default_fd_tolerance"))]
    pub finite_difference: f64,
}

impl Default for ValidationTolerances {
    fn default() -> Self {
        Self {
            parity: default_parity_tolerance(),
            pde: default_pde_tolerance(),
            finite_difference: default_fd_tolerance(),
        }
    }
}

/// Main configuration for a pricing call.
///
/// Every field has a default, so a TOML document only needs the keys it changes:
///
/// ```toml
/// expiry_policy = "intrinsic"
/// higher_order = true
///
/// [calendar]
/// day_count_basis_denominator = 252.0
/// theta_basis = "trading"
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PricingConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub calendar: CalendarConvention,

    #[cfg_attr(feature = "serde", serde(default))]
    pub expiry_policy: ExpiryPolicy,

    /// Smallest time to expiry (years) fed to the closed form
    #[cfg_attr(feature = "serde", serde(default = "default_time_floor"))]
    pub time_floor: f64,

    /// Smallest volatility fed to the closed form
    #[cfg_attr(feature = "serde", serde(default = "default_volatility_floor"))]
    pub volatility_floor: f64,

    #[cfg_attr(feature = "serde", serde(default))]
    pub cdf_method: CdfMethod,

    /// Populate vanna and vomma
    #[cfg_attr(feature = "serde", serde(default))]
    pub higher_order: bool,

    #[cfg_attr(feature = "serde", serde(default))]
    pub tolerances: ValidationTolerances,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarConvention::default(),
            expiry_policy: ExpiryPolicy::default(),
            time_floor: default_time_floor(),
            volatility_floor: default_volatility_floor(),
            cdf_method: CdfMethod::default(),
            higher_order: false,
            tolerances: ValidationTolerances::default(),
        }
    }
}

impl PricingConfig {
    /// Calendar-day theta, clamp-based expiry handling.
    pub fn calendar_days() -> Self {
        Self::default()
    }

    /// Trading-day theta, clamp-based expiry handling.
    pub fn trading_days() -> Self {
        Self {
            calendar: CalendarConvention::trading(),
            ..Self::default()
        }
    }

    /// Exact discounted payoff below the floors instead of clamping.
    pub fn intrinsic_at_expiry() -> Self {
        Self {
            expiry_policy: ExpiryPolicy::Intrinsic,
            ..Self::default()
        }
    }

    /// Higher-order Greeks on, for risk audits and validation runs.
    pub fn audit() -> Self {
        Self {
            higher_order: true,
            ..Self::default()
        }
    }

    pub fn with_calendar(mut self, calendar: CalendarConvention) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    pub fn with_cdf_method(mut self, method: CdfMethod) -> Self {
        self.cdf_method = method;
        self
    }

    pub fn with_higher_order(mut self, enabled: bool) -> Self {
        self.higher_order = enabled;
        self
    }

    /// Checks the calendar and the floors.
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        self.calendar.validate()?;
        for (name, value) in [
            ("time", self.time_floor),
            ("volatility", self.volatility_floor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(InvalidParameterError::InvalidFloor { name, value });
            }
        }
        Ok(())
    }

    /// Parses a TOML document and validates the result.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let config: Self = toml::from_str(source).context("failed to parse pricing config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    #[cfg(feature = "serde")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pricing config {}", path.display()))?;
        let config = Self::from_toml_str(&source)
            .with_context(|| format!("invalid pricing config {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            expiry_policy = ?config.expiry_policy,
            cdf_method = ?config.cdf_method,
            "loaded pricing config"
        );
        Ok(config)
    }
}

fn default_time_floor() -> f64 {
    1e-6
}

fn default_volatility_floor() -> f64 {
    1e-8
}

fn default_parity_tolerance() -> f64 {
    1e-8
}

fn default_pde_tolerance() -> f64 {
    1e-6
}

fn default_fd_tolerance() -> f64 {
    1e-4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PricingConfig::default();
        assert_eq!(config.calendar.day_count_basis_denominator, 365.0);
        assert_eq!(config.calendar.theta_basis, ThetaBasis::Calendar);
        assert_eq!(config.expiry_policy, ExpiryPolicy::Clamp);
        assert_eq!(config.time_floor, 1e-6);
        assert_eq!(config.volatility_floor, 1e-8);
        assert!(!config.higher_order);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            PricingConfig::trading_days().calendar.day_count_basis_denominator,
            252.0
        );
        assert_eq!(
            PricingConfig::intrinsic_at_expiry().expiry_policy,
            ExpiryPolicy::Intrinsic
        );
        assert!(PricingConfig::audit().higher_order);
    }

    #[test]
    fn test_invalid_calendar_rejected() {
        let mut config = PricingConfig::default();
        config.calendar.day_count_basis_denominator = 0.0;
        assert_eq!(
            config.validate(),
            Err(InvalidParameterError::InvalidDayCountBasis(0.0))
        );
    }

    #[test]
    fn test_invalid_floor_rejected() {
        let config = PricingConfig {
            volatility_floor: -1.0,
            ..PricingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InvalidParameterError::InvalidFloor {
                name: "volatility",
                ..
            })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml() {
        let config = PricingConfig::from_toml_str(
            r#"
            expiry_policy = "intrinsic"
            cdf_method = "abramowitz_stegun"

            [calendar]
            theta_basis = "trading"
            day_count_basis_denominator = 252.0
            "#,
        )
        .unwrap();

        assert_eq!(config.expiry_policy, ExpiryPolicy::Intrinsic);
        assert_eq!(config.cdf_method, CdfMethod::AbramowitzStegun);
        assert_eq!(config.calendar, CalendarConvention::trading());
        assert_eq!(config.time_floor, 1e-6);
        assert_eq!(config.tolerances, ValidationTolerances::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_rejects_bad_basis() {
        let err = PricingConfig::from_toml_str("[calendar]\nday_count_basis_denominator = -5.0\n");
        assert!(err.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_missing_file() {
        let err = PricingConfig::from_file("does/not/exist.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read pricing config"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_basis_supplies_missing_denominator() {
        let config = PricingConfig::from_toml_str("[calendar]\ntheta_basis = \"trading\"\n").unwrap();
        assert_eq!(config.calendar, CalendarConvention::trading());

        let config = PricingConfig::from_toml_str("[calendar]\n").unwrap();
        assert_eq!(config.calendar, CalendarConvention::calendar());

        // an explicit denominator wins over the basis default
        let config = PricingConfig::from_toml_str(
            "[calendar]\ntheta_basis = \"trading\"\nday_count_basis_denominator = 365.0\n",
        )
        .unwrap();
        assert_eq!(config.calendar.day_count_basis_denominator, 365.0);
        assert_eq!(config.calendar.theta_basis, ThetaBasis::Trading);
        assert!(config.validate().is_ok());
    }
}
