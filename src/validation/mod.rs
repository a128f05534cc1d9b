//! Self-check layer: applies put-call parity, the pricing PDE, call/put symmetry and
//! a finite-difference cross-check to the engine's own output.
//!
//! Checks never modify a result and never fail a pricing call. Failures come back as
//! [`ConsistencyViolation`] values inside a [`ConsistencyReport`].

pub mod finite_difference;
pub mod identities;

pub use finite_difference::{finite_difference_check, FiniteDifferenceBumps};
pub use identities::{check_pde, check_put_call_parity, check_symmetry, discounted_legs};

use crate::config::{PricingConfig, ValidationTolerances};
use crate::contract::{Contract, OptionType};
use crate::error::{ConsistencyViolation, Identity, InvalidParameterError};
use crate::models::bs::{BsmEngine, GreeksResult};
use crate::models::normal::StandardNormal;
use crate::models::traits::NormalDistribution;

/// Result of one identity check.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CheckOutcome {
    pub identity: Identity,
    pub residual: f64,
    pub tolerance: f64,
    pub passed: bool,
}

impl CheckOutcome {
    pub fn new(identity: Identity, residual: f64, tolerance: f64) -> Self {
        Self {
            identity,
            residual,
            tolerance,
            passed: residual <= tolerance,
        }
    }

    fn from_check(identity: Identity, check: Result<f64, ConsistencyViolation>, tolerance: f64) -> Self {
        match check {
            Ok(residual) => Self::new(identity, residual, tolerance),
            Err(v) => Self {
                identity: v.identity,
                residual: v.residual,
                tolerance: v.tolerance,
                passed: false,
            },
        }
    }

    pub fn violation(&self) -> Option<ConsistencyViolation> {
        (!self.passed).then(|| ConsistencyViolation::new(self.identity, self.residual, self.tolerance))
    }
}

/// Every check run by [`Validator::audit`] with its residual.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsistencyReport {
    pub call: GreeksResult,
    pub put: GreeksResult,
    pub checks: Vec<CheckOutcome>,
}

impl ConsistencyReport {
    pub fn violations(&self) -> Vec<ConsistencyViolation> {
        self.checks.iter().filter_map(CheckOutcome::violation).collect()
    }

    pub fn is_consistent(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Outcome for one identity, if it was checked.
    pub fn outcome(&self, identity: Identity) -> Option<&CheckOutcome> {
        self.checks.iter().find(|c| c.identity == identity)
    }
}

/// Prices both exercise directions of a contract and audits the results.
#[derive(Debug, Clone)]
pub struct Validator<D = StandardNormal> {
    engine: BsmEngine<D>,
    tolerances: ValidationTolerances,
    bumps: FiniteDifferenceBumps,
    finite_differences: bool,
}

impl Validator<StandardNormal> {
    pub fn new(config: PricingConfig) -> Result<Self, InvalidParameterError> {
        Ok(Self::from_engine(BsmEngine::new(config)?))
    }
}

impl<D: NormalDistribution> Validator<D> {
    pub fn from_engine(engine: BsmEngine<D>) -> Self {
        let tolerances = engine.config().tolerances;
        Self {
            engine,
            tolerances,
            bumps: FiniteDifferenceBumps::default(),
            finite_differences: true,
        }
    }

    pub fn with_bumps(mut self, bumps: FiniteDifferenceBumps) -> Self {
        self.bumps = bumps;
        self
    }

    /// Turns the bump-and-reprice step on or off; it costs about 30 extra valuations.
    pub fn with_finite_differences(mut self, enabled: bool) -> Self {
        self.finite_differences = enabled;
        self
    }

    pub fn engine(&self) -> &BsmEngine<D> {
        &self.engine
    }

    /// Runs parity, PDE (call and put), symmetry and, if enabled, finite differences
    /// on the contract's own option type.
    pub fn audit(&self, contract: &Contract) -> Result<ConsistencyReport, InvalidParameterError> {
        let call_contract = contract.with_option_type(OptionType::Call);
        let put_contract = contract.with_option_type(OptionType::Put);
        let call = self.engine.price(&call_contract)?;
        let put = self.engine.price(&put_contract)?;
        let normalized = contract.normalize(self.engine.config())?;
        let tol = &self.tolerances;

        let mut checks = vec![
            CheckOutcome::from_check(
                Identity::PutCallParity,
                check_put_call_parity(&call, &put, &normalized, tol.parity),
                tol.parity,
            ),
            CheckOutcome::from_check(
                Identity::PdeResidual,
                check_pde(&call, &normalized, tol.pde),
                tol.pde,
            ),
            CheckOutcome::from_check(
                Identity::PdeResidual,
                check_pde(&put, &normalized, tol.pde),
                tol.pde,
            ),
        ];

        let asymmetric = check_symmetry(&call, &put);
        for identity in [Identity::GammaSymmetry, Identity::VegaSymmetry] {
            let residual = asymmetric
                .iter()
                .find(|v| v.identity == identity)
                .map_or(0.0, |v| v.residual);
            checks.push(CheckOutcome::new(identity, residual, 0.0));
        }

        if self.finite_differences {
            checks.extend(finite_difference_check(
                &self.engine,
                contract,
                &self.bumps,
                tol.finite_difference,
            )?);
        }

        for check in checks.iter().filter(|c| !c.passed) {
            tracing::warn!(
                identity = %check.identity,
                residual = check.residual,
                tolerance = check.tolerance,
                "consistency check failed"
            );
        }

        Ok(ConsistencyReport { call, put, checks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ForwardContract, OptionContract};
    use crate::error::Greek;

    #[test]
    fn test_canonical_audit_is_consistent() {
        let validator = Validator::new(PricingConfig::default()).unwrap();
        let contract = OptionContract::new(100.0, 100.0, 0.5, 0.2, 0.03, 0.01, OptionType::Call);
        let report = validator.audit(&contract.into()).unwrap();
        assert!(report.is_consistent(), "{:?}", report.violations());
        assert!(report.outcome(Identity::PutCallParity).unwrap().residual < 1e-8);
        assert!(report
            .outcome(Identity::FiniteDifference(Greek::Phi))
            .is_some());
    }

    #[test]
    fn test_forward_audit_skips_phi() {
        let validator = Validator::new(PricingConfig::default()).unwrap();
        let contract = ForwardContract::new(102.0, 0.97, 100.0, 1.0, 0.25, OptionType::Put);
        let report = validator.audit(&contract.into()).unwrap();
        assert!(report.is_consistent(), "{:?}", report.violations());
        assert!(report
            .outcome(Identity::FiniteDifference(Greek::Phi))
            .is_none());
        assert!(report
            .outcome(Identity::FiniteDifference(Greek::Rho))
            .is_some());
    }

    #[test]
    fn test_forward_audit_at_unit_discount_factor_checks_rho() {
        let validator = Validator::new(PricingConfig::default()).unwrap();
        let contract = ForwardContract::new(100.0, 1.0, 100.0, 1.0, 0.25, OptionType::Call);
        let report = validator.audit(&contract.into()).unwrap();
        assert!(report.is_consistent(), "{:?}", report.violations());
        let rho = report
            .outcome(Identity::FiniteDifference(Greek::Rho))
            .unwrap();
        assert!(rho.passed, "{:?}", rho);
    }

    #[test]
    fn test_violation_reporting() {
        let outcome = CheckOutcome::new(Identity::PdeResidual, 1e-3, 1e-6);
        assert!(!outcome.passed);
        let v = outcome.violation().unwrap();
        assert_eq!(v.identity, Identity::PdeResidual);
        assert!(CheckOutcome::new(Identity::PdeResidual, 0.0, 1e-6)
            .violation()
            .is_none());
    }

    #[test]
    fn test_without_finite_differences() {
        let validator = Validator::new(PricingConfig::default())
            .unwrap()
            .with_finite_differences(false);
        let contract = OptionContract::new(80.0, 100.0, 0.25, 0.35, 0.02, 0.03, OptionType::Put);
        let report = validator.audit(&contract.into()).unwrap();
        assert_eq!(report.checks.len(), 5);
        assert!(report.is_consistent());
    }
}
