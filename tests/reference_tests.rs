
use approx::assert_relative_eq;
use bsm_greeks::{
    price_and_greeks, price_and_greeks_with_config, BsmEngine, CalendarConvention, CdfMethod, Contract,
    OptionContract, OptionType, PricingConfig,
};
use test_utils::{load_reference_data, REFERENCE_DATA};

/// Every fixture row must match the closed form computed independently.
#[test]
fn test_reference_fixture() {
    let rows = load_reference_data(REFERENCE_DATA).expect("Failed to load reference data");
    assert_eq!(rows.len(), 8);

    let engine = BsmEngine::new(PricingConfig::default()).unwrap();
    for row in &rows {
        let contract = row.contract().unwrap();
        let r = engine.price(&contract.into()).unwrap();
        let tag = format!("{:?}", row);
        assert_eq!(r.option_type, contract.option_type, "{}", tag);
        assert_relative_eq!(r.price, row.price, max_relative = 1e-9);
        assert_relative_eq!(r.delta, row.delta, max_relative = 1e-9);
        assert_relative_eq!(r.gamma, row.gamma, max_relative = 1e-9);
        assert_relative_eq!(r.vega_per_vol, row.vega, max_relative = 1e-9);
        assert_relative_eq!(r.theta_per_year, row.theta, max_relative = 1e-9);
        assert_relative_eq!(r.rho_per_1, row.rho, max_relative = 1e-9);
        assert_relative_eq!(r.phi_per_1, row.phi, max_relative = 1e-9);
    }
}

#[test]
fn test_reference_fixture_with_alternative_evaluators() {
    let rows = load_reference_data(REFERENCE_DATA).expect("Failed to load reference data");

    let statrs = BsmEngine::new(PricingConfig::default().with_cdf_method(CdfMethod::Statrs)).unwrap();
    let approx =
        BsmEngine::new(PricingConfig::default().with_cdf_method(CdfMethod::AbramowitzStegun))
            .unwrap();

    for row in &rows {
        let contract: Contract = row.contract().unwrap().into();

        let r = statrs.price(&contract).unwrap();
        assert_relative_eq!(r.price, row.price, max_relative = 1e-8);
        assert_relative_eq!(r.delta, row.delta, max_relative = 1e-8);

        // 1.5e-7 absolute on N(x), scaled by the legs
        let r = approx.price(&contract).unwrap();
        let scale = row.spot.max(row.strike);
        assert!((r.price - row.price).abs() < 1e-6 * scale, "{:?}", row);
        assert!((r.delta - row.delta).abs() < 1e-6, "{:?}", row);
    }
}

/// Canonical contract: 6 significant digits on every Greek and parity on the put.
#[test]
fn test_canonical_scenario() {
    let call = OptionContract::new(100.0, 100.0, 0.5, 0.20, 0.03, 0.01, OptionType::Call);
    let c = price_and_greeks(call, &CalendarConvention::calendar()).unwrap();
    let p = price_and_greeks(call.with_option_type(OptionType::Put), &CalendarConvention::calendar())
        .unwrap();

    assert_relative_eq!(c.price, 6.09012722371, max_relative = 1e-6);
    assert_relative_eq!(c.delta, 0.553457242039, max_relative = 1e-6);
    assert_relative_eq!(c.gamma, 0.0277894947476, max_relative = 1e-6);
    assert_relative_eq!(c.vega_per_vol, 27.7894947476, max_relative = 1e-6);
    assert_relative_eq!(c.theta_per_year, -6.48210961689, max_relative = 1e-6);
    assert_relative_eq!(c.rho_per_1, 24.6277984901, max_relative = 1e-6);
    assert_relative_eq!(c.phi_per_1, -27.6728621019, max_relative = 1e-6);

    let parity = 100.0 * (-0.01_f64 * 0.5).exp() - 100.0 * (-0.03_f64 * 0.5).exp();
    assert!((c.price - p.price - parity).abs() < 1e-8);
}

#[test]
fn test_unit_conversions() {
    let call = OptionContract::new(100.0, 100.0, 0.5, 0.20, 0.03, 0.01, OptionType::Call);

    let calendar = price_and_greeks(call, &CalendarConvention::calendar()).unwrap();
    assert_relative_eq!(calendar.vega_per_vol_point, 0.277894947476, max_relative = 1e-9);
    assert_relative_eq!(calendar.theta_per_day, -6.48210961689 / 365.0, max_relative = 1e-9);
    assert_relative_eq!(calendar.rho_per_basis_point, 24.6277984901e-4, max_relative = 1e-9);
    assert_relative_eq!(calendar.phi_per_basis_point, -27.6728621019e-4, max_relative = 1e-9);

    let trading = price_and_greeks(call, &CalendarConvention::trading()).unwrap();
    assert_eq!(trading.theta_per_year, calendar.theta_per_year);
    assert_relative_eq!(trading.theta_per_day, -6.48210961689 / 252.0, max_relative = 1e-9);

    // any positive denominator is accepted
    let custom = CalendarConvention {
        day_count_basis_denominator: 360.0,
        ..CalendarConvention::calendar()
    };
    let r = price_and_greeks(call, &custom).unwrap();
    assert_eq!(r.theta_per_day, r.theta_per_year / 360.0);
}

#[test]
fn test_higher_order_greeks() {
    let call = OptionContract::new(105.0, 100.0, 0.75, 0.25, 0.03, 0.01, OptionType::Call);
    let r = price_and_greeks_with_config(call, &PricingConfig::audit()).unwrap();
    let put = price_and_greeks_with_config(call.with_option_type(OptionType::Put), &PricingConfig::audit())
        .unwrap();

    // vanna and vomma do not depend on the exercise direction
    assert_eq!(r.vanna, put.vanna);
    assert_eq!(r.vomma, put.vomma);

    let t: f64 = 0.75;
    let sigma = 0.25;
    let sqrt_t = t.sqrt();
    let d1 = ((105.0_f64 / 100.0).ln() + (0.03 - 0.01 + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
    let d2 = d1 - sigma * sqrt_t;
    let n_d1 = (-0.5 * d1 * d1).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let carry = (-0.01 * t).exp();
    assert_relative_eq!(r.vanna.unwrap(), -carry * n_d1 * d2 / sigma, max_relative = 1e-10);
    assert_relative_eq!(r.vomma.unwrap(), r.vega_per_vol * d1 * d2 / sigma, max_relative = 1e-10);
}
