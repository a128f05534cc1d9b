// demos/pricing_demo.rs

//! Demonstration of closed-form pricing and the self-check layer
//!
//! This example shows how to:
//! 1. Price a small strike ladder in spot form
//! 2. Price the same contract in forward form
//! 3. Audit a result against parity, the pricing PDE and finite differences

use anyhow::Result;
use bsm_greeks::{
    default_configs, price_and_greeks_with_config, ContractBuilder, OptionContract, OptionType,
    Validator,
};

fn main() -> Result<()> {
    println!("BSM Pricing and Greeks Demo");
    println!("===========================");

    let config = default_configs::audit();
    let (spot, t, sigma, r, q) = (100.0, 0.5, 0.20, 0.03, 0.01);

    println!("\nStep 1: Strike ladder (S0={}, T={}, sigma={}, r={}, q={})", spot, t, sigma, r, q);
    println!(
        "{:<6} {:<8} {:>10} {:>9} {:>9} {:>10} {:>10} {:>10}",
        "Type", "Strike", "Price", "Delta", "Gamma", "Vega/pt", "Theta/d", "Rho/bp"
    );
    println!("{}", "-".repeat(80));

    for strike in [90.0, 95.0, 100.0, 105.0, 110.0] {
        for option_type in [OptionType::Call, OptionType::Put] {
            let contract = OptionContract::new(spot, strike, t, sigma, r, q, option_type);
            let g = price_and_greeks_with_config(contract, &config)?;
            println!(
                "{:<6} {:<8.1} {:>10.4} {:>9.4} {:>9.5} {:>10.4} {:>10.5} {:>10.5}",
                option_type,
                strike,
                g.price,
                g.delta,
                g.gamma,
                g.vega_per_vol_point,
                g.theta_per_day,
                g.rho_per_basis_point
            );
        }
    }

    println!("\nStep 2: Forward parametrization...");

    let spot_form = OptionContract::new(spot, 100.0, t, sigma, r, q, OptionType::Call);
    let forward = spot_form.to_forward()?;
    println!(
        "  F0 = {:.6}, DF = {:.6}",
        forward.forward, forward.discount_factor
    );

    let with_carry = price_and_greeks_with_config(forward, &config)?;
    let without_carry = price_and_greeks_with_config(
        bsm_greeks::ForwardContract {
            dividend_yield: None,
            ..forward
        },
        &config,
    )?;
    println!(
        "  with carry:    price {:.6}, delta {:.6} ({:?})",
        with_carry.price, with_carry.delta, with_carry.delta_convention
    );
    println!(
        "  without carry: price {:.6}, delta {:.6} ({:?})",
        without_carry.price, without_carry.delta, without_carry.delta_convention
    );

    println!("\nStep 3: Consistency audit...");

    let contract = ContractBuilder::new()
        .spot(spot)
        .strike(105.0)
        .time_to_expiry(t)
        .volatility(sigma)
        .risk_free_rate(r)
        .dividend_yield(q)
        .parse_option_type("put")
        .build()?;

    let report = Validator::new(config)?.audit(&contract)?;
    for check in &report.checks {
        println!(
            "  {:<28} residual {:>10.3e}  tolerance {:>8.1e}  {}",
            check.identity.to_string(),
            check.residual,
            check.tolerance,
            if check.passed { "ok" } else { "FAILED" }
        );
    }
    println!(
        "\nAudit {}",
        if report.is_consistent() {
            "passed"
        } else {
            "found violations"
        }
    );

    Ok(())
}
