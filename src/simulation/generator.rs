use crate::core::error::{Result, SimulationError};
use crate::core::loan::{Loan, LoanSet};
use crate::simulation::scenario::Scenario;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a random loan portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    /// Number of loans.
    pub loan_count: usize,
    /// Smallest starting balance.
    pub min_balance: Decimal,
    /// Largest starting balance.
    pub max_balance: Decimal,
    /// Largest monthly rate, as a fraction.
    pub max_rate: Decimal,
    /// Floor for the uniform minimum payment.
    pub min_payment: Decimal,
    /// Budget on top of the combined minimum payments.
    pub surplus: Decimal,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            loan_count: 5,
            min_balance: Decimal::from(100),
            max_balance: Decimal::from(25_000),
            max_rate: Decimal::new(25, 3),
            min_payment: Decimal::from(25),
            surplus: Decimal::from(500),
        }
    }
}

/// Generate random loans with ids `L001`, `L002`, ...
///
/// Balances are whole cents, rates whole basis points.
pub fn generate_random_portfolio(config: &PortfolioConfig) -> Result<LoanSet> {
    let min_cents = to_units(config.min_balance, 2)?;
    let max_cents = to_units(config.max_balance, 2)?;
    let max_bps = to_units(config.max_rate, 4)?;
    if min_cents > max_cents {
        return Err(SimulationError::invalid(format!(
            "min_balance {} exceeds max_balance {}",
            config.min_balance, config.max_balance
        )));
    }
    if !(0..10_000).contains(&max_bps) {
        return Err(SimulationError::invalid(format!(
            "max_rate {} must be a fraction in [0, 1)",
            config.max_rate
        )));
    }

    let mut rng = rand::thread_rng();
    let mut loans = LoanSet::new();
    for i in 1..=config.loan_count {
        let balance = Decimal::new(rng.gen_range(min_cents..=max_cents), 2);
        let rate = Decimal::new(rng.gen_range(0..=max_bps), 4);
        loans.insert(Loan::new(format!("L{:03}", i), balance, rate)?)?;
    }
    Ok(loans)
}

/// A scenario that is guaranteed to pay off.
///
/// The minimum payment is raised above every loan's first-month interest, so
/// each balance shrinks every month even without surplus.
pub fn generate_scenario(config: &PortfolioConfig) -> Result<Scenario> {
    let loans = generate_random_portfolio(config)?;
    let min_payment = config.min_payment.max(converging_minimum(&loans));
    let monthly_budget = min_payment
        .checked_mul(Decimal::from(loans.len()))
        .and_then(|minimums| minimums.checked_add(config.surplus))
        .ok_or_else(|| {
            SimulationError::invalid(format!(
                "budget for {} loans at minimum {} plus surplus {} is out of range",
                loans.len(),
                min_payment,
                config.surplus
            ))
        })?;
    Ok(Scenario::new(loans, min_payment, monthly_budget))
}

/// Smallest whole-unit minimum payment that exceeds every loan's
/// first-month interest.
pub fn converging_minimum(loans: &LoanSet) -> Decimal {
    loans
        .iter()
        .map(|l| (l.balance() * l.rate()).ceil() + Decimal::ONE)
        .max()
        .unwrap_or(Decimal::ONE)
}

fn to_units(value: Decimal, scale: u32) -> Result<i64> {
    (value * Decimal::from(10i64.pow(scale)))
        .trunc()
        .to_i64()
        .ok_or_else(|| SimulationError::invalid(format!("{value} is out of range")))
}
