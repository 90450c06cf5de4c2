//! Month-by-month repayment simulation.
//!
//! Every simulated month runs the same three phases on a private copy of the
//! caller's loans:
//!
//! 1. Accrue interest on every active loan.
//! 2. Pay the uniform minimum on every active loan.
//! 3. Send whatever budget is left to loans in priority order.
//!
//! The priority order is the only thing that differs between strategies.

use crate::core::error::{Result, SimulationError};
use crate::core::ledger::{LoanAmounts, LoanLedger, MinimumPayments, OverflowError};
use crate::core::loan::{LoanId, LoanSet};
use crate::core::precision::{round_currency, Precision};
use crate::simulation::snapshot::MonthlySnapshot;
use log::{debug, info, log_enabled, warn, Level};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Tunables for a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Precision for balance and interest arithmetic.
    pub precision: Precision,
    /// Give up with [`SimulationError::NonConvergent`] after this many months.
    pub max_months: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            max_months: 100_000,
        }
    }
}

/// Final outcome of one strategy run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    run_id: Uuid,
    label: String,
    months_to_payoff: u32,
    total_interest_paid: Decimal,
    interest_by_loan: BTreeMap<LoanId, Decimal>,
    snapshots: Vec<MonthlySnapshot>,
}

impl SimulationResult {
    /// Identifier shared by all log lines of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn months_to_payoff(&self) -> u32 {
        self.months_to_payoff
    }

    /// Exact sum of all interest charged during the run.
    pub fn total_interest_paid(&self) -> Decimal {
        self.total_interest_paid
    }

    /// Interest charged per loan over the whole run.
    pub fn interest_by_loan(&self) -> &BTreeMap<LoanId, Decimal> {
        &self.interest_by_loan
    }

    /// Every month of the run, oldest first.
    pub fn snapshots(&self) -> &[MonthlySnapshot] {
        &self.snapshots
    }

    /// Everything paid over the run (principal plus interest).
    pub fn total_paid(&self) -> Option<Decimal> {
        self.snapshots
            .iter()
            .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.total_payment()?))
    }
}

/// Drives a [`LoanLedger`] through successive months until every loan is
/// paid off.
///
/// # Examples
///
/// ```
/// use repayment_engine::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let loans = LoanSet::from_loans([
///     Loan::new("A", dec!(300), dec!(0)).unwrap(),
///     Loan::new("B", dec!(200), dec!(0)).unwrap(),
/// ])
/// .unwrap();
///
/// let order = [LoanId::new("A"), LoanId::new("B")];
/// let result = Simulator::new()
///     .simulate(&order, &loans, dec!(10), dec!(50), "Snowball", |_| {})
///     .unwrap();
///
/// assert_eq!(result.months_to_payoff(), 10);
/// assert_eq!(result.total_interest_paid(), dec!(0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run one payoff schedule.
    ///
    /// `order` must list every loan id exactly once. `on_snapshot` sees each
    /// month as soon as it is computed, before this call returns. All input
    /// checks happen before the first month, so an error never follows a
    /// callback invocation unless the run itself fails to converge.
    pub fn simulate<F>(
        &self,
        order: &[LoanId],
        initial_loans: &LoanSet,
        min_payment: Decimal,
        monthly_budget: Decimal,
        label: &str,
        mut on_snapshot: F,
    ) -> Result<SimulationResult>
    where
        F: FnMut(&MonthlySnapshot),
    {
        self.config.precision.validate()?;
        validate_inputs(initial_loans, min_payment, monthly_budget)?;
        check_order(order, initial_loans)?;

        let run_id = Uuid::new_v4();
        let precision = self.config.precision;
        info!(
            "[{run_id}] {label}: {} loans, balance {}, minimum {}, budget {}",
            initial_loans.len(),
            display_total(initial_loans.total_balance()),
            min_payment,
            monthly_budget
        );

        let mut ledger = LoanLedger::new(initial_loans.clone(), precision);
        let mut interest_by_loan: BTreeMap<LoanId, Decimal> = initial_loans
            .ids()
            .map(|id| (id.clone(), Decimal::ZERO))
            .collect();
        let mut snapshots = Vec::new();
        let mut month = 0u32;

        while !ledger.is_fully_paid() {
            if month >= self.config.max_months {
                warn!(
                    "[{run_id}] {label}: balance {} outstanding after {month} months",
                    display_total(ledger.total_balance())
                );
                return Err(SimulationError::NonConvergent {
                    label: label.to_string(),
                    months: month,
                });
            }
            month += 1;
            let overflow = |e: OverflowError| {
                warn!("[{run_id}] {label}: {e} in month {month}");
                SimulationError::Overflow {
                    label: label.to_string(),
                    month,
                    loan: e.loan,
                }
            };

            let interest = ledger.accrue_interest().map_err(overflow)?;
            accumulate(&mut interest_by_loan, &interest, precision).map_err(overflow)?;

            let MinimumPayments {
                mut paid,
                remaining_budget,
            } = ledger
                .apply_minimum_payments(min_payment, monthly_budget)
                .map_err(overflow)?;
            ledger
                .apply_priority_payment(order, remaining_budget, &mut paid)
                .map_err(overflow)?;

            let snapshot = MonthlySnapshot::capture(month, label, &ledger, &interest, &paid);
            if log_enabled!(Level::Debug) {
                debug!(
                    "[{run_id}] {label} month {month}: paid {}, interest {}, balance {}",
                    display_total(snapshot.total_payment()),
                    display_total(snapshot.total_interest()),
                    display_total(snapshot.total_balance())
                );
            }
            on_snapshot(&snapshot);
            snapshots.push(snapshot);
        }

        let total_interest_paid = interest_by_loan
            .iter()
            .try_fold(Decimal::ZERO, |acc, (id, v)| {
                acc.checked_add(*v).ok_or_else(|| OverflowError { loan: id.clone() })
            })
            .map_err(|e| SimulationError::Overflow {
                label: label.to_string(),
                month,
                loan: e.loan,
            })?;

        info!(
            "[{run_id}] {label}: paid off in {month} months, total interest {}",
            round_currency(total_interest_paid)
        );

        Ok(SimulationResult {
            run_id,
            label: label.to_string(),
            months_to_payoff: month,
            total_interest_paid,
            interest_by_loan,
            snapshots,
        })
    }
}

fn display_total(total: Option<Decimal>) -> String {
    total.map_or_else(|| "out of range".to_string(), |t| t.to_string())
}

/// Run one payoff schedule with [`SimulationConfig::default`].
pub fn simulate<F>(
    order: &[LoanId],
    initial_loans: &LoanSet,
    min_payment: Decimal,
    monthly_budget: Decimal,
    label: &str,
    on_snapshot: F,
) -> Result<SimulationResult>
where
    F: FnMut(&MonthlySnapshot),
{
    Simulator::new().simulate(
        order,
        initial_loans,
        min_payment,
        monthly_budget,
        label,
        on_snapshot,
    )
}

fn accumulate(
    totals: &mut BTreeMap<LoanId, Decimal>,
    amounts: &LoanAmounts,
    precision: Precision,
) -> std::result::Result<(), OverflowError> {
    for (id, amount) in amounts {
        let total = totals.entry(id.clone()).or_insert(Decimal::ZERO);
        *total = precision
            .add(*total, *amount)
            .ok_or_else(|| OverflowError { loan: id.clone() })?;
    }
    Ok(())
}

fn validate_inputs(loans: &LoanSet, min_payment: Decimal, monthly_budget: Decimal) -> Result<()> {
    loans.validate()?;
    if min_payment < Decimal::ZERO {
        return Err(SimulationError::invalid(format!(
            "minimum payment must not be negative, got {min_payment}"
        )));
    }
    if monthly_budget < Decimal::ZERO {
        return Err(SimulationError::invalid(format!(
            "monthly budget must not be negative, got {monthly_budget}"
        )));
    }

    let required = Decimal::from(loans.active_count())
        .checked_mul(min_payment)
        .ok_or_else(|| SimulationError::invalid("minimum payments exceed the decimal range"))?;
    if monthly_budget < required {
        return Err(SimulationError::invalid(format!(
            "monthly budget {monthly_budget} does not cover minimum payments of {required}"
        )));
    }
    Ok(())
}

/// The priority order must be a permutation of the loan ids.
fn check_order(order: &[LoanId], loans: &LoanSet) -> Result<()> {
    let mut seen = BTreeSet::new();
    let mut duplicated = BTreeSet::new();
    let mut unknown = BTreeSet::new();

    for id in order {
        if !loans.contains(id) {
            unknown.insert(id.clone());
        } else if !seen.insert(id) {
            duplicated.insert(id.clone());
        }
    }
    let missing: Vec<LoanId> = loans.ids().filter(|id| !seen.contains(id)).cloned().collect();

    if missing.is_empty() && unknown.is_empty() && duplicated.is_empty() {
        return Ok(());
    }
    Err(SimulationError::OrderMismatch {
        missing,
        unknown: unknown.into_iter().collect(),
        duplicated: duplicated.into_iter().collect(),
    })
}
