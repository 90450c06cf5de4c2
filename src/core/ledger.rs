use crate::core::loan::{LoanId, LoanSet};
use crate::core::precision::Precision;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-loan amounts for one month, in id order.
pub type LoanAmounts = BTreeMap<LoanId, Decimal>;

/// A ledger operation pushed a loan outside the representable decimal range.
///
/// Only divergent schedules get here: balances that compound for hundreds of
/// months without being paid down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decimal overflow on loan {loan}")]
pub struct OverflowError {
    pub loan: LoanId,
}

/// Outcome of the minimum-payment phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimumPayments {
    /// Amount actually paid to each loan (zero for settled loans).
    pub paid: LoanAmounts,
    /// Budget left for the priority phase.
    pub remaining_budget: Decimal,
}

/// Mutable bookkeeping for one loan set over one simulation run.
///
/// Balance and interest arithmetic is rounded with the ledger's
/// [`Precision`]. Budget tallies and payment totals are exact, so the
/// amount paid in a month can never exceed the budget through rounding.
///
/// This is a deliberate departure from rounding the running budget at the
/// ledger precision too. The two only disagree when an amount carries more
/// significant digits than the precision keeps: with a 10-digit precision,
/// paying off a 1.234567891 loan from a 1000000 budget leaves exactly
/// 999998.765432109 for the next loan here, where a rounded tally would
/// leave 999998.7654.
///
/// A month is always processed in three steps: [`accrue_interest`],
/// [`apply_minimum_payments`], then [`apply_priority_payment`].
///
/// [`accrue_interest`]: LoanLedger::accrue_interest
/// [`apply_minimum_payments`]: LoanLedger::apply_minimum_payments
/// [`apply_priority_payment`]: LoanLedger::apply_priority_payment
#[derive(Debug, Clone)]
pub struct LoanLedger {
    loans: LoanSet,
    precision: Precision,
}

impl LoanLedger {
    /// Take ownership of a loan set. Callers pass a copy of their initial
    /// state; the ledger mutates it in place.
    pub fn new(loans: LoanSet, precision: Precision) -> Self {
        Self { loans, precision }
    }

    pub fn loans(&self) -> &LoanSet {
        &self.loans
    }

    pub fn into_loans(self) -> LoanSet {
        self.loans
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn balance(&self, id: &LoanId) -> Option<Decimal> {
        self.loans.get(id).map(|l| l.balance())
    }

    pub fn total_balance(&self) -> Option<Decimal> {
        self.loans.total_balance()
    }

    /// Add one period of interest to every active loan.
    ///
    /// Returns the interest charged per loan; settled loans report zero.
    pub fn accrue_interest(&mut self) -> Result<LoanAmounts, OverflowError> {
        let precision = self.precision;
        let mut accrued = LoanAmounts::new();

        for loan in self.loans.iter_mut() {
            let interest = if loan.is_active() {
                let overflow = || OverflowError {
                    loan: loan.id().clone(),
                };
                let interest = precision
                    .mul(loan.balance(), loan.rate())
                    .ok_or_else(overflow)?;
                let balance = precision
                    .add(loan.balance(), interest)
                    .ok_or_else(overflow)?;
                loan.set_balance(balance);
                interest
            } else {
                Decimal::ZERO
            };
            accrued.insert(loan.id().clone(), interest);
        }

        Ok(accrued)
    }

    /// Pay `min(balance, min_payment)` on every active loan out of `budget`.
    ///
    /// The remaining budget is `budget` minus everything paid here. Callers
    /// are expected to supply a budget that covers the minimums.
    pub fn apply_minimum_payments(
        &mut self,
        min_payment: Decimal,
        budget: Decimal,
    ) -> Result<MinimumPayments, OverflowError> {
        let precision = self.precision;
        let mut paid = LoanAmounts::new();
        let mut remaining = budget;

        for loan in self.loans.iter_mut() {
            let payment = if loan.is_active() {
                let payment = loan.balance().min(min_payment);
                let balance = precision
                    .sub(loan.balance(), payment)
                    .ok_or_else(|| OverflowError {
                        loan: loan.id().clone(),
                    })?;
                loan.set_balance(balance);
                remaining -= payment;
                payment
            } else {
                Decimal::ZERO
            };
            paid.insert(loan.id().clone(), payment);
        }

        Ok(MinimumPayments {
            paid,
            remaining_budget: remaining,
        })
    }

    /// Direct `remaining_budget` to loans in `order`, each receiving up to its
    /// full balance before the next one sees anything.
    ///
    /// Amounts paid are added to `payments`. Ids in `order` that are not in
    /// the ledger are skipped, and loans missing from `order` receive nothing.
    /// Returns the budget left over, which is only non-zero once every loan
    /// in `order` is settled.
    pub fn apply_priority_payment(
        &mut self,
        order: &[LoanId],
        remaining_budget: Decimal,
        payments: &mut LoanAmounts,
    ) -> Result<Decimal, OverflowError> {
        let precision = self.precision;
        let mut remaining = remaining_budget;

        for id in order {
            if remaining <= Decimal::ZERO {
                break;
            }
            let Some(loan) = self.loans.get_mut(id) else {
                continue;
            };
            if !loan.is_active() {
                continue;
            }

            let payment = loan.balance().min(remaining);
            let balance = precision
                .sub(loan.balance(), payment)
                .ok_or_else(|| OverflowError { loan: id.clone() })?;
            loan.set_balance(balance);
            remaining -= payment;
            *payments.entry(id.clone()).or_insert(Decimal::ZERO) += payment;
        }

        Ok(remaining)
    }

    /// True once every balance is exactly zero.
    pub fn is_fully_paid(&self) -> bool {
        self.loans.iter().all(|l| l.balance().is_zero())
    }
}
