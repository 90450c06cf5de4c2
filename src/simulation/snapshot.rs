use crate::core::ledger::{LoanAmounts, LoanLedger};
use crate::core::loan::LoanId;
use crate::core::precision::{checked_sum, round_currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One loan's line in a monthly snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanActivity {
    pub id: LoanId,
    /// Balance after the month's interest and payments.
    pub balance_after: Decimal,
    /// Interest charged this month.
    pub interest_accrued: Decimal,
    /// Minimum plus priority payment applied this month.
    pub payment_applied: Decimal,
}

/// Immutable record of a single simulated month across all loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    month: u32,
    label: String,
    loans: Vec<LoanActivity>,
}

impl MonthlySnapshot {
    /// Capture the ledger state at the end of `month`.
    pub(crate) fn capture(
        month: u32,
        label: &str,
        ledger: &LoanLedger,
        interest: &LoanAmounts,
        payments: &LoanAmounts,
    ) -> Self {
        let loans = ledger
            .loans()
            .iter()
            .map(|loan| LoanActivity {
                id: loan.id().clone(),
                balance_after: loan.balance(),
                interest_accrued: interest.get(loan.id()).copied().unwrap_or(Decimal::ZERO),
                payment_applied: payments.get(loan.id()).copied().unwrap_or(Decimal::ZERO),
            })
            .collect();

        Self {
            month,
            label: label.to_string(),
            loans,
        }
    }

    /// 1-based month index.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Per-loan activity in id order.
    pub fn loans(&self) -> &[LoanActivity] {
        &self.loans
    }

    pub fn loan(&self, id: &LoanId) -> Option<&LoanActivity> {
        self.loans.iter().find(|l| &l.id == id)
    }

    /// Totals are `None` when the sum leaves the decimal range, which a
    /// diverging run can reach before any single balance does.
    pub fn total_balance(&self) -> Option<Decimal> {
        checked_sum(self.loans.iter().map(|l| l.balance_after))
    }

    pub fn total_interest(&self) -> Option<Decimal> {
        checked_sum(self.loans.iter().map(|l| l.interest_accrued))
    }

    pub fn total_payment(&self) -> Option<Decimal> {
        checked_sum(self.loans.iter().map(|l| l.payment_applied))
    }

    fn write_row(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        pick: fn(&LoanActivity) -> Decimal,
    ) -> fmt::Result {
        let cells: Vec<String> = self
            .loans
            .iter()
            .map(|l| format!("{}: ${:.2}", l.id, round_currency(pick(l))))
            .collect();
        writeln!(f, "  {:<9} {}", name, cells.join(" | "))
    }
}

impl fmt::Display for MonthlySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - Month {}:", self.label, self.month)?;
        self.write_row(f, "Balances", |l| l.balance_after)?;
        self.write_row(f, "Interest", |l| l.interest_accrued)?;
        self.write_row(f, "Payments", |l| l.payment_applied)
    }
}
