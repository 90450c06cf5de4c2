use crate::core::error::SimulationError;
use crate::core::loan::{Loan, LoanId, LoanSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Decides which loan receives the surplus budget first.
///
/// Minimum payments are identical under every strategy; only the order in
/// which leftover money is applied differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Smallest balance first. Ties go to the higher rate, then to the id.
    Snowball,
    /// Highest rate first. Ties go to the smaller balance, then to the id.
    Avalanche,
    /// A caller-chosen order.
    Custom { label: String, order: Vec<LoanId> },
}

impl Strategy {
    pub fn label(&self) -> &str {
        match self {
            Strategy::Snowball => "Snowball",
            Strategy::Avalanche => "Avalanche",
            Strategy::Custom { label, .. } => label,
        }
    }

    /// Priority order over `loans`, computed from their initial balances.
    ///
    /// # Examples
    ///
    /// ```
    /// use repayment_engine::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let loans = LoanSet::from_loans([
    ///     Loan::new("A", dec!(500), dec!(0.025)).unwrap(),
    ///     Loan::new("B", dec!(750), dec!(0.05)).unwrap(),
    ///     Loan::new("C", dec!(1000), dec!(0.075)).unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// let names = |s: Strategy| -> Vec<String> {
    ///     s.order(&loans).iter().map(|id| id.to_string()).collect()
    /// };
    /// assert_eq!(names(Strategy::Snowball), ["A", "B", "C"]);
    /// assert_eq!(names(Strategy::Avalanche), ["C", "B", "A"]);
    /// ```
    pub fn order(&self, loans: &LoanSet) -> Vec<LoanId> {
        let compare: fn(&Loan, &Loan) -> Ordering = match self {
            Strategy::Snowball => |a, b| {
                a.balance()
                    .cmp(&b.balance())
                    .then_with(|| b.rate().cmp(&a.rate()))
                    .then_with(|| a.id().cmp(b.id()))
            },
            Strategy::Avalanche => |a, b| {
                b.rate()
                    .cmp(&a.rate())
                    .then_with(|| a.balance().cmp(&b.balance()))
                    .then_with(|| a.id().cmp(b.id()))
            },
            Strategy::Custom { order, .. } => return order.clone(),
        };

        let mut sorted: Vec<&Loan> = loans.iter().collect();
        sorted.sort_by(|a, b| compare(a, b));
        sorted.into_iter().map(|l| l.id().clone()).collect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = SimulationError;

    /// Parses the built-in strategy names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowball" => Ok(Strategy::Snowball),
            "avalanche" => Ok(Strategy::Avalanche),
            other => Err(SimulationError::invalid(format!(
                "unknown strategy '{other}' (expected snowball or avalanche)"
            ))),
        }
    }
}
