//! # repayment-engine
//!
//! Debt repayment simulator comparing payoff orderings.
//!
//! Given a set of loans, a uniform minimum payment and a monthly budget, the
//! engine plays the schedule forward one month at a time until every balance
//! is zero, and reports how long it took and how much interest was paid.
//! Running the same loans under "snowball" (smallest balance first) and
//! "avalanche" (highest rate first) orderings shows what the choice costs.
//!
//! ## Architecture
//!
//! - **core** — Loans, exact-decimal precision, the mutable loan ledger, errors
//! - **simulation** — The monthly repayment loop, strategies, strategy
//!   comparison, scenario files and random portfolio generation

pub mod core;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::error::{Result, SimulationError};
    pub use crate::core::ledger::LoanLedger;
    pub use crate::core::loan::{Loan, LoanId, LoanSet};
    pub use crate::core::precision::{Precision, Rounding};
    pub use crate::simulation::comparison::{ComparisonReport, ExecutionMode};
    pub use crate::simulation::repayment::{simulate, SimulationConfig, SimulationResult, Simulator};
    pub use crate::simulation::scenario::Scenario;
    pub use crate::simulation::snapshot::{LoanActivity, MonthlySnapshot};
    pub use crate::simulation::strategy::Strategy;
}
