pub mod error;
pub mod ledger;
pub mod loan;
pub mod precision;
