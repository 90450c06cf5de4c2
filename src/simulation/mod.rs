pub mod comparison;
pub mod generator;
pub mod repayment;
pub mod scenario;
pub mod snapshot;
pub mod strategy;
