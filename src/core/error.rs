use crate::core::loan::LoanId;
use thiserror::Error;

/// Errors surfaced by the repayment engine.
///
/// Input problems are reported before the first simulated month runs, so a
/// failed call never produces a partial snapshot log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error(
        "priority order does not match the loan set (missing: [{}], unknown: [{}], duplicated: [{}])",
        join_ids(.missing),
        join_ids(.unknown),
        join_ids(.duplicated)
    )]
    OrderMismatch {
        missing: Vec<LoanId>,
        unknown: Vec<LoanId>,
        duplicated: Vec<LoanId>,
    },

    #[error("{label}: loans not paid off after {months} months")]
    NonConvergent { label: String, months: u32 },

    #[error("{label}: balance of loan {loan} left the decimal range in month {month}")]
    Overflow {
        label: String,
        month: u32,
        loan: LoanId,
    },
}

impl SimulationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

fn join_ids(ids: &[LoanId]) -> String {
    ids.iter()
        .map(LoanId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_mismatch_message_lists_ids() {
        let err = SimulationError::OrderMismatch {
            missing: vec![LoanId::new("C")],
            unknown: vec![LoanId::new("X"), LoanId::new("Y")],
            duplicated: vec![],
        };
        assert_eq!(
            err.to_string(),
            "priority order does not match the loan set (missing: [C], unknown: [X, Y], duplicated: [])"
        );
    }

    #[test]
    fn test_non_convergent_message() {
        let err = SimulationError::NonConvergent {
            label: "Snowball".into(),
            months: 120,
        };
        assert_eq!(err.to_string(), "Snowball: loans not paid off after 120 months");
    }
}
