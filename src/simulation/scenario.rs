use crate::core::error::Result;
use crate::core::loan::{Loan, LoanSet};
use crate::simulation::comparison::{ComparisonReport, ExecutionMode};
use crate::simulation::repayment::{SimulationConfig, Simulator};
use crate::simulation::snapshot::MonthlySnapshot;
use crate::simulation::strategy::Strategy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A complete simulation input: loans, payment terms and run settings.
///
/// JSON form:
///
/// ```json
/// {
///   "loans": [{ "id": "A", "balance": "500", "rate": "0.025" }],
///   "min_payment": "5",
///   "monthly_budget": "200",
///   "strategies": ["snowball", "avalanche"],
///   "config": { "max_months": 1200 }
/// }
/// ```
///
/// `strategies` and `config` are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub loans: LoanSet,
    pub min_payment: Decimal,
    pub monthly_budget: Decimal,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<Strategy>,
    #[serde(default)]
    pub config: SimulationConfig,
}

fn default_strategies() -> Vec<Strategy> {
    vec![Strategy::Snowball, Strategy::Avalanche]
}

impl Scenario {
    pub fn new(loans: LoanSet, min_payment: Decimal, monthly_budget: Decimal) -> Self {
        Self {
            loans,
            min_payment,
            monthly_budget,
            strategies: default_strategies(),
            config: SimulationConfig::default(),
        }
    }

    /// Three loans with a 5.00 minimum and a 200.00 budget.
    ///
    /// At a 100.00 budget these loans never pay off: the first month alone
    /// accrues 125.00 of interest.
    pub fn builtin() -> Result<Self> {
        let loans = LoanSet::from_loans([
            Loan::new("A", dec!(500), dec!(0.025))?,
            Loan::new("B", dec!(750), dec!(0.05))?,
            Loan::new("C", dec!(1000), dec!(0.075))?,
        ])?;
        Ok(Self::new(loans, dec!(5), dec!(200)))
    }

    /// Run every configured strategy.
    pub fn run<F>(&self, mode: ExecutionMode, on_snapshot: F) -> Result<ComparisonReport>
    where
        F: Fn(&MonthlySnapshot) + Sync,
    {
        Simulator::with_config(self.config).compare(
            &self.loans,
            self.min_payment,
            self.monthly_budget,
            &self.strategies,
            mode,
            on_snapshot,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loan::LoanId;

    #[test]
    fn test_builtin_scenario() {
        let scenario = Scenario::builtin().unwrap();
        assert_eq!(scenario.loans.len(), 3);
        assert_eq!(scenario.loans.total_balance(), Some(dec!(2250)));

        let report = scenario.run(ExecutionMode::Sequential, |_| {}).unwrap();
        assert_eq!(report.get("Snowball").unwrap().months_to_payoff(), 22);
        assert_eq!(report.get("Avalanche").unwrap().months_to_payoff(), 17);
    }

    #[test]
    fn test_parse_minimal_json() {
        let json = r#"{
            "loans": [
                {"id": "CARD", "balance": "1200.50", "rate": "0.02"},
                {"id": "CAR", "balance": "8000", "rate": "0.006"}
            ],
            "min_payment": "25",
            "monthly_budget": "400"
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();

        assert_eq!(scenario.loans.len(), 2);
        let card = scenario.loans.get(&LoanId::new("CARD")).unwrap();
        assert_eq!(card.balance(), dec!(1200.50));
        assert_eq!(scenario.strategies, default_strategies());
        assert_eq!(scenario.config, SimulationConfig::default());
    }

    #[test]
    fn test_parse_custom_strategy_and_config() {
        let json = r#"{
            "loans": [
                {"id": "A", "balance": "100", "rate": "0"},
                {"id": "B", "balance": "100", "rate": "0"}
            ],
            "min_payment": "0",
            "monthly_budget": "50",
            "strategies": ["avalanche", {"custom": {"label": "B first", "order": ["B", "A"]}}],
            "config": {"max_months": 12}
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.config.max_months, 12);

        let report = scenario.run(ExecutionMode::Parallel, |_| {}).unwrap();
        let custom = report.get("B first").unwrap();
        assert_eq!(custom.months_to_payoff(), 4);
        let first = &custom.snapshots()[0];
        assert_eq!(first.loan(&LoanId::new("B")).unwrap().payment_applied, dec!(50));
    }

    #[test]
    fn test_round_trips_through_json() {
        let scenario = Scenario::builtin().unwrap();
        let json = serde_json::to_string(&scenario).unwrap();
        let parsed: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scenario);
    }
}
