use crate::core::error::Result;
use crate::core::loan::LoanSet;
use crate::core::precision::round_currency;
use crate::simulation::repayment::{SimulationResult, Simulator};
use crate::simulation::snapshot::MonthlySnapshot;
use crate::simulation::strategy::Strategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::thread;

/// How independent strategy runs are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One run after another, in the order given.
    Sequential,
    /// One scoped thread per strategy.
    #[default]
    Parallel,
}

/// Results of several strategies run over the same loans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    results: Vec<SimulationResult>,
}

impl ComparisonReport {
    /// Results in the order the strategies were given.
    pub fn results(&self) -> &[SimulationResult] {
        &self.results
    }

    pub fn get(&self, label: &str) -> Option<&SimulationResult> {
        self.results.iter().find(|r| r.label() == label)
    }

    /// The run with the least interest; fewer months breaks ties.
    pub fn best(&self) -> Option<&SimulationResult> {
        self.results.iter().min_by(|a, b| {
            a.total_interest_paid()
                .cmp(&b.total_interest_paid())
                .then_with(|| a.months_to_payoff().cmp(&b.months_to_payoff()))
        })
    }

    /// Interest `candidate` saves relative to `baseline` (negative if it costs more).
    pub fn interest_saved(&self, baseline: &str, candidate: &str) -> Option<Decimal> {
        let baseline = self.get(baseline)?;
        let candidate = self.get(candidate)?;
        Some(baseline.total_interest_paid() - candidate.total_interest_paid())
    }

    /// [`interest_saved`](Self::interest_saved) as a percentage of the baseline.
    pub fn interest_saved_percent(&self, baseline: &str, candidate: &str) -> Option<f64> {
        let saved = self.interest_saved(baseline, candidate)?;
        let base = self.get(baseline)?.total_interest_paid();
        if base == Decimal::ZERO {
            return Some(0.0);
        }
        let pct = saved * Decimal::from(100) / base;
        Some(pct.to_string().parse::<f64>().unwrap_or(0.0))
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Final Results ===")?;
        for result in &self.results {
            writeln!(
                f,
                "{} Method: {} months, Total Interest: ${:.2}",
                result.label(),
                result.months_to_payoff(),
                round_currency(result.total_interest_paid())
            )?;
        }
        if let Some(best) = self.best() {
            writeln!(f, "Best:  {}", best.label())?;
        }
        Ok(())
    }
}

impl Simulator {
    /// Run every strategy on its own copy of `loans`.
    ///
    /// `on_snapshot` receives the months of all runs; under
    /// [`ExecutionMode::Parallel`] months of different runs interleave, but
    /// each run's months still arrive in order. Results are identical in both
    /// modes. The first failing run's error is returned.
    pub fn compare<F>(
        &self,
        loans: &LoanSet,
        min_payment: Decimal,
        monthly_budget: Decimal,
        strategies: &[Strategy],
        mode: ExecutionMode,
        on_snapshot: F,
    ) -> Result<ComparisonReport>
    where
        F: Fn(&MonthlySnapshot) + Sync,
    {
        let on_snapshot = &on_snapshot;
        let run = |strategy: &Strategy| {
            let order = strategy.order(loans);
            self.simulate(
                &order,
                loans,
                min_payment,
                monthly_budget,
                strategy.label(),
                on_snapshot,
            )
        };

        let results = match mode {
            ExecutionMode::Sequential => strategies.iter().map(run).collect::<Result<Vec<_>>>()?,
            ExecutionMode::Parallel => thread::scope(|scope| {
                let handles: Vec<_> = strategies
                    .iter()
                    .map(|strategy| scope.spawn(move || run(strategy)))
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect::<Result<Vec<_>>>()
            })?,
        };

        Ok(ComparisonReport { results })
    }
}
