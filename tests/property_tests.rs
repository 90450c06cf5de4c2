use proptest::prelude::*;
use repayment_engine::core::loan::{Loan, LoanId, LoanSet};
use repayment_engine::simulation::repayment::{simulate, SimulationResult};
use repayment_engine::simulation::strategy::Strategy as Payoff;
use rust_decimal::Decimal;

/// A single loan: balance 0.01 to 10,000.00, monthly rate 0% to 3%.
fn arb_terms() -> impl Strategy<Value = (Decimal, Decimal)> {
    (1i64..=1_000_000, 0i64..=300).prop_map(|(cents, bps)| (Decimal::new(cents, 2), Decimal::new(bps, 4)))
}

/// A loan set of 1..6 loans with ids L0, L1, ...
fn arb_loans() -> impl Strategy<Value = LoanSet> {
    prop::collection::vec(arb_terms(), 1..6).prop_map(|terms| {
        LoanSet::from_loans(
            terms
                .into_iter()
                .enumerate()
                .map(|(i, (balance, rate))| Loan::new(format!("L{i}"), balance, rate).unwrap()),
        )
        .unwrap()
    })
}

/// Smallest whole minimum payment that beats every loan's first-month
/// interest, so every run is guaranteed to finish.
fn converging_minimum(loans: &LoanSet) -> Decimal {
    loans
        .iter()
        .map(|l| (l.balance() * l.rate()).ceil() + Decimal::ONE)
        .max()
        .unwrap_or(Decimal::ONE)
}

/// Loans plus a minimum payment and budget under which they pay off.
fn arb_converging() -> impl Strategy<Value = (LoanSet, Decimal, Decimal)> {
    (arb_loans(), 0i64..50, 0i64..100_000).prop_map(|(loans, extra_min, surplus_cents)| {
        let min_payment = converging_minimum(&loans) + Decimal::from(extra_min);
        let budget = min_payment * Decimal::from(loans.len()) + Decimal::new(surplus_cents, 2);
        (loans, min_payment, budget)
    })
}

fn run(strategy: &Payoff, loans: &LoanSet, min_payment: Decimal, budget: Decimal) -> SimulationResult {
    simulate(
        &strategy.order(loans),
        loans,
        min_payment,
        budget,
        strategy.label(),
        |_| {},
    )
    .unwrap()
}

proptest! {
    // ===================================================================
    // INVARIANT 1: A month never spends more than the budget.
    //
    // Minimum and priority payments together are bounded by the monthly
    // budget, exactly, in every month of every run.
    // ===================================================================
    #[test]
    fn payments_never_exceed_budget((loans, min, budget) in arb_converging()) {
        for strategy in [Payoff::Snowball, Payoff::Avalanche] {
            let result = run(&strategy, &loans, min, budget);
            for snapshot in result.snapshots() {
                let paid = snapshot.total_payment().unwrap();
                prop_assert!(
                    paid <= budget,
                    "month {} paid {} against budget {}",
                    snapshot.month(), paid, budget
                );
            }
        }
    }

    // ===================================================================
    // INVARIANT 2: Balances never go negative and never grow.
    //
    // With a minimum above every loan's interest, each balance strictly
    // shrinks until it hits zero, and a paid-off loan stays paid off with
    // no further interest or payments.
    // ===================================================================
    #[test]
    fn balances_shrink_to_zero_and_stay_there((loans, min, budget) in arb_converging()) {
        let result = run(&Payoff::Avalanche, &loans, min, budget);

        for loan in loans.iter() {
            let mut previous = loan.balance();
            let mut paid_off = previous.is_zero();
            for snapshot in result.snapshots() {
                let activity = snapshot.loan(loan.id()).unwrap();
                prop_assert!(activity.balance_after >= Decimal::ZERO);
                prop_assert!(activity.payment_applied >= Decimal::ZERO);
                if paid_off {
                    prop_assert_eq!(activity.balance_after, Decimal::ZERO);
                    prop_assert_eq!(activity.interest_accrued, Decimal::ZERO);
                    prop_assert_eq!(activity.payment_applied, Decimal::ZERO);
                } else {
                    prop_assert!(activity.balance_after < previous);
                }
                previous = activity.balance_after;
                paid_off = previous.is_zero();
            }
            prop_assert!(paid_off, "loan {} still owes {}", loan.id(), previous);
        }
    }

    // ===================================================================
    // INVARIANT 3: Months are numbered 1..=n without gaps, and the
    // reported total interest is the sum of the per-loan totals.
    // ===================================================================
    #[test]
    fn run_bookkeeping_is_consistent((loans, min, budget) in arb_converging()) {
        let result = run(&Payoff::Snowball, &loans, min, budget);

        let months: Vec<u32> = result.snapshots().iter().map(|s| s.month()).collect();
        prop_assert_eq!(months, (1..=result.months_to_payoff()).collect::<Vec<_>>());

        let sum: Decimal = result.interest_by_loan().values().copied().sum();
        prop_assert_eq!(sum, result.total_interest_paid());

        let ids: Vec<&LoanId> = result.interest_by_loan().keys().collect();
        prop_assert_eq!(ids, loans.ids().collect::<Vec<_>>());
    }

    // ===================================================================
    // INVARIANT 4: Interest-free loans cost nothing and finish in
    // ceil(total / budget) months, whatever the order.
    // ===================================================================
    #[test]
    fn zero_rate_loans_finish_in_ceil_months(
        cents in prop::collection::vec(1i64..=1_000_000, 1..6),
        budget_cents in 10_000i64..=500_000,
    ) {
        let loans = LoanSet::from_loans(
            cents
                .iter()
                .enumerate()
                .map(|(i, c)| Loan::new(format!("L{i}"), Decimal::new(*c, 2), Decimal::ZERO).unwrap()),
        )
        .unwrap();
        let budget = Decimal::new(budget_cents, 2);
        let total = loans.total_balance().unwrap();
        let expected = (total / budget).ceil();

        for strategy in [Payoff::Snowball, Payoff::Avalanche] {
            let result = run(&strategy, &loans, Decimal::ZERO, budget);
            prop_assert_eq!(result.total_interest_paid(), Decimal::ZERO);
            prop_assert_eq!(Decimal::from(result.months_to_payoff()), expected);
            prop_assert_eq!(result.total_paid(), Some(total));
        }
    }

    // ===================================================================
    // INVARIANT 5: With two loans at different rates, paying the higher
    // rate first never costs more interest than paying the smaller
    // balance first.
    // ===================================================================
    #[test]
    fn avalanche_never_costs_more_for_two_loans(
        a in arb_terms(),
        b in arb_terms(),
        extra_min in 0i64..50,
        surplus_cents in 0i64..100_000,
    ) {
        prop_assume!(a.1 != b.1);
        let loans = LoanSet::from_loans([
            Loan::new("A", a.0, a.1).unwrap(),
            Loan::new("B", b.0, b.1).unwrap(),
        ])
        .unwrap();
        let min = converging_minimum(&loans) + Decimal::from(extra_min);
        let budget = min * Decimal::TWO + Decimal::new(surplus_cents, 2);

        let snowball = run(&Payoff::Snowball, &loans, min, budget);
        let avalanche = run(&Payoff::Avalanche, &loans, min, budget);
        prop_assert!(
            avalanche.total_interest_paid() <= snowball.total_interest_paid(),
            "avalanche {} > snowball {}",
            avalanche.total_interest_paid(), snowball.total_interest_paid()
        );
    }

    // ===================================================================
    // INVARIANT 6: No loan outlives its minimum-only payoff time.
    //
    // Each balance falls by at least (minimum - first-month interest)
    // every month, so the run ends within the slowest such payoff.
    // ===================================================================
    #[test]
    fn payoff_within_minimum_only_bound((loans, min, budget) in arb_converging()) {
        let bound = loans
            .iter()
            .map(|l| (l.balance() / (min - l.balance() * l.rate())).ceil())
            .max()
            .unwrap_or(Decimal::ZERO);

        for strategy in [Payoff::Snowball, Payoff::Avalanche] {
            let result = run(&strategy, &loans, min, budget);
            prop_assert!(
                Decimal::from(result.months_to_payoff()) <= bound,
                "{} took {} months, bound {}",
                strategy, result.months_to_payoff(), bound
            );
        }
    }

    // ===================================================================
    // INVARIANT 7: Runs are deterministic.
    //
    // The same loans, terms and order always produce identical months.
    // ===================================================================
    #[test]
    fn identical_inputs_identical_runs((loans, min, budget) in arb_converging()) {
        let first = run(&Payoff::Avalanche, &loans, min, budget);
        let second = run(&Payoff::Avalanche, &loans, min, budget);
        prop_assert_eq!(first.months_to_payoff(), second.months_to_payoff());
        prop_assert_eq!(first.total_interest_paid(), second.total_interest_paid());
        prop_assert_eq!(first.snapshots(), second.snapshots());
    }

    // ===================================================================
    // INVARIANT 8: Strategy orders are permutations sorted by their key.
    // ===================================================================
    #[test]
    fn strategy_orders_are_sorted_permutations(loans in arb_loans()) {
        let snowball = Payoff::Snowball.order(&loans);
        let avalanche = Payoff::Avalanche.order(&loans);
        prop_assert_eq!(snowball.len(), loans.len());
        prop_assert_eq!(avalanche.len(), loans.len());

        let balance = |id: &LoanId| loans.get(id).unwrap().balance();
        let rate = |id: &LoanId| loans.get(id).unwrap().rate();
        for pair in snowball.windows(2) {
            prop_assert!(balance(&pair[0]) <= balance(&pair[1]));
        }
        for pair in avalanche.windows(2) {
            prop_assert!(rate(&pair[0]) >= rate(&pair[1]));
        }

        let mut sorted = snowball.clone();
        sorted.sort();
        prop_assert_eq!(sorted, loans.ids().cloned().collect::<Vec<_>>());
    }
}
