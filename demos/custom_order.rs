//! Custom payoff order with month-by-month output.
//!
//! Demonstrates streaming monthly snapshots from a run that pays loans in a
//! caller-chosen order.

use repayment_engine::core::loan::{Loan, LoanId, LoanSet};
use repayment_engine::core::precision::round_currency;
use repayment_engine::simulation::repayment::simulate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  repayment-engine: Custom Payoff Order    ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let loans = LoanSet::from_loans([
        Loan::new("CARD", dec!(1800), dec!(0.02)).expect("valid loan"),
        Loan::new("CAR", dec!(6500), dec!(0.005)).expect("valid loan"),
        Loan::new("STUDENT", dec!(4200), dec!(0.004)).expect("valid loan"),
    ])
    .expect("distinct ids");

    // Car first: the lender waives fees once it is cleared.
    let order = [
        LoanId::new("CAR"),
        LoanId::new("CARD"),
        LoanId::new("STUDENT"),
    ];

    println!("━━━ Monthly Schedule ━━━\n");
    let result = simulate(&order, &loans, dec!(50), dec!(900), "Car first", |snapshot| {
        if snapshot.month() <= 3 || snapshot.total_balance() == Some(Decimal::ZERO) {
            println!("{}", snapshot);
        } else if snapshot.month() == 4 {
            println!("...\n");
        }
    });

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("━━━ Summary ━━━\n");
    println!("  Months to payoff: {}", result.months_to_payoff());
    println!("  Total interest:   ${}", round_currency(result.total_interest_paid()));
    for (id, interest) in result.interest_by_loan() {
        println!("    {:<8} ${}", id, round_currency(*interest));
    }
}
