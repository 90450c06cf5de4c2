//! repayment-engine CLI
//!
//! Compare loan payoff strategies from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Built-in three-loan scenario, month by month
//! repayment-engine simulate
//!
//! # Scenario file, summary as JSON
//! repayment-engine simulate --input loans.json --format json
//!
//! # Generate a random scenario that is guaranteed to pay off
//! repayment-engine generate --loans 6 --output loans.json
//! ```

use repayment_engine::core::precision::{round_currency, Precision, Rounding};
use repayment_engine::prelude::*;
use repayment_engine::simulation::generator::{generate_scenario, PortfolioConfig};
use rust_decimal::Decimal;
use std::fs;
use std::process;
use std::str::FromStr;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn print_usage() {
    eprintln!(
        r#"repayment-engine — compare snowball and avalanche loan payoff

USAGE:
    repayment-engine <COMMAND> [OPTIONS]

COMMANDS:
    simulate    Run the payoff strategies on a scenario
    generate    Generate a random scenario file
    help        Show this message

OPTIONS (simulate):
    --input <FILE>          Scenario JSON file (default: built-in three loans)
    --min-payment <AMOUNT>  Override the minimum payment
    --budget <AMOUNT>       Override the monthly budget
    --strategies <LIST>     Comma-separated: snowball,avalanche (default: both)
    --max-months <N>        Give up after N months (default: 100000)
    --precision <DIGITS>    Significant digits for balance arithmetic (default: 10)
    --format <FORMAT>       Output format: text (default) or json
    --sequential            Run strategies one after another (default for text)
    --parallel              Run strategies on separate threads (default for json)
    --delay-ms <N>          Pause between printed months (text format only)
    --quiet                 Print only the final results (text format only)

OPTIONS (generate):
    --loans <N>             Number of loans (default: 5)
    --surplus <AMOUNT>      Budget above the combined minimums (default: 500)
    --min-payment <AMOUNT>  Floor for the minimum payment (default: 25)
    --output <FILE>         Write to file instead of stdout

LOGGING:
    RUST_LOG=debug repayment-engine simulate    Log every simulated month

EXAMPLES:
    repayment-engine simulate --budget 300
    repayment-engine simulate --input loans.json --format json
    repayment-engine simulate --quiet --strategies avalanche
    repayment-engine generate --loans 8 --output loans.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn next_value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires a value", flag)))
}

fn parse_value<T: FromStr>(raw: &str, flag: &str) -> T
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .unwrap_or_else(|e| fail(format!("invalid value '{}' for {}: {}", raw, flag, e)))
}

fn load_scenario(path: &str) -> Scenario {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "loans": [
    {{ "id": "A", "balance": "500", "rate": "0.025" }}
  ],
  "min_payment": "5",
  "monthly_budget": "200"
}}"#
        );
        process::exit(1);
    })
}

/// JSON output schema for a strategy comparison.
#[derive(serde::Serialize)]
struct ReportOutput {
    results: Vec<ResultOutput>,
    best: Option<String>,
}

#[derive(serde::Serialize)]
struct ResultOutput {
    label: String,
    months_to_payoff: u32,
    total_interest_paid: String,
    total_paid: Option<String>,
    interest_by_loan: Vec<LoanInterestOutput>,
}

#[derive(serde::Serialize)]
struct LoanInterestOutput {
    id: String,
    interest: String,
}

fn report_output(report: &ComparisonReport) -> ReportOutput {
    ReportOutput {
        results: report
            .results()
            .iter()
            .map(|r| ResultOutput {
                label: r.label().to_string(),
                months_to_payoff: r.months_to_payoff(),
                total_interest_paid: round_currency(r.total_interest_paid()).to_string(),
                total_paid: r.total_paid().map(|p| round_currency(p).to_string()),
                interest_by_loan: r
                    .interest_by_loan()
                    .iter()
                    .map(|(id, interest)| LoanInterestOutput {
                        id: id.to_string(),
                        interest: round_currency(*interest).to_string(),
                    })
                    .collect(),
            })
            .collect(),
        best: report.best().map(|r| r.label().to_string()),
    }
}

fn cmd_simulate(args: &[String]) {
    let mut input_path = None;
    let mut min_payment: Option<Decimal> = None;
    let mut budget: Option<Decimal> = None;
    let mut strategies: Option<Vec<Strategy>> = None;
    let mut max_months: Option<u32> = None;
    let mut digits: Option<u32> = None;
    let mut format = "text".to_string();
    let mut mode: Option<ExecutionMode> = None;
    let mut delay_ms = 0u64;
    let mut quiet = false;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--input" => input_path = Some(next_value(args, &mut i, flag)),
            "--min-payment" => min_payment = Some(parse_value(&next_value(args, &mut i, flag), flag)),
            "--budget" => budget = Some(parse_value(&next_value(args, &mut i, flag), flag)),
            "--strategies" => {
                let list = next_value(args, &mut i, flag);
                strategies = Some(list.split(',').map(|s| parse_value(s, flag)).collect());
            }
            "--max-months" => max_months = Some(parse_value(&next_value(args, &mut i, flag), flag)),
            "--precision" => digits = Some(parse_value(&next_value(args, &mut i, flag), flag)),
            "--format" => format = next_value(args, &mut i, flag),
            "--sequential" => mode = Some(ExecutionMode::Sequential),
            "--parallel" => mode = Some(ExecutionMode::Parallel),
            "--delay-ms" => delay_ms = parse_value(&next_value(args, &mut i, flag), flag),
            "--quiet" => quiet = true,
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 1;
    }
    if format != "text" && format != "json" {
        fail(format!("--format must be 'text' or 'json', got '{}'", format));
    }
    let mode = mode.unwrap_or_else(|| default_mode(&format));

    let mut scenario = match &input_path {
        Some(path) => load_scenario(path),
        None => Scenario::builtin().unwrap_or_else(|e| fail(e)),
    };
    if let Some(value) = min_payment {
        scenario.min_payment = value;
    }
    if let Some(value) = budget {
        scenario.monthly_budget = value;
    }
    if let Some(value) = strategies {
        scenario.strategies = value;
    }
    if let Some(value) = max_months {
        scenario.config.max_months = value;
    }
    if let Some(value) = digits {
        scenario.config.precision =
            Precision::new(value, Rounding::HalfUp).unwrap_or_else(|e| fail(e));
    }

    if format == "json" {
        let report = scenario
            .run(mode, |_| {})
            .unwrap_or_else(|e| fail(e));
        let json = serde_json::to_string_pretty(&report_output(&report))
            .unwrap_or_else(|e| fail(e));
        println!("{}", json);
        return;
    }

    // Months are printed by a separate thread so a slow terminal or the
    // pacing delay never holds up the simulation.
    let (tx, rx) = mpsc::channel::<MonthlySnapshot>();
    let printer = thread::spawn(move || {
        for snapshot in rx {
            println!("{}", snapshot);
            if delay_ms > 0 {
                thread::sleep(Duration::from_millis(delay_ms));
            }
        }
    });

    let outcome = scenario.run(mode, move |snapshot| {
        if !quiet {
            // A closed receiver only means nobody is watching.
            let _ = tx.send(snapshot.clone());
        }
    });

    if printer.join().is_err() {
        fail("snapshot printer thread panicked");
    }

    match outcome {
        Ok(report) => {
            println!("{}", report);
            if let (Some(saved), Some(pct)) = (
                report.interest_saved("Snowball", "Avalanche"),
                report.interest_saved_percent("Snowball", "Avalanche"),
            ) {
                println!(
                    "Avalanche saves ${:.2} ({:.1}%) in interest over Snowball",
                    round_currency(saved),
                    pct
                );
            }
        }
        Err(e) => fail(e),
    }
}

/// Streamed text prints whole runs one after another, so it runs strategies
/// sequentially unless asked otherwise.
fn default_mode(format: &str) -> ExecutionMode {
    if format == "text" {
        ExecutionMode::Sequential
    } else {
        ExecutionMode::Parallel
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = PortfolioConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--loans" => config.loan_count = parse_value(&next_value(args, &mut i, flag), flag),
            "--surplus" => config.surplus = parse_value(&next_value(args, &mut i, flag), flag),
            "--min-payment" => {
                config.min_payment = parse_value(&next_value(args, &mut i, flag), flag)
            }
            "--output" => output_path = Some(next_value(args, &mut i, flag)),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 1;
    }

    let scenario = generate_scenario(&config).unwrap_or_else(|e| fail(e));
    let json = serde_json::to_string_pretty(&scenario).unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
        eprintln!(
            "Generated {} loans, minimum {}, budget {} → {}",
            scenario.loans.len(),
            scenario.min_payment,
            scenario.monthly_budget,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "simulate" => cmd_simulate(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
