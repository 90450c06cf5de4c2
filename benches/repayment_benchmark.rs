use criterion::{black_box, criterion_group, criterion_main, Criterion};
use repayment_engine::simulation::comparison::ExecutionMode;
use repayment_engine::simulation::generator::{generate_scenario, PortfolioConfig};
use repayment_engine::simulation::repayment::simulate;
use repayment_engine::simulation::strategy::Strategy;

fn bench_avalanche_5_loans(c: &mut Criterion) {
    let scenario = generate_scenario(&PortfolioConfig::default()).unwrap();
    let order = Strategy::Avalanche.order(&scenario.loans);

    c.bench_function("avalanche_5_loans", |b| {
        b.iter(|| {
            simulate(
                black_box(&order),
                black_box(&scenario.loans),
                scenario.min_payment,
                scenario.monthly_budget,
                "Avalanche",
                |_| {},
            )
        })
    });
}

fn bench_avalanche_50_loans(c: &mut Criterion) {
    let config = PortfolioConfig {
        loan_count: 50,
        ..Default::default()
    };
    let scenario = generate_scenario(&config).unwrap();
    let order = Strategy::Avalanche.order(&scenario.loans);

    c.bench_function("avalanche_50_loans", |b| {
        b.iter(|| {
            simulate(
                black_box(&order),
                black_box(&scenario.loans),
                scenario.min_payment,
                scenario.monthly_budget,
                "Avalanche",
                |_| {},
            )
        })
    });
}

fn bench_compare_sequential_vs_parallel(c: &mut Criterion) {
    let config = PortfolioConfig {
        loan_count: 20,
        ..Default::default()
    };
    let scenario = generate_scenario(&config).unwrap();

    c.bench_function("compare_20_loans_sequential", |b| {
        b.iter(|| black_box(&scenario).run(ExecutionMode::Sequential, |_| {}))
    });
    c.bench_function("compare_20_loans_parallel", |b| {
        b.iter(|| black_box(&scenario).run(ExecutionMode::Parallel, |_| {}))
    });
}

criterion_group!(
    benches,
    bench_avalanche_5_loans,
    bench_avalanche_50_loans,
    bench_compare_sequential_vs_parallel
);
criterion_main!(benches);
