//! Matching Benchmarks — Clearing and Tick Throughput
//!
//! Benchmarks the book clearing loop and whole simulation ticks.
//!
//! Run with: cargo bench --bench matching_bench

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use prediction_market_sim::config::{BeliefInit, SimConfig};
use prediction_market_sim::domain::agent::Agent;
use prediction_market_sim::domain::bayesian::odds_update;
use prediction_market_sim::domain::market::Market;
use prediction_market_sim::domain::order::{AgentId, Order, Side};
use prediction_market_sim::domain::order_book::OrderBooks;
use prediction_market_sim::ports::observer::NoopObserver;
use prediction_market_sim::usecases::Simulation;
use prediction_market_sim::usecases::matching_engine::MatchingEngine;

/// 500 crossing pairs spread over 50 agents.
fn crossing_books() -> (OrderBooks, Market) {
    let market = Market::new(
        (0..50)
            .map(|i| Agent::new(AgentId(i), 0.5, 1.0, 0.9, Decimal::from(1000)))
            .collect(),
    );
    let mut books = OrderBooks::default();
    for seq in 0..500u64 {
        let cents = 50 + (seq % 40) as i64;
        let owner = AgentId((seq % 50) as usize);
        books.insert(Order::new(Side::For, Decimal::new(cents, 2), 2 * seq, owner));
        books.insert(Order::new(
            Side::Against,
            Decimal::new(100 - cents + 5, 2),
            2 * seq + 1,
            AgentId(49 - owner.0),
        ));
    }
    (books, market)
}

/// Benchmark a full clearing pass over a deep crossed book.
fn bench_clear(c: &mut Criterion) {
    c.bench_function("clear_500_pairs", |b| {
        b.iter_batched(
            crossing_books,
            |(mut books, mut market)| {
                MatchingEngine::new()
                    .clear(black_box(&mut books), black_box(&mut market))
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark the Bayesian odds update.
fn bench_odds_update(c: &mut Criterion) {
    c.bench_function("odds_update", |b| {
        b.iter(|| odds_update(black_box(0.62), black_box(0.667)));
    });
}

/// Benchmark a reference-size run with heterogeneous beliefs.
fn bench_run(c: &mut Criterion) {
    let mut config = SimConfig::default();
    config.simulation.seed = Some(1);
    config.agents.belief = BeliefInit::Uniform {
        low: 0.05,
        high: 0.95,
    };

    c.bench_function("run_50_agents_50_ticks", |b| {
        b.iter_batched(
            || Simulation::new(config.clone()),
            |sim| sim.map(|mut s| s.run(&mut NoopObserver)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_clear, bench_odds_update, bench_run);
criterion_main!(benches);
