use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use matchbook::{MatchingEngine, Order, OrderId, Side};

fn bench_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_workload");

    group.bench_function("realistic_mixed_operations", |b| {
        let mut engine = MatchingEngine::new();
        let mut next_id: OrderId = 1;

        b.iter(|| {
            // 60% new resting orders
            for _ in 0..6 {
                let order = Order::limit(next_id, Side::Buy, dec!(100.0), dec!(1.0));
                next_id += 1;
                black_box(engine.submit(order));
            }

            // 20% cancellations
            for _ in 0..2 {
                let order = Order::limit(next_id, Side::Sell, dec!(101.0), dec!(1.0));
                let id = next_id;
                next_id += 1;
                engine.submit(order);
                black_box(engine.cancel(id));
            }

            // 20% matches
            for _ in 0..2 {
                let sell = Order::limit(next_id, Side::Sell, dec!(100.0), dec!(1.0));
                next_id += 1;
                black_box(engine.submit(sell));
            }
        });
    });

    group.finish();
}

fn bench_aggressive_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggressive_sweep");

    group.bench_function("market_order_through_ten_levels", |b| {
        let mut next_id: OrderId = 1;

        b.iter_batched(
            || {
                let mut engine = MatchingEngine::new();
                for level in 0..10 {
                    let price = dec!(100) + Decimal::from(level);
                    for _ in 0..4 {
                        engine.submit(Order::limit(next_id, Side::Sell, price, dec!(5.0)));
                        next_id += 1;
                    }
                }
                let taker = Order::market(next_id, Side::Buy, dec!(200.0));
                next_id += 1;
                (engine, taker)
            },
            |(mut engine, taker)| black_box(engine.submit(taker)),
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_modify_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("modify_churn");

    group.bench_function("reprice_resting_order", |b| {
        let mut engine = MatchingEngine::new();
        for id in 1..=64u64 {
            engine.submit(Order::limit(id, Side::Buy, dec!(100.0), dec!(1.0)));
        }

        let mut flip = false;
        b.iter(|| {
            let price = if flip { dec!(99.0) } else { dec!(98.0) };
            flip = !flip;
            black_box(engine.modify(1, price, dec!(1.0)));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mixed_workload,
    bench_aggressive_sweep,
    bench_modify_churn
);
criterion_main!(benches);
