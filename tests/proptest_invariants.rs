//! Property-based tests for matching engine invariants.
//!
//! These tests use proptest to verify that the structural invariants of the
//! book, its index and the completed log hold across randomly generated
//! operation sequences.

use matchbook::{MatchingEngine, Order, OrderId, OrderOutcome, Price, Side, Volume};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Generate a valid tick price (integral, small range so levels collide)
fn price_strategy() -> impl Strategy<Value = Price> {
    (90i64..=110i64).prop_map(Decimal::from)
}

/// Generate a valid volume
fn volume_strategy() -> impl Strategy<Value = Volume> {
    (1i64..=50i64).prop_map(Decimal::from)
}

/// Generate a side
fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

/// A randomly chosen engine operation, with ids resolved at run time.
#[derive(Debug, Clone)]
enum Op {
    Limit(Side, Price, Volume),
    Market(Side, Volume),
    Ioc(Side, Price, Volume),
    Fok(Side, Price, Volume),
    Cancel(usize),
    Modify(usize, Price, Volume),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (side_strategy(), price_strategy(), volume_strategy())
            .prop_map(|(s, p, v)| Op::Limit(s, p, v)),
        1 => (side_strategy(), volume_strategy()).prop_map(|(s, v)| Op::Market(s, v)),
        1 => (side_strategy(), price_strategy(), volume_strategy())
            .prop_map(|(s, p, v)| Op::Ioc(s, p, v)),
        1 => (side_strategy(), price_strategy(), volume_strategy())
            .prop_map(|(s, p, v)| Op::Fok(s, p, v)),
        1 => (0usize..64).prop_map(Op::Cancel),
        1 => ((0usize..64), price_strategy(), volume_strategy())
            .prop_map(|(i, p, v)| Op::Modify(i, p, v)),
    ]
}

/// Checks the standing invariants of book, index and log.
fn check_invariants(engine: &MatchingEngine, submitted: &[OrderId]) -> Result<(), TestCaseError> {
    let book = engine.order_book();
    let mut resting = 0usize;

    for side in [Side::Buy, Side::Sell] {
        for (price, level) in book.levels(side) {
            prop_assert!(!level.is_empty(), "empty level at {}", price);

            let mut level_volume = Decimal::ZERO;
            for order in &level.orders {
                prop_assert!(order.remaining_volume > Decimal::ZERO);
                prop_assert!(order.remaining_volume <= order.initial_volume);
                prop_assert_eq!(order.limit_price, Some(price));
                prop_assert_eq!(book.locate(order.id), Some((side, price)));
                level_volume += order.remaining_volume;
                resting += 1;
            }
            prop_assert_eq!(level.total_volume, level_volume);
        }
    }

    prop_assert_eq!(book.order_count(), resting);

    // The book never crosses itself.
    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        prop_assert!(bid < ask, "crossed book: bid {} >= ask {}", bid, ask);
    }

    // Every submitted id is resting or finalized, never both, never neither.
    for id in submitted {
        let in_book = book.locate(*id).is_some();
        let in_log = engine.completed_orders().contains(*id);
        prop_assert!(in_book != in_log, "order {} resting={} logged={}", id, in_book, in_log);
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The structural invariants hold after every operation of any sequence.
    #[test]
    fn invariants_hold_across_random_sessions(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut engine = MatchingEngine::new();
        let mut submitted: Vec<OrderId> = Vec::new();
        let mut next_id: OrderId = 1;

        for op in ops {
            match op {
                Op::Limit(side, price, volume) => {
                    engine.submit(Order::limit(next_id, side, price, volume));
                    submitted.push(next_id);
                    next_id += 1;
                }
                Op::Market(side, volume) => {
                    engine.submit(Order::market(next_id, side, volume));
                    submitted.push(next_id);
                    next_id += 1;
                }
                Op::Ioc(side, price, volume) => {
                    engine.submit(Order::immediate_or_cancel(next_id, side, price, volume));
                    submitted.push(next_id);
                    next_id += 1;
                }
                Op::Fok(side, price, volume) => {
                    engine.submit(Order::fill_or_kill(next_id, side, price, volume));
                    submitted.push(next_id);
                    next_id += 1;
                }
                Op::Cancel(slot) => {
                    if let Some(id) = submitted.get(slot % submitted.len().max(1)) {
                        engine.cancel(*id);
                    }
                }
                Op::Modify(slot, price, volume) => {
                    if let Some(id) = submitted.get(slot % submitted.len().max(1)) {
                        engine.modify(*id, price, volume);
                    }
                }
            }

            check_invariants(&engine, &submitted)?;
        }
    }

    /// A rejected fill-or-kill leaves the book exactly as it found it.
    #[test]
    fn rejected_fok_leaves_book_intact(
        seeds in prop::collection::vec((side_strategy(), price_strategy(), volume_strategy()), 1..20),
        side in side_strategy(),
        price in price_strategy(),
    ) {
        let mut engine = MatchingEngine::new();
        let mut next_id: OrderId = 1;
        for (seed_side, seed_price, seed_volume) in seeds {
            engine.submit(Order::limit(next_id, seed_side, seed_price, seed_volume));
            next_id += 1;
        }

        let snapshot = |engine: &MatchingEngine| -> Vec<(Side, Price, Vec<(OrderId, Volume)>)> {
            [Side::Buy, Side::Sell]
                .into_iter()
                .flat_map(|s| {
                    engine
                        .order_book()
                        .levels(s)
                        .iter()
                        .map(|(p, level)| {
                            (
                                s,
                                *p,
                                level.orders.iter().map(|o| (o.id, o.remaining_volume)).collect(),
                            )
                        })
                        .collect::<Vec<_>>()
                })
                .collect()
        };

        // Ask for more volume than the whole opposite side holds, so the
        // pre-flight check must refuse the order.
        let mut oversize = Decimal::ONE;
        for (_, level) in engine.order_book().levels(side.opposite()) {
            oversize += level.total_volume;
        }

        let before = snapshot(&engine);
        let outcome = engine.submit(Order::fill_or_kill(next_id, side, price, oversize));
        prop_assert_eq!(outcome, OrderOutcome::Cancelled);
        prop_assert_eq!(snapshot(&engine), before);
    }

    /// Filled volume balances across sides: every unit bought was sold.
    #[test]
    fn filled_volume_balances(ops in prop::collection::vec(
        (side_strategy(), price_strategy(), volume_strategy()), 1..40
    )) {
        let mut engine = MatchingEngine::new();
        for (id, (side, price, volume)) in ops.into_iter().enumerate() {
            engine.submit(Order::limit(id as OrderId + 1, side, price, volume));
        }

        let mut bought = Decimal::ZERO;
        let mut sold = Decimal::ZERO;
        let mut tally = |order: &Order| match order.side {
            Side::Buy => bought += order.filled_volume(),
            Side::Sell => sold += order.filled_volume(),
        };

        for order in engine.completed_orders().all() {
            tally(order);
        }
        for side in [Side::Buy, Side::Sell] {
            for (_, level) in engine.order_book().levels(side) {
                for order in &level.orders {
                    tally(order);
                }
            }
        }

        prop_assert_eq!(bought, sold);
    }
}
