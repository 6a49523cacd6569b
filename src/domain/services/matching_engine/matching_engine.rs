//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the core matching engine logic for processing orders against the book.
// The matching engine follows price-time priority to ensure fair order execution.
//
// | Component                | Description                                                |
// |--------------------------|-----------------------------------------------------------|
// | MatchingEngine           | Main engine for processing, modifying and cancelling orders |
// | Pre-flight check         | Cheap eligibility test run before any matching            |
// | Fill loop                | Shared kernel consuming the opposite side best-first      |
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                    | Description                                       | Key Methods      |
// |-------------------------|---------------------------------------------------|------------------|
// | MatchingEngine          | Core matching engine                              | submit           |
// |                         |                                                   | cancel           |
// |                         |                                                   | modify           |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                    | Description                                       | Return Type      |
// |-------------------------|---------------------------------------------------|------------------|
// | submit                  | Process a new order                               | OrderOutcome     |
// | cancel                  | Cancel a resting order                            | bool             |
// | modify                  | Reprice and/or resize a resting order             | bool             |
//--------------------------------------------------------------------------------------------------

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, error, trace};

use crate::config::EngineConfig;
use crate::domain::models::types::{
    Order, OrderId, OrderOutcome, OrderStatus, OrderType, Price, Side, Volume,
};
use crate::domain::services::completed_orders::CompletedOrders;
use crate::domain::services::orderbook::OrderBook;

/// The core matching engine responsible for processing orders against a
/// single instrument's book.
///
/// # Overview
///
/// The engine is the sole owner and mutator of three structures kept in
/// lockstep: the two-sided price-ordered book, the id -> (side, price)
/// index inside it, and the append-only completed-orders log. Every public
/// operation runs synchronously to completion; embedders needing
/// multi-threaded access must serialize calls at the boundary.
///
/// # Price-Time Priority
///
/// Orders are matched according to strict price-time priority rules:
///
/// * Better prices are matched first (higher bids, lower asks)
/// * At the same price level, orders are matched in arrival order (FIFO)
///
/// # Order Disciplines
///
/// * **GoodTillCancel**: matches what it can at its limit or better, then
///   rests any remainder at its limit
/// * **Market**: matches at the best available prices; any remainder is
///   cancelled
/// * **ImmediateOrCancel**: matches at its limit or better; any remainder is
///   cancelled, never rested
/// * **FillOrKill**: executes in full or not at all; feasibility is proven
///   before the first fill, and nothing can interleave between the check and
///   the fill in a single-threaded engine
#[derive(Debug)]
pub struct MatchingEngine {
    /// The order book for the instrument this engine is managing
    order_book: OrderBook,

    /// Append-only log of finalized orders
    completed_orders: CompletedOrders,

    /// Engine behavior toggles
    config: EngineConfig,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    /// Creates a new matching engine with default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates a new matching engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            order_book: OrderBook::with_level_capacity(config.level_capacity),
            completed_orders: CompletedOrders::new(),
            config,
        }
    }

    /// Processes a new order through the matching engine.
    ///
    /// This is the main entry point for order processing. The method will:
    /// 1. Run the pre-flight eligibility check
    /// 2. Route the order to the handler for its discipline
    /// 3. Return the terminal outcome; finalized orders land in the
    ///    completed log, rested remainders in the book
    ///
    /// # Returns
    ///
    /// The [`OrderOutcome`] describing what happened to the order.
    pub fn submit(&mut self, order: Order) -> OrderOutcome {
        if !self.can_process(&order) {
            debug!("order {} rejected pre-flight", order.id);
            return self.finalize_rejected(order);
        }

        match order.order_type {
            OrderType::Market => self.handle_market_order(order),
            OrderType::FillOrKill => self.handle_fill_or_kill(order),
            OrderType::ImmediateOrCancel => self.handle_ioc_order(order),
            OrderType::GoodTillCancel => self.handle_limit_order(order),
        }
    }

    /// Cancels a resting order.
    ///
    /// # Returns
    ///
    /// `true` iff the order was resting. After a `true` return the id is
    /// absent from book and index and the order sits in the completed log
    /// with its remaining volume untouched.
    pub fn cancel(&mut self, order_id: OrderId) -> bool {
        match self.order_book.remove_order(order_id) {
            Ok(mut order) => {
                order.status = if order.filled_volume() > Decimal::ZERO {
                    OrderStatus::PartiallyFilledCancelled
                } else {
                    OrderStatus::Cancelled
                };
                order.updated_at = Utc::now();
                debug!("order {} cancelled with {} unfilled", order_id, order.remaining_volume);
                self.completed_orders.add(order);
                true
            }
            Err(_) => false,
        }
    }

    /// Reprices and/or resizes a resting order.
    ///
    /// # Rules
    ///
    /// * `new_volume <= 0` is a cancellation and returns the result of
    ///   [`MatchingEngine::cancel`].
    /// * A volume decrease is applied in place; the order keeps its queue
    ///   position.
    /// * A volume increase is refused. By default the call still applies the
    ///   price move (if any) and returns `true`; with
    ///   [`EngineConfig::strict_modify`] the whole call fails instead.
    /// * A price change removes the order from its old level and enqueues it
    ///   at the tail of the new one, forfeiting time priority there.
    ///
    /// # Returns
    ///
    /// `false` for unknown ids or invalid prices, with no state change.
    pub fn modify(&mut self, order_id: OrderId, new_price: Price, new_volume: Volume) -> bool {
        if new_volume <= Decimal::ZERO {
            return self.cancel(order_id);
        }

        let (_, old_price) = match self.order_book.locate(order_id) {
            Some(location) => location,
            None => return false,
        };

        if new_price <= Decimal::ZERO {
            return false;
        }

        let remaining = match self.order_book.get_order_by_id(order_id) {
            Some(order) => order.remaining_volume,
            None => return false,
        };

        if new_volume > remaining {
            // Volume increases are refused; growing in place would keep a
            // queue position the larger order never earned.
            if self.config.strict_modify {
                return false;
            }
            debug!("order {} volume increase to {} refused", order_id, new_volume);
        } else if let Err(e) = self.order_book.reduce_order_volume(order_id, new_volume) {
            error!("failed to resize order {}: {}", order_id, e);
            return false;
        }

        if new_price != old_price {
            // A price move re-queues the order at the tail of its new level.
            let mut order = match self.order_book.remove_order(order_id) {
                Ok(order) => order,
                Err(_) => return false,
            };
            order.limit_price = Some(new_price);
            order.updated_at = Utc::now();
            if let Err(e) = self.order_book.add_order(order) {
                error!("failed to re-rest order {} at {}: {}", order_id, new_price, e);
                return false;
            }
        }

        debug!(
            "order {} modified (price {}, volume {})",
            order_id, new_price, new_volume
        );
        true
    }

    /// Checks whether all conditions to process the order are fulfilled.
    ///
    /// Rejections here are terminal: the order never reaches the fill loop.
    fn can_process(&self, order: &Order) -> bool {
        // Reject invalid quantities
        if order.initial_volume <= Decimal::ZERO {
            return false;
        }

        match order.order_type {
            // Market orders cannot execute against an empty opposite side
            OrderType::Market => !self.order_book.side_is_empty(order.side.opposite()),

            // FOK requires the full volume to be available at its limit or better
            OrderType::FillOrKill => match order.limit_price {
                Some(limit) if limit > Decimal::ZERO => {
                    self.order_book.has_sufficient_volume(order)
                }
                _ => false,
            },

            // Reject IOC if the touch is beyond its limit, or there is
            // nothing at all to take
            OrderType::ImmediateOrCancel => {
                let limit = match order.limit_price {
                    Some(limit) if limit > Decimal::ZERO => limit,
                    _ => return false,
                };
                match self.order_book.best_price(order.side.opposite()) {
                    Some(best) => match order.side {
                        Side::Buy => best <= limit,
                        Side::Sell => best >= limit,
                    },
                    None => false,
                }
            }

            // Limit orders with a valid price are always eligible
            OrderType::GoodTillCancel => {
                matches!(order.limit_price, Some(limit) if limit > Decimal::ZERO)
            }
        }
    }

    /// Shared fill kernel: consumes the opposite side best-first until the
    /// incoming order is filled, the side runs dry, or the best price
    /// crosses the bound.
    ///
    /// `bound` is the incoming order's limit for bounded disciplines and
    /// `None` for Market. Fully consumed resting orders are finalized into
    /// the completed log as they are dequeued; a partially consumed resting
    /// order keeps its place at the front of its queue.
    fn fill_against(&mut self, order: &mut Order, bound: Option<Price>) {
        let opposite = order.side.opposite();

        while order.remaining_volume > Decimal::ZERO {
            let best = match self.order_book.best_price(opposite) {
                Some(price) => price,
                None => break,
            };

            if let Some(limit) = bound {
                let within = match order.side {
                    Side::Buy => best <= limit,
                    Side::Sell => best >= limit,
                };
                if !within {
                    break;
                }
            }

            let (taken, filled) = self
                .order_book
                .fill_best_level(opposite, order.remaining_volume);
            if taken.is_zero() {
                break;
            }

            trace!("order {} took {} at {}", order.id, taken, best);
            order.remaining_volume -= taken;

            for maker in filled {
                self.completed_orders.add(maker);
            }
        }

        if order.remaining_volume < order.initial_volume {
            order.status = if order.remaining_volume.is_zero() {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };
            order.updated_at = Utc::now();
        }
    }

    /// Handles a Good-Till-Cancel limit order.
    ///
    /// An order that cannot cross at entry rests immediately. Otherwise it
    /// runs the fill loop bounded by its limit, and any remainder rests at
    /// the limit price.
    fn handle_limit_order(&mut self, mut order: Order) -> OrderOutcome {
        let limit = match order.limit_price {
            Some(limit) => limit,
            None => return self.finalize_rejected(order),
        };

        let crosses = match order.side {
            Side::Buy => self.order_book.best_ask().map_or(false, |ask| limit >= ask),
            Side::Sell => self.order_book.best_bid().map_or(false, |bid| limit <= bid),
        };
        if !crosses {
            debug!("order {} rested at {}", order.id, limit);
            self.rest_order(order);
            return OrderOutcome::AddedToOrderbook;
        }

        self.fill_against(&mut order, Some(limit));

        if order.remaining_volume > Decimal::ZERO {
            debug!(
                "order {} partially filled, resting {} at {}",
                order.id, order.remaining_volume, limit
            );
            self.rest_order(order);
            OrderOutcome::PartiallyFilledAndAddedToBook
        } else {
            debug!("order {} fully filled", order.id);
            self.completed_orders.add(order);
            OrderOutcome::FullyFilled
        }
    }

    /// Handles a Market order: unbounded fill loop, remainder cancelled.
    fn handle_market_order(&mut self, mut order: Order) -> OrderOutcome {
        self.fill_against(&mut order, None);

        if order.remaining_volume.is_zero() {
            debug!("order {} fully filled", order.id);
            self.completed_orders.add(order);
            OrderOutcome::FullyFilled
        } else {
            // The opposite side ran dry before the order was satisfied.
            debug!(
                "order {} exhausted liquidity with {} unfilled",
                order.id, order.remaining_volume
            );
            order.status = OrderStatus::PartiallyFilledCancelled;
            order.updated_at = Utc::now();
            self.completed_orders.add(order);
            OrderOutcome::PartiallyFilledAndCancelled
        }
    }

    /// Handles an Immediate-Or-Cancel order: fill loop bounded by its
    /// limit, remainder cancelled, never rests.
    fn handle_ioc_order(&mut self, mut order: Order) -> OrderOutcome {
        let limit = match order.limit_price {
            Some(limit) => limit,
            None => return self.finalize_rejected(order),
        };

        self.fill_against(&mut order, Some(limit));

        if order.remaining_volume.is_zero() {
            debug!("order {} fully filled", order.id);
            self.completed_orders.add(order);
            OrderOutcome::FullyFilled
        } else {
            debug!(
                "order {} cancelled with {} unfilled",
                order.id, order.remaining_volume
            );
            order.status = OrderStatus::PartiallyFilledCancelled;
            order.updated_at = Utc::now();
            self.completed_orders.add(order);
            OrderOutcome::PartiallyFilledAndCancelled
        }
    }

    /// Handles a Fill-Or-Kill order.
    ///
    /// Pre-flight proved the opposite side holds enough volume at acceptable
    /// prices, and no other operation can run between that check and this
    /// fill, so the loop consumes the order entirely.
    fn handle_fill_or_kill(&mut self, mut order: Order) -> OrderOutcome {
        let bound = order.limit_price;
        self.fill_against(&mut order, bound);

        debug_assert!(order.remaining_volume.is_zero());
        debug!("order {} fully filled", order.id);
        self.completed_orders.add(order);
        OrderOutcome::FullyFilled
    }

    /// Rests an order at the tail of its price level and indexes it.
    fn rest_order(&mut self, order: Order) {
        let id = order.id;
        if let Err(e) = self.order_book.add_order(order) {
            error!("failed to rest order {}: {}", id, e);
        }
    }

    /// Finalizes a rejected order into the completed log.
    fn finalize_rejected(&mut self, mut order: Order) -> OrderOutcome {
        order.status = OrderStatus::Cancelled;
        order.updated_at = Utc::now();
        self.completed_orders.add(order);
        OrderOutcome::Cancelled
    }

    /// Gets the current state of the order book.
    pub fn order_book(&self) -> &OrderBook {
        &self.order_book
    }

    /// Gets the log of finalized orders.
    pub fn completed_orders(&self) -> &CompletedOrders {
        &self.completed_orders
    }
}
