//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements a limit order book for a single trading instrument.
// It maintains bid and ask orders in price-time priority (FIFO) order.
//
// | Component     | Description                                                               |
// |--------------|---------------------------------------------------------------------------|
// | OrderBook    | Main order book structure managing bids and asks                          |
// | PriceLevel   | Groups orders at the same price level                                     |
// | FIFO Queue   | Orders within each price level are processed first-in-first-out           |
// | Order index  | O(1) id -> (side, price) lookup backing cancel and modify                 |
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                        | Key Methods              |
// |---------------|----------------------------------------------------|-------------------------|
// | PriceLevel    | Maintains orders at a specific price               | peek_next_order         |
// |               |                                                    | is_empty                |
// |               |                                                    | order_count             |
// |--------------|----------------------------------------------------|-------------------------|
// | OrderBook     | Main order book implementation                     | add_order               |
// |               |                                                    | remove_order            |
// |               |                                                    | fill_best_level         |
// |               |                                                    | has_sufficient_volume   |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                   | Description                                | Return Type             |
// |------------------------|--------------------------------------------|------------------------|
// | new                    | Creates new OrderBook                      | OrderBook              |
// | add_order              | Rests an order in the book                 | Result<(), OrderbookError> |
// | remove_order           | Removes order from book                    | Result<Order, OrderbookError> |
// | fill_best_level        | Consumes volume from the best price level  | (Volume, Vec<Order>)   |
// | has_sufficient_volume  | Feasibility check against one side         | bool                   |
// | reduce_order_volume    | Shrinks a resting order in place           | Result<(), OrderbookError> |
// | best_bid / best_ask    | Gets best prices                           | Option<Price>          |
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::models::types::{Order, OrderId, OrderStatus, Price, Side, Volume};
use crate::domain::services::orderbook::OrderbookError;

/// Default initial capacity of a price level's order queue.
const DEFAULT_LEVEL_CAPACITY: usize = 4;

/// Represents a price level in the order book, maintaining a FIFO queue of orders
/// at the same price point.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price for this level
    pub price: Price,
    /// FIFO queue of orders at this price level
    pub orders: VecDeque<Order>,
    /// Total remaining volume of all orders at this price level
    pub total_volume: Volume,
}

impl PriceLevel {
    /// Creates a new price level with the given price.
    ///
    /// # Arguments
    /// * `price` - The price for this level
    /// * `initial_capacity` - Optional capacity for the order queue
    pub fn new(price: Price, initial_capacity: Option<usize>) -> Self {
        let capacity = initial_capacity.unwrap_or(DEFAULT_LEVEL_CAPACITY);
        Self {
            price,
            orders: VecDeque::with_capacity(capacity),
            total_volume: Decimal::ZERO,
        }
    }

    /// Returns the next order to be matched without removing it from the queue.
    /// This maintains FIFO ordering by always returning the front of the queue.
    #[inline]
    pub fn peek_next_order(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Returns true if this price level has no orders.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Returns the number of orders at this price level.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

/// The main order book structure that maintains bid and ask orders in price-time priority.
/// Uses BTreeMap for price level organization and VecDeque for FIFO ordering within price levels.
///
/// The book exclusively owns every resting order; the id lookup map stores
/// only a (side, price) locator, never the order itself. A price level is
/// dropped the moment its queue empties, so no empty level is ever observable.
#[derive(Debug)]
pub struct OrderBook {
    /// Bid side orders organized by price (iterated descending)
    bids: BTreeMap<Price, PriceLevel>,
    /// Ask side orders organized by price (ascending)
    asks: BTreeMap<Price, PriceLevel>,
    /// Cache of best bid price for quick access
    /// This is an Option because the order book may be empty or have no bids,
    /// in which case there is no best bid price to reference.
    best_bid: Option<Price>,
    /// Cache of best ask price for quick access
    best_ask: Option<Price>,
    /// O(1) lookup of a resting order's location by ID
    order_map: HashMap<OrderId, (Side, Price)>,
    /// Initial capacity for newly created price level queues
    level_capacity: usize,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Creates a new empty order book.
    pub fn new() -> Self {
        Self::with_level_capacity(DEFAULT_LEVEL_CAPACITY)
    }

    /// Creates a new empty order book whose price levels pre-allocate
    /// queue space for `level_capacity` orders.
    pub fn with_level_capacity(level_capacity: usize) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            best_bid: None,
            best_ask: None,
            order_map: HashMap::new(),
            level_capacity,
        }
    }

    /// Gets a resting order by its ID with O(1) location lookup.
    ///
    /// # Returns
    /// * `Some(&Order)` - Reference to the found order
    /// * `None` - If no resting order exists with the given ID
    pub fn get_order_by_id(&self, order_id: OrderId) -> Option<&Order> {
        self.order_map.get(&order_id).and_then(|(side, price)| {
            let price_levels = match side {
                Side::Buy => &self.bids,
                Side::Sell => &self.asks,
            };
            price_levels
                .get(price)
                .and_then(|level| level.orders.iter().find(|order| order.id == order_id))
        })
    }

    /// Returns the (side, price) location of a resting order, if any.
    #[inline]
    pub fn locate(&self, order_id: OrderId) -> Option<(Side, Price)> {
        self.order_map.get(&order_id).copied()
    }

    /// Rests an order at the tail of its price level's queue.
    /// Orders are organized first by price (best price first) and then by time of arrival (FIFO).
    ///
    /// # Returns
    /// * `Ok(())` - If the order was successfully added
    /// * `Err(OrderbookError)` - If the order could not be added
    ///
    /// # Notes
    /// - Orders without a limit price (Market) are rejected
    /// - Orders with a non-positive price or volume are rejected
    /// - Best prices are automatically updated
    #[inline(always)]
    pub fn add_order(&mut self, order: Order) -> Result<(), OrderbookError> {
        // 1. Fast-path validation (most common checks first)
        let price = match order.limit_price {
            Some(p) => p,
            None => return Err(OrderbookError::NoLimitPrice),
        };

        if price <= Decimal::ZERO {
            return Err(OrderbookError::InvalidPrice(price));
        }

        if order.remaining_volume <= Decimal::ZERO {
            return Err(OrderbookError::InvalidVolume(order.remaining_volume));
        }

        let id = order.id;
        let side = order.side;

        // 2. Direct access to the correct price level map
        let price_levels = if side == Side::Buy {
            &mut self.bids
        } else {
            &mut self.asks
        };

        // 3. Get or create the price level, reserving queue capacity up front
        let level_capacity = self.level_capacity;
        let price_level = price_levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price, Some(level_capacity)));

        // 4. Update the price level and enqueue at the tail (FIFO)
        price_level.total_volume += order.remaining_volume;
        price_level.orders.push_back(order);

        // 5. O(1) lookup map update
        self.order_map.insert(id, (side, price));

        // 6. Update best prices cache only if needed
        match side {
            Side::Buy if self.best_bid.map_or(true, |p| price > p) => self.best_bid = Some(price),
            Side::Sell if self.best_ask.map_or(true, |p| price < p) => self.best_ask = Some(price),
            _ => {}
        }

        Ok(())
    }

    /// Removes a resting order from the order book.
    ///
    /// # Returns
    /// * `Ok(Order)` - The removed order
    /// * `Err(OrderbookError)` - If the order was not found
    ///
    /// # Performance
    /// O(1) location lookup via the id map, then linear within the level's queue.
    #[inline]
    pub fn remove_order(&mut self, order_id: OrderId) -> Result<Order, OrderbookError> {
        // 1. Fast lookup of the order location using the O(1) map
        let (side, price) = self
            .order_map
            .remove(&order_id)
            .ok_or(OrderbookError::OrderNotFound(order_id))?;

        // 2. Direct access to the correct price level map
        let price_levels = if side == Side::Buy {
            &mut self.bids
        } else {
            &mut self.asks
        };

        // 3. Get the price level
        let price_level = price_levels
            .get_mut(&price)
            .ok_or(OrderbookError::InvalidPrice(price))?;

        // 4. Find and remove the order in one pass
        let order_idx = price_level
            .orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or(OrderbookError::OrderNotFound(order_id))?;

        let order = price_level
            .orders
            .remove(order_idx)
            .ok_or(OrderbookError::OrderNotFound(order_id))?;

        // 5. Update the level's aggregate volume
        price_level.total_volume -= order.remaining_volume;

        // 6. Clean up the price level the moment it empties
        if price_level.orders.is_empty() {
            price_levels.remove(&price);

            // 7. Update best prices only if needed
            match side {
                Side::Buy if Some(price) == self.best_bid => self.update_best_bid(),
                Side::Sell if Some(price) == self.best_ask => self.update_best_ask(),
                _ => {}
            }
        }

        Ok(order)
    }

    /// Shrinks a resting order's remaining volume in place.
    ///
    /// The order keeps its position in the level's queue: a pure volume
    /// decrease does not forfeit time priority.
    ///
    /// # Returns
    /// * `Ok(())` - The volume was updated
    /// * `Err(OrderbookError)` - Unknown id, non-positive volume, or an
    ///   attempted increase
    pub fn reduce_order_volume(
        &mut self,
        order_id: OrderId,
        new_volume: Volume,
    ) -> Result<(), OrderbookError> {
        if new_volume <= Decimal::ZERO {
            return Err(OrderbookError::InvalidVolume(new_volume));
        }

        let (side, price) = self
            .order_map
            .get(&order_id)
            .copied()
            .ok_or(OrderbookError::OrderNotFound(order_id))?;

        let price_levels = if side == Side::Buy {
            &mut self.bids
        } else {
            &mut self.asks
        };

        let price_level = price_levels
            .get_mut(&price)
            .ok_or(OrderbookError::InvalidPrice(price))?;

        let order = price_level
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(OrderbookError::OrderNotFound(order_id))?;

        if new_volume > order.remaining_volume {
            return Err(OrderbookError::VolumeIncrease {
                requested: new_volume,
                remaining: order.remaining_volume,
            });
        }

        let delta = order.remaining_volume - new_volume;
        order.remaining_volume = new_volume;
        order.updated_at = Utc::now();
        price_level.total_volume -= delta;

        Ok(())
    }

    /// Consumes up to `requested` volume from the front of the best price
    /// level on `side`, in FIFO order.
    ///
    /// Fully consumed resting orders are dequeued, de-indexed, marked
    /// `Filled` and returned to the caller; a partially consumed order stays
    /// at the front of the queue with its remaining volume decremented. If
    /// the level empties it is removed and the best price cache refreshed.
    ///
    /// # Returns
    /// The volume actually taken and the resting orders that were fully
    /// filled, in the order they were consumed.
    pub fn fill_best_level(&mut self, side: Side, requested: Volume) -> (Volume, Vec<Order>) {
        let best_price = match side {
            Side::Buy => self.best_bid,
            Side::Sell => self.best_ask,
        };
        let price = match best_price {
            Some(p) => p,
            None => return (Decimal::ZERO, Vec::new()),
        };

        let price_levels = if side == Side::Buy {
            &mut self.bids
        } else {
            &mut self.asks
        };
        let level = match price_levels.get_mut(&price) {
            Some(level) => level,
            None => return (Decimal::ZERO, Vec::new()),
        };

        let mut taken = Decimal::ZERO;
        let mut filled = Vec::new();

        while taken < requested {
            let front_remaining = match level.orders.front() {
                Some(order) => order.remaining_volume,
                None => break,
            };
            let needed = requested - taken;

            if needed >= front_remaining {
                // The resting order is consumed entirely: dequeue and de-index it.
                if let Some(mut maker) = level.orders.pop_front() {
                    maker.remaining_volume = Decimal::ZERO;
                    maker.status = OrderStatus::Filled;
                    maker.updated_at = Utc::now();
                    level.total_volume -= front_remaining;
                    taken += front_remaining;
                    self.order_map.remove(&maker.id);
                    filled.push(maker);
                }
            } else {
                // The resting order absorbs the rest of the request and keeps
                // its place at the front of the queue.
                if let Some(front) = level.orders.front_mut() {
                    front.remaining_volume -= needed;
                    front.status = OrderStatus::PartiallyFilled;
                    front.updated_at = Utc::now();
                }
                level.total_volume -= needed;
                taken += needed;
            }
        }

        let level_emptied = level.orders.is_empty();
        if level_emptied {
            price_levels.remove(&price);
            match side {
                Side::Buy => self.update_best_bid(),
                Side::Sell => self.update_best_ask(),
            }
        }

        (taken, filled)
    }

    /// Reports whether one side of the book holds enough volume, at prices
    /// at least as good as the order's limit, to fill the order entirely.
    ///
    /// Levels are visited in priority order and the scan short-circuits as
    /// soon as the accumulated volume satisfies the order. Pure read; the
    /// book is not touched.
    pub fn has_sufficient_volume(&self, order: &Order) -> bool {
        let required = order.initial_volume;
        let mut accumulated = Decimal::ZERO;

        match order.side {
            Side::Buy => {
                for (price, level) in self.asks.iter() {
                    if let Some(limit) = order.limit_price {
                        if *price > limit {
                            break;
                        }
                    }
                    accumulated += level.total_volume;
                    if accumulated >= required {
                        return true;
                    }
                }
            }
            Side::Sell => {
                for (price, level) in self.bids.iter().rev() {
                    if let Some(limit) = order.limit_price {
                        if *price < limit {
                            break;
                        }
                    }
                    accumulated += level.total_volume;
                    if accumulated >= required {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Updates only the best bid price
    #[inline(always)]
    fn update_best_bid(&mut self) {
        self.best_bid = self.bids.keys().next_back().copied();
    }

    /// Updates only the best ask price
    #[inline(always)]
    fn update_best_ask(&mut self) {
        self.best_ask = self.asks.keys().next().copied();
    }

    /// Gets the next order to be matched on `side` without removing it.
    ///
    /// # Notes
    /// - For bids, returns the highest priced order
    /// - For asks, returns the lowest priced order
    /// - Within a price level, returns the first order (FIFO)
    #[inline]
    pub fn peek_best_order(&self, side: Side) -> Option<&Order> {
        let (price_levels, best_price) = match side {
            Side::Buy => (&self.bids, self.best_bid),
            Side::Sell => (&self.asks, self.best_ask),
        };

        best_price.and_then(|price| {
            price_levels
                .get(&price)
                .and_then(|level| level.peek_next_order())
        })
    }

    /// Returns all orders at a specific price level in FIFO order.
    pub fn get_orders_at_price(&self, side: Side, price: Price) -> Option<&VecDeque<Order>> {
        let price_levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        price_levels.get(&price).map(|level| &level.orders)
    }

    /// Returns the number of orders at a specific price level.
    pub fn order_count_at_price(&self, side: Side, price: Price) -> usize {
        let price_levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        price_levels.get(&price).map_or(0, |level| level.order_count())
    }

    /// Returns the best bid price.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.best_bid
    }

    /// Returns the best ask price.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.best_ask
    }

    /// Returns the best price on the given side.
    #[inline]
    pub fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.best_bid,
            Side::Sell => self.best_ask,
        }
    }

    /// Returns the spread between the best bid and ask prices.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_ask, self.best_bid) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Returns the total remaining volume at a specific price level.
    pub fn volume_at_price(&self, side: Side, price: Price) -> Option<Volume> {
        let price_levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        price_levels.get(&price).map(|level| level.total_volume)
    }

    /// Returns true if the given side holds no orders at all.
    #[inline]
    pub fn side_is_empty(&self, side: Side) -> bool {
        match side {
            Side::Buy => self.bids.is_empty(),
            Side::Sell => self.asks.is_empty(),
        }
    }

    /// Returns the number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.order_map.len()
    }

    /// Gets a reference to the price level at the given price, if present.
    pub fn get_price_level(&self, side: Side, price: Price) -> Option<&PriceLevel> {
        match side {
            Side::Buy => self.bids.get(&price),
            Side::Sell => self.asks.get(&price),
        }
    }

    /// Returns the price levels of one side in priority order.
    ///
    /// Bids come highest-first, asks lowest-first; within a level the queue
    /// is in arrival order.
    pub fn levels(&self, side: Side) -> Vec<(Price, &PriceLevel)> {
        match side {
            Side::Buy => self.bids.iter().rev().map(|(p, l)| (*p, l)).collect(),
            Side::Sell => self.asks.iter().map(|(p, l)| (*p, l)).collect(),
        }
    }

    /// Gets the best bid order without removing it from the book.
    #[inline]
    pub fn get_best_bid(&self) -> Option<&Order> {
        self.peek_best_order(Side::Buy)
    }

    /// Gets the best ask order without removing it from the book.
    #[inline]
    pub fn get_best_ask(&self) -> Option<&Order> {
        self.peek_best_order(Side::Sell)
    }
}
