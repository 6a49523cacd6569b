//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core data types used throughout the matching engine,
// including orders, outcomes, and various status/type enums.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | ENUMS              | Defines discrete sets of values (Side, OrderType, OrderStatus...). |
// | STRUCTS            | Defines the structure of Orders.                                 |
// | Potential Errors   | Defines errors related to type handling.                         |
// | TESTS              | Contains unit tests for the defined types.                       |
//--------------------------------------------------------------------------------------------------

//--------------------------------------------------------------------------------------------------
//  ENUMS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                  |
// |---------------|----------------------------------------------|
// | Side          | Represents the side of an order (Buy/Sell).  |
// | OrderType     | Represents the discipline of an order.       |
// | OrderStatus   | Represents the status of an order.           |
// | OrderOutcome  | Terminal result reported by submit.          |
//--------------------------------------------------------------------------------------------------
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for an order, assigned by the caller.
/// Uniqueness among live and completed orders is the caller's contract;
/// cancel and modify rely on it.
pub type OrderId = u64;

/// Price of an order. Exact decimal representation; level keying uses
/// exact equality, so callers supply pre-rounded ticks.
pub type Price = Decimal;

/// Volume of an order in base units.
pub type Volume = Decimal;

/// Represents the side of an order (Buy or Sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// A buy order (bids).
    Buy,
    /// A sell order (asks).
    Sell,
}

impl Side {
    /// The side an incoming order matches against.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// Represents the discipline of an order, determining its matching behavior
/// and whether any unfilled remainder may rest in the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// A limit order that rests in the book until filled or cancelled.
    GoodTillCancel,
    /// Executes immediately at its limit or better; the remainder is cancelled.
    ImmediateOrCancel,
    /// Executes in full immediately at its limit or better, or not at all.
    FillOrKill,
    /// Executes immediately at the best available prices, without a limit.
    Market,
}

/// Represents the lifecycle status of an order within the matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been acknowledged by the engine.
    Submitted,
    /// The order has been partially filled.
    PartiallyFilled,
    /// The order has been completely filled.
    Filled,
    /// The order was cancelled or rejected before any fill.
    Cancelled,
    /// The order was partially filled and then cancelled.
    PartiallyFilledCancelled,
}

/// Terminal result of submitting an order.
///
/// The discriminants are a stable contract for embedders that encode
/// outcomes numerically; see [`OrderOutcome::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderOutcome {
    /// The incoming order was consumed entirely against resting liquidity.
    FullyFilled = 0,
    /// Some volume traded, then the remainder was cancelled (IOC/Market).
    PartiallyFilledAndCancelled = 1,
    /// Some volume traded, then the remainder was rested at its limit.
    PartiallyFilledAndAddedToBook = 2,
    /// The order was rejected or cancelled without trading.
    Cancelled = 3,
    /// The order rested in the book without trading.
    AddedToOrderbook = 4,
}

impl OrderOutcome {
    /// Stable numeric encoding of the outcome.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

//--------------------------------------------------------------------------------------------------
//  STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                   |
// |---------------|-----------------------------------------------|
// | Order         | Represents a trading order in the system.     |
//--------------------------------------------------------------------------------------------------

/// Represents a trading order.
///
/// Identity (id, side, type, limit price, initial volume) is fixed at
/// construction; `remaining_volume` is the only quantity the engine
/// decrements as fills occur, and `status` / `updated_at` track the
/// lifecycle alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier for the order, assigned by the caller.
    pub id: OrderId,
    /// Side of the order (Buy or Sell).
    pub side: Side,
    /// Discipline of the order (GoodTillCancel, Market, etc.).
    pub order_type: OrderType,
    /// Limit price. `None` exactly for Market orders.
    pub limit_price: Option<Price>,
    /// Initial order volume in base units. Constant after construction.
    pub initial_volume: Volume,
    /// Volume still available to trade. Never exceeds `initial_volume`.
    pub remaining_volume: Volume,
    /// Current status of the order.
    pub status: OrderStatus,
    /// Timestamp of order creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the order.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order. `limit_price` must be `Some` for every
    /// discipline except Market.
    pub fn new(
        order_type: OrderType,
        id: OrderId,
        side: Side,
        limit_price: Option<Price>,
        volume: Volume,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            side,
            order_type,
            limit_price,
            initial_volume: volume,
            remaining_volume: volume,
            status: OrderStatus::Submitted,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a Good-Till-Cancel limit order.
    pub fn limit(id: OrderId, side: Side, price: Price, volume: Volume) -> Self {
        Self::new(OrderType::GoodTillCancel, id, side, Some(price), volume)
    }

    /// Creates an Immediate-Or-Cancel order.
    pub fn immediate_or_cancel(id: OrderId, side: Side, price: Price, volume: Volume) -> Self {
        Self::new(OrderType::ImmediateOrCancel, id, side, Some(price), volume)
    }

    /// Creates a Fill-Or-Kill order.
    pub fn fill_or_kill(id: OrderId, side: Side, price: Price, volume: Volume) -> Self {
        Self::new(OrderType::FillOrKill, id, side, Some(price), volume)
    }

    /// Creates a Market order. Market orders carry no limit price.
    pub fn market(id: OrderId, side: Side, volume: Volume) -> Self {
        Self::new(OrderType::Market, id, side, None, volume)
    }

    /// Volume traded so far.
    #[inline]
    pub fn filled_volume(&self) -> Volume {
        self.initial_volume - self.remaining_volume
    }

    /// True once the order has no volume left to trade.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_volume.is_zero()
    }
}

//--------------------------------------------------------------------------------------------------
//  Potential Errors
//--------------------------------------------------------------------------------------------------
/// Represents errors that can occur during type validation or conversion within this module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Occurs when attempting to create a `Side` from an unrecognized string or value.
    #[error("Invalid side specified: {0}")]
    InvalidSide(String),
    /// Occurs when attempting to create an `OrderType` from an unrecognized string or value.
    #[error("Invalid order type specified: {0}")]
    InvalidOrderType(String),
    /// Occurs when a required price is missing for a specific order type.
    #[error("Missing required price for order type: {0}")]
    MissingRequiredPrice(String),
    /// Occurs when an invalid quantity is specified (e.g., zero or negative).
    #[error("Invalid quantity specified: {0}")]
    InvalidQuantity(String),
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
// | Name                       | Description                                      |
// |----------------------------|--------------------------------------------------|
// | test_order_creation        | Verify basic Order struct instantiation.         |
// | test_outcome_codes         | Verify the stable numeric outcome encoding.      |
// | test_enum_derives          | Check basic enum functionality (clone, copy, eq).|
//--------------------------------------------------------------------------------------------------
