use thiserror::Error;

use crate::domain::models::types::{OrderId, Price, Volume};

pub mod orderbook;

/// Re-export key types for convenience
pub use self::orderbook::{OrderBook, PriceLevel};

/// Errors that can occur within the orderbook service.
///
/// This enum represents the various error conditions that can arise
/// during orderbook operations such as adding, removing, or mutating orders.
#[derive(Debug, Error)]
pub enum OrderbookError {
    /// Order not found in the orderbook
    #[error("Order {0} not found in the orderbook")]
    OrderNotFound(OrderId),

    /// Market orders cannot be added to the book
    #[error("Market orders cannot be added to the orderbook (no limit price)")]
    NoLimitPrice,

    /// Invalid price level
    #[error("Invalid price level: {0}")]
    InvalidPrice(Price),

    /// Invalid order volume
    #[error("Invalid order volume: {0}")]
    InvalidVolume(Volume),

    /// A volume change may only shrink a resting order
    #[error("Volume increase rejected (requested {requested}, remaining {remaining})")]
    VolumeIncrease { requested: Volume, remaining: Volume },
}
