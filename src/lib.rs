// Expose the modules
pub mod config;
pub mod domain;

// Re-export key types for easier usage
pub use config::EngineConfig;
pub use domain::models::types::{
    Order, OrderId, OrderOutcome, OrderStatus, OrderType, Price, Side, TypeError, Volume,
};
pub use domain::services::completed_orders::CompletedOrders;
pub use domain::services::matching_engine::MatchingEngine;
pub use domain::services::orderbook::OrderbookError;
pub use domain::services::orderbook::orderbook::{OrderBook, PriceLevel};
