pub mod completed_orders;
pub mod matching_engine;
pub mod orderbook;
