//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Append-only sink for finalized orders. An order lands here exactly once,
// when it leaves the engine for good: fully filled, cancelled after a partial
// fill, rejected up front, or cancelled while resting. Entries are never
// mutated or removed.
//--------------------------------------------------------------------------------------------------

use crate::domain::models::types::{Order, OrderId};

/// Append-only log of finalized orders.
///
/// Every order appended is no longer referenced by the book or its index.
/// The log keeps arrival order and offers a containment query by id for
/// audit purposes.
#[derive(Debug, Default)]
pub struct CompletedOrders {
    completed: Vec<Order>,
}

impl CompletedOrders {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finalized order.
    pub fn add(&mut self, order: Order) {
        self.completed.push(order);
    }

    /// Returns true if an order with the given id has been finalized.
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.completed.iter().any(|order| order.id == order_id)
    }

    /// Returns the finalized record for the given id, if present.
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.completed.iter().find(|order| order.id == order_id)
    }

    /// All finalized orders, oldest first.
    pub fn all(&self) -> &[Order] {
        &self.completed
    }

    /// Number of finalized orders.
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    /// True if nothing has been finalized yet.
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::types::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn test_add_and_contains() {
        let mut log = CompletedOrders::new();
        assert!(log.is_empty());
        assert!(!log.contains(1));

        log.add(Order::limit(1, Side::Buy, dec!(100), dec!(10)));
        assert_eq!(log.len(), 1);
        assert!(log.contains(1));
        assert!(!log.contains(2));
        assert_eq!(log.get(1).map(|o| o.id), Some(1));
    }

    #[test]
    fn test_keeps_arrival_order() {
        let mut log = CompletedOrders::new();
        log.add(Order::limit(3, Side::Sell, dec!(101), dec!(5)));
        log.add(Order::limit(1, Side::Buy, dec!(100), dec!(10)));

        let ids: Vec<_> = log.all().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
