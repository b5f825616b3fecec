//! The order aggregate: an open cart or a placed order, plus its line items.
//!
//! All cart mutation logic lives here so it can be exercised without a
//! database. The repository layer persists whatever state these methods
//! produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use golden_fig_core::{Email, OrderId, OrderItemId, ProductId, UserId};

/// A single product line within an order.
///
/// Within one order, at most one item references a given product; the
/// aggregate merges counts on insert (see [`Order::add_product`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Database ID, absent until first persisted.
    pub id: Option<OrderItemId>,
    /// Owning order. Absent until the order itself is persisted.
    pub order_id: Option<OrderId>,
    /// The catalog product this line refers to.
    pub product_id: ProductId,
    /// Number of units. Always positive.
    pub count: i32,
}

/// A customer order.
///
/// An order with `ordered_at == None` is an open cart; once `ordered_at` is
/// set the order is placed and must not be mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Database ID, absent until first persisted.
    pub id: Option<OrderId>,
    /// Owning user, if the cart belongs to a logged-in customer.
    pub user_id: Option<UserId>,
    /// Customer email for guest checkout (and order confirmation).
    pub customer_email: Option<Email>,
    /// Line items, one per distinct product.
    pub items: Vec<OrderItem>,
    /// Set exactly once, when the order is placed.
    pub ordered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a new, empty, unpersisted cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            id: None,
            user_id: None,
            customer_email: None,
            items: Vec::new(),
            ordered_at: None,
        }
    }

    /// Whether this order has been placed (and is therefore immutable).
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.ordered_at.is_some()
    }

    /// Add `count` units of a product, merging with an existing line.
    ///
    /// Items are matched by catalog ID, so a product reloaded from storage
    /// between calls still merges into the same line.
    pub fn add_product(&mut self, product_id: ProductId, count: i32) {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.count += count,
            None => self.items.push(OrderItem {
                id: None,
                order_id: self.id,
                product_id,
                count,
            }),
        }
    }

    /// Remove the line item with the given ID, returning it if present.
    pub fn remove_item(&mut self, item_id: OrderItemId) -> Option<OrderItem> {
        let pos = self.items.iter().position(|i| i.id == Some(item_id))?;
        Some(self.items.remove(pos))
    }

    /// Find the line item referencing a product, if any.
    #[must_use]
    pub fn item_for(&self, product_id: ProductId) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Stamp the order as placed at the given instant.
    pub const fn finalize(&mut self, at: DateTime<Utc>) {
        self.ordered_at = Some(at);
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.count)).sum()
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_is_empty_and_open() {
        let order = Order::new();
        assert!(order.id.is_none());
        assert!(order.items.is_empty());
        assert!(!order.is_placed());
    }

    #[test]
    fn test_add_product_creates_one_item() {
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 2);

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.item_for(ProductId::new(1)).unwrap().count, 2);
    }

    #[test]
    fn test_add_same_product_merges_counts() {
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 2);
        order.add_product(ProductId::new(1), 3);

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.item_for(ProductId::new(1)).unwrap().count, 5);
    }

    #[test]
    fn test_add_different_product_appends_item() {
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 2);
        order.add_product(ProductId::new(1), 3);
        order.add_product(ProductId::new(2), 1);

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.item_for(ProductId::new(1)).unwrap().count, 5);
        assert_eq!(order.item_for(ProductId::new(2)).unwrap().count, 1);
    }

    #[test]
    fn test_remove_item_leaves_others_untouched() {
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 2);
        order.add_product(ProductId::new(2), 4);
        // Simulate persisted items
        order.items[0].id = Some(OrderItemId::new(10));
        order.items[1].id = Some(OrderItemId::new(11));

        let removed = order.remove_item(OrderItemId::new(10)).unwrap();
        assert_eq!(removed.product_id, ProductId::new(1));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.item_for(ProductId::new(2)).unwrap().count, 4);
    }

    #[test]
    fn test_remove_unknown_item_is_none() {
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 2);
        assert!(order.remove_item(OrderItemId::new(99)).is_none());
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn test_finalize_stamps_ordered_at() {
        let mut order = Order::new();
        assert!(!order.is_placed());

        let now = Utc::now();
        order.finalize(now);
        assert!(order.is_placed());
        assert_eq!(order.ordered_at, Some(now));
    }

    #[test]
    fn test_unit_count_sums_lines() {
        let mut order = Order::new();
        order.add_product(ProductId::new(1), 2);
        order.add_product(ProductId::new(2), 3);
        assert_eq!(order.unit_count(), 5);
    }
}
