//! Integration tests for the order aggregate.
//!
//! These tests verify the cart merge semantics and the open -> placed state
//! transition without requiring a database or an SMTP server.

use chrono::Utc;

use golden_fig_core::{OrderItemId, ProductId};
use golden_fig_shop::models::order::Order;
use golden_fig_shop::routes::cart::OrderView;

// =============================================================================
// Cart Merge Semantics
// =============================================================================

#[test]
fn test_empty_cart_starts_unpersisted() {
    let order = Order::new();
    assert!(order.id.is_none());
    assert!(order.items.is_empty());
    assert!(order.ordered_at.is_none());
}

#[test]
fn test_cart_lifecycle_merges_and_appends() {
    let p1 = ProductId::new(1);
    let p2 = ProductId::new(2);

    let mut order = Order::new();

    // First add creates a line
    order.add_product(p1, 2);
    assert_eq!(order.items.len(), 1);

    // Second add of the same product merges into it
    order.add_product(p1, 3);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.item_for(p1).map(|i| i.count), Some(5));

    // A different product gets its own line, existing counts untouched
    order.add_product(p2, 1);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.item_for(p1).map(|i| i.count), Some(5));
    assert_eq!(order.item_for(p2).map(|i| i.count), Some(1));
}

#[test]
fn test_removing_one_line_keeps_the_rest() {
    let mut order = Order::new();
    order.add_product(ProductId::new(1), 5);
    order.add_product(ProductId::new(2), 1);
    order.items[0].id = Some(OrderItemId::new(100));
    order.items[1].id = Some(OrderItemId::new(101));

    let removed = order.remove_item(OrderItemId::new(100));
    assert!(removed.is_some());
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.item_for(ProductId::new(2)).map(|i| i.count), Some(1));
}

// =============================================================================
// State Transitions
// =============================================================================

/// Orders move one way: open cart -> placed.
#[test]
fn test_finalize_is_one_way() {
    let mut order = Order::new();
    order.add_product(ProductId::new(1), 2);
    assert!(!order.is_placed());

    order.finalize(Utc::now());
    assert!(order.is_placed());
    assert!(order.ordered_at.is_some());
}

#[test]
fn test_placed_order_keeps_its_items() {
    let mut order = Order::new();
    order.add_product(ProductId::new(1), 2);
    order.add_product(ProductId::new(2), 4);

    order.finalize(Utc::now());
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.unit_count(), 6);
}

// =============================================================================
// View Mapping
// =============================================================================

#[test]
fn test_order_view_reflects_the_aggregate() {
    let mut order = Order::new();
    order.add_product(ProductId::new(7), 3);

    let view = OrderView::from(&order);
    assert!(view.id.is_none());
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.unit_count, 3);
    assert!(!view.placed);
}

#[test]
fn test_order_view_serializes_to_json() {
    let mut order = Order::new();
    order.add_product(ProductId::new(7), 3);

    let json = serde_json::to_value(OrderView::from(&order)).expect("view serializes");
    assert_eq!(json["unit_count"], 3);
    assert_eq!(json["items"][0]["product_id"], 7);
    assert_eq!(json["placed"], false);
}
