//! Catalog product model.
//!
//! Products are owned by the catalog; this service only ever reads them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use golden_fig_core::ProductId;

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Product's database ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in the shop currency.
    pub price: Decimal,
}
