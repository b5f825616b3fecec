//! Order repository for database operations.
//!
//! Persists the order aggregate (order row plus line items). The whole graph
//! is written inside one transaction so a crash never leaves a half-saved
//! order behind.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use golden_fig_core::{Email, OrderId, OrderItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem};

/// Row shape for `shop.orders`.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    customer_email: Option<Email>,
    ordered_at: Option<DateTime<Utc>>,
}

/// Row shape for `shop.order_items`.
#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    count: i32,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: Some(row.id),
            order_id: Some(row.order_id),
            product_id: row.product_id,
            count: row.count,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load an order and its line items by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_with_items(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, user_id, customer_email, ordered_at
            FROM shop.orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT id, order_id, product_id, count
            FROM shop.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Order {
            id: Some(row.id),
            user_id: row.user_id,
            customer_email: row.customer_email,
            items: items.into_iter().map(OrderItem::from).collect(),
            ordered_at: row.ordered_at,
        }))
    }

    /// Write the order and all of its line items in one transaction.
    ///
    /// Inserts the order row on first save and fills in the generated IDs on
    /// the aggregate; subsequent saves update in place. New line items are
    /// upserted keyed on `(order_id, product_id)`, which also backs the
    /// one-item-per-product invariant at the storage level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order row no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn save(&self, order: &mut Order) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id = match order.id {
            Some(id) => {
                let result = sqlx::query(
                    r"
                    UPDATE shop.orders
                    SET user_id = $2, customer_email = $3, ordered_at = $4, updated_at = now()
                    WHERE id = $1
                    ",
                )
                .bind(id)
                .bind(order.user_id)
                .bind(order.customer_email.clone())
                .bind(order.ordered_at)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound);
                }
                id
            }
            None => {
                sqlx::query_scalar(
                    r"
                    INSERT INTO shop.orders (user_id, customer_email, ordered_at)
                    VALUES ($1, $2, $3)
                    RETURNING id
                    ",
                )
                .bind(order.user_id)
                .bind(order.customer_email.clone())
                .bind(order.ordered_at)
                .fetch_one(&mut *tx)
                .await?
            }
        };
        order.id = Some(order_id);

        for item in &mut order.items {
            item.order_id = Some(order_id);
            match item.id {
                Some(item_id) => {
                    sqlx::query("UPDATE shop.order_items SET count = $2 WHERE id = $1")
                        .bind(item_id)
                        .bind(item.count)
                        .execute(&mut *tx)
                        .await?;
                }
                None => {
                    let item_id: OrderItemId = sqlx::query_scalar(
                        r"
                        INSERT INTO shop.order_items (order_id, product_id, count)
                        VALUES ($1, $2, $3)
                        ON CONFLICT (order_id, product_id)
                        DO UPDATE SET count = EXCLUDED.count
                        RETURNING id
                        ",
                    )
                    .bind(order_id)
                    .bind(item.product_id)
                    .bind(item.count)
                    .fetch_one(&mut *tx)
                    .await?;
                    item.id = Some(item_id);
                }
            }
        }

        tx.commit().await?;

        Ok(order_id)
    }

    /// Delete a single line item row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_item(&self, item_id: OrderItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.order_items WHERE id = $1")
            .bind(item_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
