//! Order aggregate service: the session-bound cart and checkout workflow.
//!
//! The caller's session holds the ID of its open order (the cart) under
//! [`keys::CURRENT_ORDER`]. Every operation takes the session handle
//! explicitly; nothing here reaches into ambient state.
//!
//! Orders move one way: open cart -> placed. Placing an order clears the
//! session binding, so the next cart mutation starts a fresh order.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;

use golden_fig_core::{Email, OrderId, OrderItemId};

use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::order::Order;
use crate::models::session::keys;
use crate::models::{Product, User};
use crate::services::email::{EmailError, EmailService, OrderEmailLine};

/// Errors from cart and checkout operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store operation failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Notification email failed to render or send.
    #[error("email error: {0}")]
    Email(#[from] EmailError),

    /// Counts below one are rejected rather than silently accepted.
    #[error("count must be at least 1, got {0}")]
    InvalidCount(i32),

    /// A placed order cannot be mutated or placed again.
    #[error("order is already placed")]
    AlreadyPlaced,

    /// Placing an order requires a customer email for the confirmation.
    #[error("order has no customer email")]
    MissingCustomerEmail,

    /// The item does not belong to the session's open order.
    #[error("item {0} is not part of the current order")]
    ItemNotInOrder(OrderItemId),
}

/// Read the current order ID from the session.
async fn stored_order_id(
    session: &Session,
) -> Result<Option<OrderId>, tower_sessions::session::Error> {
    session.get::<OrderId>(keys::CURRENT_ORDER).await
}

/// Record the current order ID in the session.
async fn store_order_id(
    session: &Session,
    id: OrderId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_ORDER, id).await
}

/// Clear the session's order binding.
async fn clear_order_id(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<OrderId>(keys::CURRENT_ORDER).await?;
    Ok(())
}

/// The session-bound cart and checkout service.
///
/// Borrowed from [`AppState`](crate::state::AppState) per request; cheap to
/// construct.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    mailer: &'a EmailService,
    admin_email: &'a Email,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, mailer: &'a EmailService, admin_email: &'a Email) -> Self {
        Self {
            pool,
            mailer,
            admin_email,
        }
    }

    /// The session's open order, or a fresh unpersisted cart.
    ///
    /// A missing session key, a dangling ID, and an ID pointing at an
    /// already-placed order all fall back to a new empty order. This never
    /// yields a placed order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session store or the database fails.
    pub async fn current_order(&self, session: &Session) -> Result<Order, OrderError> {
        if let Some(id) = stored_order_id(session).await? {
            if let Some(order) = OrderRepository::new(self.pool).find_with_items(id).await?
                && !order.is_placed()
            {
                return Ok(order);
            }
        }

        Ok(Order::new())
    }

    /// Add `count` units of a product to the session's cart and persist it.
    ///
    /// Merges into the existing line item when the cart already holds this
    /// product, matched by catalog ID.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidCount` for counts below one.
    pub async fn add_product(
        &self,
        session: &Session,
        product: &Product,
        count: i32,
        user: Option<&User>,
    ) -> Result<Order, OrderError> {
        if count < 1 {
            return Err(OrderError::InvalidCount(count));
        }

        let mut order = self.current_order(session).await?;
        order.add_product(product.id, count);
        self.save(session, &mut order, user).await?;

        Ok(order)
    }

    /// Persist the order graph and record its ID in the session.
    ///
    /// Attaches the user to the order when one is supplied. The graph write
    /// is a single transaction; the session pointer is written after it and
    /// is re-derivable, so a stale value only costs the caller a fresh cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write or the session write fails.
    pub async fn save(
        &self,
        session: &Session,
        order: &mut Order,
        user: Option<&User>,
    ) -> Result<OrderId, OrderError> {
        if let Some(user) = user {
            order.user_id = Some(user.id);
        }

        let id = OrderRepository::new(self.pool).save(order).await?;
        store_order_id(session, id).await?;

        Ok(id)
    }

    /// Remove a line item from the session's open order and persist it.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::ItemNotInOrder` if the current order holds no
    /// such item.
    pub async fn remove_item(
        &self,
        session: &Session,
        item_id: OrderItemId,
    ) -> Result<Order, OrderError> {
        let mut order = self.current_order(session).await?;
        order
            .remove_item(item_id)
            .ok_or(OrderError::ItemNotInOrder(item_id))?;

        OrderRepository::new(self.pool).delete_item(item_id).await?;
        self.save(session, &mut order, None).await?;

        Ok(order)
    }

    /// Place the order: stamp it, persist it, unbind it from the session,
    /// and send the admin and customer notifications.
    ///
    /// The session binding is cleared before the emails go out, so the next
    /// cart mutation starts a fresh order even if delivery fails. Email
    /// errors propagate; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::AlreadyPlaced` for an already-placed order and
    /// `OrderError::MissingCustomerEmail` when no confirmation address is
    /// set.
    pub async fn place_order(
        &self,
        session: &Session,
        order: &mut Order,
    ) -> Result<OrderId, OrderError> {
        if order.is_placed() {
            return Err(OrderError::AlreadyPlaced);
        }
        let customer_email = order
            .customer_email
            .clone()
            .ok_or(OrderError::MissingCustomerEmail)?;

        order.finalize(Utc::now());
        let order_id = self.save(session, order, None).await?;
        clear_order_id(session).await?;

        tracing::info!(order_id = %order_id, "Order placed");

        let lines = self.email_lines(order).await?;
        self.mailer
            .send_admin_order_notification(self.admin_email, order_id, &lines)
            .await?;
        self.mailer
            .send_customer_order_confirmation(&customer_email, order_id, &lines)
            .await?;

        Ok(order_id)
    }

    /// Resolve line items to product titles for the notification emails.
    async fn email_lines(&self, order: &Order) -> Result<Vec<OrderEmailLine>, OrderError> {
        let products = ProductRepository::new(self.pool);

        let mut lines = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let title = products
                .get_by_id(item.product_id)
                .await?
                .map_or_else(|| format!("product #{}", item.product_id), |p| p.title);
            lines.push(OrderEmailLine {
                title,
                count: item.count,
            });
        }

        Ok(lines)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use super::*;

    fn test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_fresh_session_has_no_stored_order() {
        let session = test_session();
        assert!(stored_order_id(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_then_read_order_id() {
        let session = test_session();
        store_order_id(&session, OrderId::new(7)).await.unwrap();
        assert_eq!(
            stored_order_id(&session).await.unwrap(),
            Some(OrderId::new(7))
        );
    }

    #[tokio::test]
    async fn test_clear_order_id_unbinds_session() {
        let session = test_session();
        store_order_id(&session, OrderId::new(7)).await.unwrap();
        clear_order_id(&session).await.unwrap();
        assert!(stored_order_id(&session).await.unwrap().is_none());
    }
}
