//! Database operations for the shop `PostgreSQL`.
//!
//! ## Tables (schema `shop`)
//!
//! - `orders` - Customer orders, open (cart) or placed
//! - `order_items` - Order line items, one per distinct product
//! - `products` - Catalog products (read-only here)
//! - `users` - Customers (owned by the identity layer, read-only here)
//!
//! The tower-sessions store manages its own table.
//!
//! # Migrations
//!
//! Migrations live in `crates/shop/migrations/` and are embedded via
//! `sqlx::migrate!`, applied at startup.

pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
