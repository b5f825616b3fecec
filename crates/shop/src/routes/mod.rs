//! HTTP route handlers for the shop.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health        - Liveness check (in main)
//! GET  /health/ready  - Readiness check (in main)
//!
//! # Cart
//! GET  /cart          - Current cart
//! POST /cart/add      - Add a product to the cart
//! POST /cart/remove   - Remove a line item
//!
//! # Checkout
//! POST /checkout      - Place the current order
//! ```

pub mod cart;
pub mod checkout;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create all routes for the shop.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::place))
}
