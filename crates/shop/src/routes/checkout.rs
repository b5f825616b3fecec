//! Checkout route handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use golden_fig_core::{Email, OrderId};

use crate::error::{AppError, Result};
use crate::routes::cart::current_user;
use crate::state::AppState;

/// Checkout request body.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Confirmation address for guest checkout. Optional for logged-in
    /// customers, whose account address is used instead.
    pub email: Option<String>,
}

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
}

/// Place the session's current order.
///
/// Finalizes the cart, unbinds it from the session, and sends the admin and
/// customer notifications.
#[instrument(skip(state, session))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let mut order = state.orders().current_order(&session).await?;

    if order.items.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    if let Some(raw) = req.email {
        let email = Email::parse(&raw)
            .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
        order.customer_email = Some(email);
    } else if order.customer_email.is_none()
        && let Some(user) = current_user(&state, &session).await?
    {
        order.customer_email = Some(user.email);
    }

    let order_id = state.orders().place_order(&session, &mut order).await?;

    Ok(Json(CheckoutResponse { order_id }))
}
