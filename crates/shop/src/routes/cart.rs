//! Cart route handlers.
//!
//! A thin JSON surface over the order service. The caller's session carries
//! the cart binding; handlers never touch it directly beyond reading the
//! logged-in user.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use golden_fig_core::{OrderId, OrderItemId, ProductId};

use crate::db::{ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::order::Order;
use crate::models::session::keys;
use crate::models::{CurrentUser, User};
use crate::state::AppState;

/// Line item display data.
#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub id: Option<OrderItemId>,
    pub product_id: ProductId,
    pub count: i32,
}

/// Cart/order display data.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: Option<OrderId>,
    pub items: Vec<OrderItemView>,
    pub unit_count: i64,
    pub placed: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    id: item.id,
                    product_id: item.product_id,
                    count: item.count,
                })
                .collect(),
            unit_count: order.unit_count(),
            placed: order.is_placed(),
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub count: Option<i32>,
}

/// Remove item request body.
#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub item_id: OrderItemId,
}

/// Load the session's logged-in user, if any.
///
/// The auth layer of the wider application stores a [`CurrentUser`] in the
/// session; the cart only needs it to attach orders to their owner.
pub(crate) async fn current_user(state: &AppState, session: &Session) -> Result<Option<User>> {
    let Some(current) = session.get::<CurrentUser>(keys::CURRENT_USER).await? else {
        return Ok(None);
    };

    Ok(UserRepository::new(state.pool()).get_by_id(current.id).await?)
}

/// Show the current cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<OrderView>> {
    let order = state.orders().current_order(&session).await?;
    Ok(Json(OrderView::from(&order)))
}

/// Add a product to the cart.
///
/// Creates a new cart if the session has none, merges counts if the product
/// is already in it.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<OrderView>> {
    let count = req.count.unwrap_or(1);

    let product = ProductRepository::new(state.pool())
        .get_by_id(req.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", req.product_id)))?;

    let user = current_user(&state, &session).await?;
    let order = state
        .orders()
        .add_product(&session, &product, count, user.as_ref())
        .await?;

    Ok(Json(OrderView::from(&order)))
}

/// Remove a line item from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RemoveItemRequest>,
) -> Result<Json<OrderView>> {
    let order = state.orders().remove_item(&session, req.item_id).await?;
    Ok(Json(OrderView::from(&order)))
}
