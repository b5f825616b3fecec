//! Session-related types.
//!
//! Types and keys for state carried in the caller's session.

use serde::{Deserialize, Serialize};

use golden_fig_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. Set by
/// the wider application's auth layer; read here to attach orders to users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys for cart and checkout state.
pub mod keys {
    /// Key for the ID of the session's open order (the cart).
    pub const CURRENT_ORDER: &str = "current_order";

    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
