//! User model.
//!
//! Users are owned by the wider application's identity layer; orders only
//! hold an optional reference to one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use golden_fig_core::{Email, UserId};

/// A registered customer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
