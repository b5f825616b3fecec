//! Domain models for the shop.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{Order, OrderItem};
pub use product::Product;
pub use session::CurrentUser;
pub use user::User;
