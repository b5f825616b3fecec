//! Application services.

pub mod email;
pub mod orders;

pub use email::EmailService;
pub use orders::OrderService;
