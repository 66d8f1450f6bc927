//! Server HTTP handlers.

mod api;
mod health;

pub use api::api_handler;
pub use health::health_handler;
