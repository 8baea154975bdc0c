//! Web server module for the inbound relay endpoint.
//!
//! The handlers authenticate each notification, pick a region, forward the
//! raw body to that region's billing backend, and relay the outcome.

pub mod auth;
pub mod handlers;

pub use auth::verify_webhook_key;
pub use handlers::{health, paypal_ipn, AppState, HealthResponse, IpnQuery};
