//! Billing Relay - regional router for PayPal IPN webhooks.
//!
//! PayPal only delivers Instant Payment Notifications to a single URL, but
//! billing runs in more than one cloud region. This crate receives each IPN
//! callback once, decides which region's billing backend should process it,
//! and forwards the untouched form body there.
//!
//! ## Request flow
//!
//! ```text
//! PayPal → POST /paypal/ipn → key check → region lookup → regional backend
//! ```

pub mod config;
pub mod forward;
pub mod routing;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use forward::{encode_form, forward_ipn, ForwardOutcome};
pub use routing::{region_hint, RegionDirectory, RegionEndpoint, RoutingDecision, RoutingError};
pub use web::AppState;
