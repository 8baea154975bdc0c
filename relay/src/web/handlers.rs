//! Webhook endpoint handlers.
//!
//! The IPN handler is deliberately thin:
//! 1. Verify the webhook key
//! 2. Extract the region hint from the form body
//! 3. Forward the untouched body to the resolved regional backend
//! 4. Relay the backend's outcome
//!
//! All region knowledge lives in the routing directory built at startup.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::forward::forward_ipn;
use crate::routing::{region_hint, RegionDirectory};
use crate::web::auth::verify_webhook_key;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<RegionDirectory>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, directory: RegionDirectory, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(directory),
            http,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// PayPal IPN Relay
// =============================================================================

/// Query parameters on the relay endpoint.
#[derive(Debug, Deserialize)]
pub struct IpnQuery {
    /// Shared secret PayPal presents on every callback
    #[serde(default)]
    pub key: String,
}

/// PayPal IPN relay endpoint.
///
/// Authenticates the callback, resolves the target region from the `custom`
/// form field, forwards the original body in its original field order, and
/// maps the downstream outcome: 2xx becomes an empty 200, any other status
/// is propagated verbatim, and a transport failure becomes a 500 naming the
/// region.
pub async fn paypal_ipn(
    State(state): State<AppState>,
    Query(query): Query<IpnQuery>,
    body: String,
) -> Response {
    debug!(body_length = body.len(), "paypal_ipn_received");

    if !verify_webhook_key(&query.key, state.config.webhook_key.as_deref()) {
        warn!("webhook_key_invalid");
        return (StatusCode::UNAUTHORIZED, "Invalid webhook key").into_response();
    }

    // Keep the raw ordered pairs; the backend must receive the body as sent.
    let fields: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();

    let hint = region_hint(&fields);

    let decision = match state.directory.resolve(&hint) {
        Ok(decision) => decision,
        Err(e) => {
            error!(error = %e, "default_region_missing");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    metrics::counter!(
        "billing_relay_cloud_region_requests_total",
        "region" => decision.region.to_lowercase()
    )
    .increment(1);

    match forward_ipn(&state.http, &decision.target_url, &fields).await {
        Ok(outcome) if outcome.is_success() => {
            debug!(region = %decision.region, "ipn_forwarded");
            StatusCode::OK.into_response()
        }
        Ok(outcome) => {
            warn!(
                region = %decision.region,
                status = outcome.status.as_u16(),
                "ipn_forward_unexpected_status"
            );
            (outcome.status, outcome.body).into_response()
        }
        Err(e) => {
            error!(region = %decision.region, error = %e, "ipn_forward_failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Encountered an unexpected error while calling PayPal IPN for the region {}",
                    decision.region
                ),
            )
                .into_response()
        }
    }
}
