//! Region routing - mapping a payload's region hint to a billing backend.
//!
//! PayPal IPN payloads carry a free-form `custom` field whose comma-separated
//! metadata may include a `region:<code>` token. The directory built here
//! turns that hint into a concrete target URL, falling back to the default
//! region whenever the hint is missing or unknown.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// A single region's billing backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionEndpoint {
    /// URL prefix of the backend, e.g. `https://billing.example.com`
    pub base_address: String,
    /// Forwarding credential appended to the outbound URL
    pub webhook_key: String,
}

/// Routing failure that cannot be recovered by falling back.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no {0} region configured and no matching region found")]
    MissingDefaultRegion(String),
}

/// Resolved destination for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    /// Region code the request resolved to, for logs and metrics
    pub region: String,
    /// Fully-formed URL of the regional IPN endpoint
    pub target_url: String,
}

/// Immutable region code -> endpoint lookup table.
///
/// Built once at startup and shared read-only across request tasks. Lookups
/// are case-insensitive: keys are lowercased on build and queries are
/// lowercased identically.
#[derive(Debug)]
pub struct RegionDirectory {
    entries: HashMap<String, RegionEndpoint>,
    default_region: String,
}

impl RegionDirectory {
    /// Build the directory from configured endpoints.
    ///
    /// Region codes are normalized to lowercase and base addresses have
    /// trailing slashes stripped, so resolution is pure lookup plus format.
    pub fn new(endpoints: HashMap<String, RegionEndpoint>, default_region: &str) -> Self {
        let entries = endpoints
            .into_iter()
            .map(|(code, endpoint)| {
                (
                    code.to_lowercase(),
                    RegionEndpoint {
                        base_address: endpoint.base_address.trim_end_matches('/').to_string(),
                        webhook_key: endpoint.webhook_key,
                    },
                )
            })
            .collect();

        Self {
            entries,
            default_region: default_region.to_string(),
        }
    }

    /// Whether the default region has an entry.
    pub fn has_default_region(&self) -> bool {
        self.entries
            .contains_key(&self.default_region.to_lowercase())
    }

    /// Resolve a region hint to a destination.
    ///
    /// An empty hint goes straight to the default region. A non-empty hint
    /// that is not in the directory is logged and also falls back. Only a
    /// missing default entry is an error.
    pub fn resolve(&self, hint: &str) -> Result<RoutingDecision, RoutingError> {
        if !hint.is_empty() {
            if let Some(endpoint) = self.entries.get(&hint.to_lowercase()) {
                return Ok(decision(hint, endpoint));
            }

            warn!(
                region = hint,
                default_region = %self.default_region,
                "region_not_in_directory"
            );
        }

        let endpoint = self
            .entries
            .get(&self.default_region.to_lowercase())
            .ok_or_else(|| RoutingError::MissingDefaultRegion(self.default_region.clone()))?;

        Ok(decision(&self.default_region, endpoint))
    }
}

/// Build the decision for a region, forming the outbound IPN URL.
fn decision(region: &str, endpoint: &RegionEndpoint) -> RoutingDecision {
    RoutingDecision {
        region: region.to_string(),
        target_url: format!(
            "{}/paypal/ipn?key={}",
            endpoint.base_address, endpoint.webhook_key
        ),
    }
}

/// Extract the region hint from the ordered form fields.
///
/// Looks at the first field named `custom` (case-insensitive) and scans its
/// value for a `region:` token, capturing up to the next comma or the end of
/// the string. Returns an empty hint when the field or token is absent.
pub fn region_hint(fields: &[(String, String)]) -> String {
    let Some((_, custom)) = fields
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("custom"))
    else {
        return String::new();
    };

    match custom.find("region:") {
        Some(start) => {
            let value = &custom[start + "region:".len()..];
            let end = value.find(',').unwrap_or(value.len());
            value[..end].to_string()
        }
        None => String::new(),
    }
}
