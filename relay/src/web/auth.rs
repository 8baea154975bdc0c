//! Inbound webhook key verification.
//!
//! PayPal is configured to call the relay with a shared secret in the `key`
//! query parameter. The check runs before the body is touched.

use tracing::{error, warn};

/// Verify the caller-supplied webhook key against the configured secret.
///
/// Rejects when the provided key is empty, when no secret is configured
/// (logged as a configuration error), or when the comparison fails.
pub fn verify_webhook_key(provided: &str, configured: Option<&str>) -> bool {
    if provided.is_empty() {
        return false;
    }

    let configured = match configured {
        Some(key) if !key.is_empty() => key,
        _ => {
            error!("webhook_key_not_configured");
            return false;
        }
    };

    let valid = constant_time_compare(provided, configured);

    if !valid {
        warn!(provided_length = provided.len(), "webhook_key_mismatch");
    }

    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_webhook_key_valid() {
        assert!(verify_webhook_key("secret123", Some("secret123")));
    }

    #[test]
    fn test_verify_webhook_key_mismatch() {
        assert!(!verify_webhook_key("secret123", Some("other-secret")));
    }

    #[test]
    fn test_verify_webhook_key_empty_provided() {
        assert!(!verify_webhook_key("", Some("secret123")));
    }

    #[test]
    fn test_verify_webhook_key_not_configured() {
        assert!(!verify_webhook_key("secret123", None));
        assert!(!verify_webhook_key("secret123", Some("")));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
