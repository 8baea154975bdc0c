//! Outbound delivery - re-encoding and forwarding the IPN body.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use url::form_urlencoded;

/// Downstream response to a forwarded notification.
#[derive(Debug)]
pub struct ForwardOutcome {
    pub status: StatusCode,
    pub body: String,
}

impl ForwardOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Re-encode form fields, preserving their original order.
///
/// Downstream signature checks and log tooling may depend on field order,
/// so the body is rebuilt pair by pair instead of round-tripping through a
/// struct.
pub fn encode_form(fields: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

/// Forward the notification to the resolved regional endpoint.
///
/// One attempt only; any transport error (connect failure, timeout,
/// cancellation) surfaces as the `Err` variant.
pub async fn forward_ipn(
    client: &Client,
    target_url: &str,
    fields: &[(String, String)],
) -> Result<ForwardOutcome, reqwest::Error> {
    let response = client
        .post(target_url)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(encode_form(fields))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    Ok(ForwardOutcome { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_form_preserves_order() {
        let fields = pairs(&[("zeta", "1"), ("alpha", "2"), ("mango", "3")]);
        assert_eq!(encode_form(&fields), "zeta=1&alpha=2&mango=3");

        let reversed = pairs(&[("mango", "3"), ("alpha", "2"), ("zeta", "1")]);
        assert_eq!(encode_form(&reversed), "mango=3&alpha=2&zeta=1");
    }

    #[test]
    fn test_encode_form_escapes_values() {
        let fields = pairs(&[("custom", "region:EU,credit:1"), ("payer", "a b+c")]);
        assert_eq!(
            encode_form(&fields),
            "custom=region%3AEU%2Ccredit%3A1&payer=a+b%2Bc"
        );
    }

    #[test]
    fn test_encode_form_keeps_duplicate_keys() {
        let fields = pairs(&[("item", "1"), ("item", "2")]);
        assert_eq!(encode_form(&fields), "item=1&item=2");
    }

    #[tokio::test]
    async fn test_forward_ipn_returns_downstream_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/paypal/ipn")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "us-key".into()))
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("txn_id=1&custom=region%3AUS")
            .with_status(400)
            .with_body("BAD REQUEST")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let fields = pairs(&[("txn_id", "1"), ("custom", "region:US")]);
        let url = format!("{}/paypal/ipn?key=us-key", server.url());

        let outcome = forward_ipn(&client, &url, &fields).await.unwrap();

        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert_eq!(outcome.body, "BAD REQUEST");
        assert!(!outcome.is_success());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forward_ipn_transport_error() {
        let client = reqwest::Client::new();
        let fields = pairs(&[("txn_id", "1")]);

        // Nothing listens on this port
        let result = forward_ipn(&client, "http://127.0.0.1:1/paypal/ipn?key=k", &fields).await;

        assert!(result.is_err());
    }
}
