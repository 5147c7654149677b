//! Legacy WHOIS gateway client.
//!
//! WHOIS itself speaks a bare TCP protocol; this client goes through an
//! HTTP gateway that proxies the query and returns the raw registry text,
//! optionally wrapped in a JSON status envelope.

use crate::error::DomainQueryError;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "domain-query/0.3";

/// The gateway's JSON envelope. `status == 1` means the upstream query
/// succeeded; anything else carries a failure even under HTTP 200.
#[derive(Debug, Deserialize)]
struct GatewayEnvelope {
    status: Option<i64>,
    error: Option<String>,
    data: Option<GatewayData>,
}

#[derive(Debug, Deserialize)]
struct GatewayData {
    #[serde(alias = "whois_raw")]
    raw: Option<String>,
}

/// HTTP client for the WHOIS gateway.
#[derive(Clone)]
pub struct WhoisClient {
    http_client: reqwest::Client,
    gateway_url: String,
    timeout: Duration,
}

impl WhoisClient {
    /// Create a client against `gateway_url` with a bounded timeout.
    pub fn new(gateway_url: &str, timeout: Duration) -> Result<Self, DomainQueryError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                DomainQueryError::network_with_source(
                    "Failed to create WHOIS HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            gateway_url: gateway_url.to_string(),
            timeout,
        })
    }

    /// Query the gateway for `identifier`, asking for the raw WHOIS text.
    pub async fn query(&self, identifier: &str) -> Result<String, DomainQueryError> {
        debug!(identifier = %identifier, "issuing WHOIS gateway query");

        let result = tokio::time::timeout(self.timeout, self.execute(identifier)).await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(DomainQueryError::timeout("WHOIS gateway query", self.timeout)),
        }
    }

    async fn execute(&self, identifier: &str) -> Result<String, DomainQueryError> {
        let response = self
            .http_client
            .get(&self.gateway_url)
            .query(&[("domain", identifier), ("raw", "1")])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DomainQueryError::whois(format!("gateway request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainQueryError::whois(format!("unreadable gateway body: {}", e)))?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                format!("gateway returned HTTP {}", status)
            } else {
                format!("gateway returned HTTP {}: {}", status, body.trim())
            };
            return Err(DomainQueryError::whois(message));
        }

        // Plain-text gateways answer with the registry output directly;
        // JSON gateways wrap it in a status envelope.
        let Ok(envelope) = serde_json::from_str::<GatewayEnvelope>(&body) else {
            return Ok(body);
        };

        match envelope.status {
            Some(1) => {
                if let Some(raw) = envelope.data.and_then(|d| d.raw) {
                    Ok(raw)
                } else {
                    // Envelope claimed success but carried no payload field;
                    // hand the parser the body and let it degrade gracefully.
                    Ok(body)
                }
            }
            _ => Err(DomainQueryError::whois(
                envelope
                    .error
                    .unwrap_or_else(|| "gateway reported lookup failure".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WhoisClient::new("https://api.whoiscx.com/whois/", Duration::from_secs(15));
        assert!(client.is_ok());
    }

    #[test]
    fn test_envelope_deserializes_raw_alias() {
        let env: GatewayEnvelope = serde_json::from_str(
            r#"{"status": 1, "data": {"whois_raw": "Domain Name: EXAMPLE.COM"}}"#,
        )
        .unwrap();
        assert_eq!(env.status, Some(1));
        assert_eq!(
            env.data.unwrap().raw.as_deref(),
            Some("Domain Name: EXAMPLE.COM")
        );
    }

    #[test]
    fn test_envelope_failure_status() {
        let env: GatewayEnvelope =
            serde_json::from_str(r#"{"status": 0, "error": "quota exhausted"}"#).unwrap();
        assert_eq!(env.status, Some(0));
        assert_eq!(env.error.as_deref(), Some("quota exhausted"));
    }
}
