//! RDAP aggregator client.
//!
//! Queries the configured RDAP aggregator for an object type/identifier
//! pair and classifies HTTP failure modes. Success returns the raw RDAP
//! JSON; normalization happens separately in [`crate::normalize`].

use crate::error::DomainQueryError;
use crate::types::ObjectType;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "domain-query/0.3";

/// HTTP client for the RDAP aggregator.
#[derive(Clone)]
pub struct RdapClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RdapClient {
    /// Create a client against `base_url` with a bounded request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DomainQueryError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                DomainQueryError::network_with_source(
                    "Failed to create RDAP HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Query the aggregator at `/{objectType}/{identifier}`.
    ///
    /// Returns the raw RDAP JSON body on success. Failures are classified
    /// by HTTP status; a 404 on a domain lookup is flagged as "suffix
    /// likely unsupported" so the orchestrator can fall back to WHOIS.
    /// Network failures carry status code 0 and the underlying error text.
    pub async fn query(
        &self,
        object_type: ObjectType,
        identifier: &str,
    ) -> Result<Value, DomainQueryError> {
        let url = self.build_url(object_type, identifier)?;
        debug!(url = %url, "issuing RDAP query");

        let result = tokio::time::timeout(self.timeout, self.execute(&url, object_type)).await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(DomainQueryError::rdap(
                format!("request timed out after {:?}", self.timeout),
                0,
            )),
        }
    }

    fn build_url(
        &self,
        object_type: ObjectType,
        identifier: &str,
    ) -> Result<reqwest::Url, DomainQueryError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| DomainQueryError::config(format!("invalid RDAP base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DomainQueryError::config("RDAP base URL cannot carry path segments"))?
            .push(object_type.as_path_segment())
            .push(identifier);
        Ok(url)
    }

    async fn execute(
        &self,
        url: &reqwest::Url,
        object_type: ObjectType,
    ) -> Result<Value, DomainQueryError> {
        let response = self
            .http_client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DomainQueryError::rdap(format!("request failed: {}", e), 0))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| DomainQueryError::rdap(format!("invalid JSON body: {}", e), 0));
        }

        // The aggregator's own error body is JSON when it feels like it;
        // a non-JSON body must not derail classification.
        let upstream_detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("title")
                    .or_else(|| body.get("error"))
                    .and_then(|t| t.as_str())
                    .map(String::from)
            });

        debug!(status = %status, detail = ?upstream_detail, "RDAP query failed");
        Err(classify_status(status, object_type, upstream_detail))
    }
}

/// Map an RDAP HTTP failure status onto the error taxonomy.
fn classify_status(
    status: StatusCode,
    object_type: ObjectType,
    upstream_detail: Option<String>,
) -> DomainQueryError {
    let with_detail = |base: &str| match &upstream_detail {
        Some(detail) => format!("{} ({})", base, detail),
        None => base.to_string(),
    };

    match status {
        StatusCode::NOT_FOUND => {
            if object_type == ObjectType::Domain {
                DomainQueryError::rdap_domain_not_supported(with_detail(
                    "domain not found via RDAP; its suffix may lack RDAP coverage, try WHOIS",
                ))
            } else {
                DomainQueryError::rdap(with_detail("object not found"), 404)
            }
        }
        StatusCode::TOO_MANY_REQUESTS => {
            DomainQueryError::rdap(with_detail("upstream rate limited the request"), 429)
        }
        StatusCode::BAD_REQUEST => DomainQueryError::rdap(with_detail("malformed request"), 400),
        StatusCode::FORBIDDEN => DomainQueryError::rdap(with_detail("access denied"), 403),
        s if s.is_server_error() => DomainQueryError::rdap(
            with_detail("upstream registry unavailable"),
            s.as_u16(),
        ),
        s => DomainQueryError::rdap(
            with_detail(&format!("RDAP query failed with status {}", s)),
            s.as_u16(),
        ),
    }
}
