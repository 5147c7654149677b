//! Engine configuration.
//!
//! Settings cover the upstream endpoints, per-client timeouts, quota
//! ceilings, the shared authentication secret, and cache freshness.
//! Values come from `EngineConfig::default()` adjusted by `with_*`
//! builders, or from `DQ_*` environment variables.

use crate::types::AuthMode;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for a [`QueryEngine`](crate::QueryEngine) instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the RDAP aggregator.
    pub rdap_base_url: String,

    /// URL of the legacy WHOIS HTTP gateway.
    pub whois_gateway_url: String,

    /// URL of the root-zone TLD list used for the supported-suffix listing.
    pub suffix_source_url: String,

    /// Timeout for RDAP aggregator requests.
    pub rdap_timeout: Duration,

    /// Timeout for WHOIS gateway requests.
    pub whois_timeout: Duration,

    /// Sliding quota window length.
    pub quota_window: Duration,

    /// Per-window ceiling for detail lookups (resolve, price).
    pub detail_ceiling: u32,

    /// Per-window ceiling for the bulk suffix listing.
    pub listing_ceiling: u32,

    /// Interval of the background sweep that evicts lapsed quota windows.
    pub sweep_interval: Duration,

    /// Freshness window of the cached suffix listing.
    pub suffix_cache_ttl: Duration,

    /// Shared secret; `None` disables authentication entirely.
    pub auth_secret: Option<String>,

    /// Mode granted to an authenticated caller (deployment setting).
    pub auth_mode: AuthMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rdap_base_url: "https://rdap.org".to_string(),
            whois_gateway_url: "https://api.whoiscx.com/whois/".to_string(),
            suffix_source_url: "https://data.iana.org/TLD/tlds-alpha-by-domain.txt".to_string(),
            rdap_timeout: Duration::from_secs(10),
            whois_timeout: Duration::from_secs(15),
            quota_window: Duration::from_secs(60),
            detail_ceiling: 12,
            listing_ceiling: 30,
            sweep_interval: Duration::from_secs(5 * 60),
            suffix_cache_ttl: Duration::from_secs(3600),
            auth_secret: None,
            auth_mode: AuthMode::Admin,
        }
    }
}

impl EngineConfig {
    /// Set the RDAP aggregator base URL.
    pub fn with_rdap_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.rdap_base_url = url.into();
        self
    }

    /// Set the WHOIS gateway URL.
    pub fn with_whois_gateway_url<S: Into<String>>(mut self, url: S) -> Self {
        self.whois_gateway_url = url.into();
        self
    }

    /// Set the root-zone suffix source URL.
    pub fn with_suffix_source_url<S: Into<String>>(mut self, url: S) -> Self {
        self.suffix_source_url = url.into();
        self
    }

    /// Set the RDAP request timeout.
    pub fn with_rdap_timeout(mut self, timeout: Duration) -> Self {
        self.rdap_timeout = timeout;
        self
    }

    /// Set the WHOIS request timeout.
    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Set the quota window length.
    pub fn with_quota_window(mut self, window: Duration) -> Self {
        self.quota_window = window;
        self
    }

    /// Set the per-window ceiling for detail lookups.
    pub fn with_detail_ceiling(mut self, ceiling: u32) -> Self {
        self.detail_ceiling = ceiling;
        self
    }

    /// Set the per-window ceiling for the bulk suffix listing.
    pub fn with_listing_ceiling(mut self, ceiling: u32) -> Self {
        self.listing_ceiling = ceiling;
        self
    }

    /// Set the shared authentication secret.
    pub fn with_auth_secret<S: Into<String>>(mut self, secret: S) -> Self {
        self.auth_secret = Some(secret.into());
        self
    }

    /// Set the mode granted to authenticated callers.
    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = mode;
        self
    }

    /// Set the suffix cache freshness window.
    pub fn with_suffix_cache_ttl(mut self, ttl: Duration) -> Self {
        self.suffix_cache_ttl = ttl;
        self
    }
}

/// Load configuration overrides from `DQ_*` environment variables.
///
/// Recognized variables:
/// - `DQ_RDAP_URL`, `DQ_WHOIS_URL`, `DQ_SUFFIX_URL` — endpoint overrides
/// - `DQ_AUTH_SECRET` — shared secret enabling authentication
/// - `DQ_AUTH_MODE` — "admin" (default) or "personal"
/// - `DQ_DETAIL_CEILING`, `DQ_LISTING_CEILING` — per-window quota ceilings
pub fn load_env_config() -> EngineConfig {
    let mut config = EngineConfig::default();

    if let Ok(url) = env::var("DQ_RDAP_URL") {
        if !url.trim().is_empty() {
            debug!(url = %url, "using DQ_RDAP_URL");
            config.rdap_base_url = url;
        }
    }

    if let Ok(url) = env::var("DQ_WHOIS_URL") {
        if !url.trim().is_empty() {
            debug!(url = %url, "using DQ_WHOIS_URL");
            config.whois_gateway_url = url;
        }
    }

    if let Ok(url) = env::var("DQ_SUFFIX_URL") {
        if !url.trim().is_empty() {
            debug!(url = %url, "using DQ_SUFFIX_URL");
            config.suffix_source_url = url;
        }
    }

    if let Ok(secret) = env::var("DQ_AUTH_SECRET") {
        if !secret.is_empty() {
            debug!("using DQ_AUTH_SECRET");
            config.auth_secret = Some(secret);
        }
    }

    if let Ok(mode) = env::var("DQ_AUTH_MODE") {
        match mode.to_lowercase().as_str() {
            "admin" => config.auth_mode = AuthMode::Admin,
            "personal" => config.auth_mode = AuthMode::Personal,
            other => warn!(value = %other, "invalid DQ_AUTH_MODE, expected 'admin' or 'personal'"),
        }
    }

    if let Ok(val) = env::var("DQ_DETAIL_CEILING") {
        match val.parse::<u32>() {
            Ok(ceiling) if ceiling > 0 => {
                debug!(ceiling, "using DQ_DETAIL_CEILING");
                config.detail_ceiling = ceiling;
            }
            _ => warn!(value = %val, "invalid DQ_DETAIL_CEILING, must be a positive integer"),
        }
    }

    if let Ok(val) = env::var("DQ_LISTING_CEILING") {
        match val.parse::<u32>() {
            Ok(ceiling) if ceiling > 0 => {
                debug!(ceiling, "using DQ_LISTING_CEILING");
                config.listing_ceiling = ceiling;
            }
            _ => warn!(value = %val, "invalid DQ_LISTING_CEILING, must be a positive integer"),
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.rdap_timeout, Duration::from_secs(10));
        assert_eq!(config.whois_timeout, Duration::from_secs(15));
        assert_eq!(config.quota_window, Duration::from_secs(60));
        assert_eq!(config.detail_ceiling, 12);
        assert_eq!(config.listing_ceiling, 30);
        assert!(config.auth_secret.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::default()
            .with_rdap_base_url("http://localhost:9090")
            .with_detail_ceiling(3)
            .with_auth_secret("hunter2")
            .with_auth_mode(AuthMode::Personal);

        assert_eq!(config.rdap_base_url, "http://localhost:9090");
        assert_eq!(config.detail_ceiling, 3);
        assert_eq!(config.auth_secret.as_deref(), Some("hunter2"));
        assert_eq!(config.auth_mode, AuthMode::Personal);
    }
}
