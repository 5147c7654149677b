//! Error handling for registration-metadata lookups.
//!
//! This module defines one error type covering every failure mode in the
//! resolution pipeline, from malformed input to upstream registry outages.
//! Parsers are deliberately absent from this taxonomy: normalization never
//! fails, it degrades to sentinel fields instead.

use std::fmt;

/// Main error type for lookup operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainQueryError {
    /// Malformed identifier or missing required field. Never retried.
    InvalidInput { message: String },

    /// The caller exhausted its quota window. `reset_at` is the epoch
    /// millisecond at which the window lapses.
    QuotaExceeded { reset_at: u64 },

    /// RDAP aggregator failure, classified from the HTTP status.
    /// `status_code` is 0 for network-level failures.
    Rdap {
        message: String,
        status_code: u16,
        /// Set for 404s on domain lookups: the suffix likely has no RDAP
        /// coverage and a WHOIS query should be attempted instead.
        domain_not_supported: bool,
    },

    /// WHOIS gateway failure (HTTP error or gateway-reported failure).
    Whois { message: String },

    /// Network-level errors (connection refused, DNS, TLS).
    Network {
        message: String,
        source: Option<String>,
    },

    /// An upstream call exceeded its bounded timeout.
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// Configuration errors (invalid settings, unusable base URLs).
    Config { message: String },

    /// Generic internal errors that don't fit other categories.
    Internal { message: String },
}

impl DomainQueryError {
    /// Create a new invalid-input error.
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new quota-exceeded error.
    pub fn quota_exceeded(reset_at: u64) -> Self {
        Self::QuotaExceeded { reset_at }
    }

    /// Create a new RDAP error from a classified HTTP status.
    pub fn rdap<M: Into<String>>(message: M, status_code: u16) -> Self {
        Self::Rdap {
            message: message.into(),
            status_code,
            domain_not_supported: false,
        }
    }

    /// Create an RDAP error flagged as "suffix likely unsupported".
    ///
    /// Produced for 404s on `objectType=domain` lookups; this is the flag
    /// the orchestrator's WHOIS fallback keys off.
    pub fn rdap_domain_not_supported<M: Into<String>>(message: M) -> Self {
        Self::Rdap {
            message: message.into(),
            status_code: 404,
            domain_not_supported: true,
        }
    }

    /// Create a new WHOIS error.
    pub fn whois<M: Into<String>>(message: M) -> Self {
        Self::Whois {
            message: message.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The fallback trigger: true when an RDAP failure should be answered
    /// by re-issuing the lookup against the WHOIS gateway.
    ///
    /// Only 404s on domain-object lookups qualify; every other RDAP failure
    /// is surfaced to the caller as-is.
    pub fn wants_whois_fallback(&self) -> bool {
        matches!(
            self,
            Self::Rdap {
                domain_not_supported: true,
                ..
            }
        )
    }

    /// The RDAP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Rdap { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for DomainQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
            Self::QuotaExceeded { reset_at } => {
                write!(f, "Quota exceeded, window resets at {} (epoch ms)", reset_at)
            }
            Self::Rdap {
                message,
                status_code,
                domain_not_supported,
            } => {
                if *domain_not_supported {
                    write!(f, "RDAP error (HTTP {}): {} [suffix likely unsupported]", status_code, message)
                } else if *status_code > 0 {
                    write!(f, "RDAP error (HTTP {}): {}", status_code, message)
                } else {
                    write!(f, "RDAP error: {}", message)
                }
            }
            Self::Whois { message } => {
                write!(f, "WHOIS error: {}", message)
            }
            Self::Network { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DomainQueryError {}

impl From<reqwest::Error> for DomainQueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout("HTTP request", std::time::Duration::from_secs(10))
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for DomainQueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_predicate_only_fires_for_flagged_404() {
        let flagged = DomainQueryError::rdap_domain_not_supported("no RDAP for this suffix");
        assert!(flagged.wants_whois_fallback());

        let plain_404 = DomainQueryError::rdap("object not found", 404);
        assert!(!plain_404.wants_whois_fallback());

        let rate_limited = DomainQueryError::rdap("upstream rate limited", 429);
        assert!(!rate_limited.wants_whois_fallback());

        let network = DomainQueryError::network("connection reset");
        assert!(!network.wants_whois_fallback());
    }

    #[test]
    fn test_status_code_accessor() {
        assert_eq!(DomainQueryError::rdap("denied", 403).status_code(), Some(403));
        assert_eq!(DomainQueryError::whois("gateway down").status_code(), None);
    }

    #[test]
    fn test_display_includes_suffix_hint() {
        let err = DomainQueryError::rdap_domain_not_supported("not found");
        assert!(err.to_string().contains("suffix likely unsupported"));
    }
}
