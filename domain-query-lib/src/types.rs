//! Core data types for registration-metadata resolution.
//!
//! This module defines the request/response shapes used throughout the
//! library: lookup requests, caller identity, authentication decisions,
//! quota status, and the canonical `NormalizedRecord` that both the RDAP
//! and WHOIS parsers populate.

use serde::{Deserialize, Serialize};

/// Sentinel value for string fields that could not be resolved.
///
/// The canonical record never carries empty strings or absent fields;
/// downstream rendering code has exactly one shape to handle.
pub const UNKNOWN: &str = "Unknown";

/// Which registry protocol a lookup should use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LookupMode {
    #[serde(rename = "rdap")]
    Rdap,
    #[serde(rename = "whois")]
    Whois,
}

/// RDAP object classes accepted by the aggregator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ObjectType {
    #[serde(rename = "domain")]
    Domain,
    #[serde(rename = "ip")]
    Ip,
    #[serde(rename = "autnum")]
    Autnum,
    #[serde(rename = "entity")]
    Entity,
}

impl ObjectType {
    /// The path segment used on the RDAP aggregator.
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            ObjectType::Domain => "domain",
            ObjectType::Ip => "ip",
            ObjectType::Autnum => "autnum",
            ObjectType::Entity => "entity",
        }
    }

    /// Parse an object type from its wire name.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "domain" => Some(ObjectType::Domain),
            "ip" => Some(ObjectType::Ip),
            "autnum" => Some(ObjectType::Autnum),
            "entity" => Some(ObjectType::Entity),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path_segment())
    }
}

impl std::fmt::Display for LookupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupMode::Rdap => write!(f, "RDAP"),
            LookupMode::Whois => write!(f, "WHOIS"),
        }
    }
}

/// A single resolution request.
///
/// The identifier is trimmed and lower-cased at construction so every
/// downstream component sees one canonical spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub mode: LookupMode,

    /// Required (and validated) when `mode` is RDAP; ignored for WHOIS.
    pub object_type: Option<ObjectType>,

    pub identifier: String,
}

impl LookupRequest {
    pub fn new(mode: LookupMode, object_type: Option<ObjectType>, identifier: &str) -> Self {
        Self {
            mode,
            object_type,
            identifier: identifier.trim().to_lowercase(),
        }
    }

    /// Convenience constructor for the common RDAP domain lookup.
    pub fn rdap_domain(identifier: &str) -> Self {
        Self::new(LookupMode::Rdap, Some(ObjectType::Domain), identifier)
    }

    /// Convenience constructor for a WHOIS lookup.
    pub fn whois(identifier: &str) -> Self {
        Self::new(LookupMode::Whois, None, identifier)
    }
}

/// Who is calling, derived once per request from network-layer headers.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// Best-effort client IP; `"unknown"` when no header yields one.
    pub source_ip: String,

    /// Shared-secret credential, if the caller supplied one.
    pub credential: Option<String>,
}

impl CallerIdentity {
    /// Derive the caller identity from proxy/CDN headers.
    ///
    /// Precedence: trusted-proxy real-IP header, then the CDN-specific IP
    /// header, then the first hop of a forwarded-for chain.
    pub fn from_headers(
        real_ip: Option<&str>,
        cdn_ip: Option<&str>,
        forwarded_for: Option<&str>,
        credential: Option<String>,
    ) -> Self {
        let source_ip = real_ip
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| cdn_ip.map(str::trim).filter(|s| !s.is_empty()))
            .or_else(|| {
                forwarded_for
                    .and_then(|chain| chain.split(',').next())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or("unknown")
            .to_string();

        Self {
            source_ip,
            credential,
        }
    }

    /// Identity for a caller with a known address and no credential.
    pub fn anonymous(source_ip: &str) -> Self {
        Self {
            source_ip: source_ip.to_string(),
            credential: None,
        }
    }

    /// Identity carrying a credential, keyed by the given address.
    pub fn with_credential(source_ip: &str, credential: &str) -> Self {
        Self {
            source_ip: source_ip.to_string(),
            credential: Some(credential.to_string()),
        }
    }
}

/// Operating mode granted to an authenticated caller.
///
/// Admin and personal are enforced identically (both fully quota-exempt);
/// they are distinguished for display and audit only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthMode {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "personal")]
    Personal,
    #[serde(rename = "none")]
    None,
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Admin => write!(f, "admin"),
            AuthMode::Personal => write!(f, "personal"),
            AuthMode::None => write!(f, "none"),
        }
    }
}

/// Outcome of credential evaluation for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthDecision {
    pub authenticated: bool,
    pub mode: AuthMode,
}

impl AuthDecision {
    /// Compare the supplied credential against the configured secret.
    ///
    /// The granted mode is a static deployment setting, not something the
    /// caller picks. No secret configured means nobody authenticates.
    pub fn evaluate(
        credential: Option<&str>,
        secret: Option<&str>,
        configured_mode: AuthMode,
    ) -> Self {
        match (credential, secret) {
            (Some(supplied), Some(expected)) if !expected.is_empty() && supplied == expected => {
                Self {
                    authenticated: true,
                    mode: configured_mode,
                }
            }
            _ => Self {
                authenticated: false,
                mode: AuthMode::None,
            },
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            mode: AuthMode::None,
        }
    }
}

/// Quota state returned with every gated operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaStatus {
    pub allowed: bool,

    /// Requests counted in the current window. Authenticated callers are
    /// not tracked and always report 0.
    pub count: u32,

    /// Epoch millisecond at which the window lapses.
    pub reset_at: u64,
}

/// Which registry ultimately answered a resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuerySource {
    #[serde(rename = "rdap")]
    Rdap,
    #[serde(rename = "whois")]
    Whois,
}

impl std::fmt::Display for QuerySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuerySource::Rdap => write!(f, "rdap"),
            QuerySource::Whois => write!(f, "whois"),
        }
    }
}

/// The canonical registration-metadata shape both parsers populate.
///
/// Unresolved fields take the `"Unknown"` sentinel (strings) or 0 (day
/// counts) — never null or absent. Day counts are derived from the dates
/// on every resolution, never stored independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRecord {
    pub identifier: String,

    /// Registry status values, order preserved from the source.
    pub statuses: Vec<String>,

    pub registrar_name: String,
    pub registration_date: String,
    pub expiration_date: String,
    pub last_updated_date: String,

    /// De-duplicated nameserver hostnames; `["Unknown"]` when none listed.
    pub name_servers: Vec<String>,

    /// `"signed"` or `"unsigned"`.
    pub dnssec: String,

    pub age_in_days: i64,
    pub remaining_days: i64,
}

impl NormalizedRecord {
    /// A record with every field at its sentinel, for parsers to fill in.
    pub fn unknown(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            statuses: Vec::new(),
            registrar_name: UNKNOWN.to_string(),
            registration_date: UNKNOWN.to_string(),
            expiration_date: UNKNOWN.to_string(),
            last_updated_date: UNKNOWN.to_string(),
            name_servers: Vec::new(),
            dnssec: "unsigned".to_string(),
            age_in_days: 0,
            remaining_days: 0,
        }
    }
}

/// A successful resolution: the record plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLookup {
    pub record: NormalizedRecord,

    /// Which registry answered.
    pub source: QuerySource,

    /// Present when the engine substituted WHOIS for a failed RDAP lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_note: Option<String>,
}

/// Envelope carried by every gated operation.
///
/// The quota state and auth mode are present even on failure paths so the
/// caller can keep its quota display in sync.
#[derive(Debug)]
pub struct GatedReport<T> {
    pub outcome: Result<T, crate::error::DomainQueryError>,
    pub quota: QuotaStatus,
    pub auth_mode: AuthMode,
}
