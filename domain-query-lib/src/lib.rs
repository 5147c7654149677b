//! # Domain Query Library
//!
//! A library for resolving domain registration metadata over RDAP and WHOIS,
//! with per-caller quota gating, registrar price comparison, and a cached
//! listing of RDAP-supported suffixes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_query_lib::{QueryEngine, LookupRequest, CallerIdentity};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = QueryEngine::new()?;
//!     let caller = CallerIdentity::anonymous("203.0.113.7");
//!
//!     let report = engine
//!         .resolve(&LookupRequest::rdap_domain("example.com"), &caller)
//!         .await;
//!
//!     let lookup = report.outcome?;
//!     println!("{} via {}", lookup.record.identifier, lookup.source);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **RDAP first**: domain, IP, autnum, and entity lookups via an aggregator
//! - **WHOIS fallback**: automatic when RDAP lacks coverage for a suffix
//! - **Normalization**: both protocols produce one canonical record shape
//! - **Quota gating**: sliding per-caller windows with credential exemption
//! - **Price comparison**: cheapest registrar quotes per suffix

// Re-export main public API types and functions
// This makes them available as domain_query_lib::TypeName
pub use config::{load_env_config, EngineConfig};
pub use engine::QueryEngine;
pub use error::DomainQueryError;
pub use pricing::{lookup_prices, seed_price_table, PriceInfo, PriceKind, PriceQuote, PriceTable};
pub use suffixes::{SuffixDirectory, SuffixEntry, SuffixListing};
pub use types::{
    AuthDecision, AuthMode, CallerIdentity, GatedReport, LookupMode, LookupRequest,
    NormalizedRecord, ObjectType, QuerySource, QuotaStatus, ResolvedLookup, UNKNOWN,
};
pub use utils::{is_valid_dns_name, suffix_of};

// Lower-level building blocks, exposed for callers that compose their own
// pipeline instead of going through the engine.
pub use normalize::{parse_rdap, parse_whois};
pub use protocols::{RdapClient, WhoisClient};
pub use quota::{spawn_sweeper, QuotaStore};

mod config;
mod engine;
mod error;
mod normalize;
mod pricing;
mod protocols;
mod quota;
mod suffixes;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainQueryError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
