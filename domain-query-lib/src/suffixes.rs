//! Supported-suffix directory.
//!
//! The listing of RDAP-queryable suffixes is sourced from the IANA root
//! zone database, cached in process memory for a freshness window, and
//! backed by a small static list when the external fetch fails. Failed
//! fetches are never cached, so the next caller retries upstream.

use crate::config::EngineConfig;
use crate::error::DomainQueryError;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const USER_AGENT: &str = "domain-query/0.3";

/// Keep the listing bounded; the root zone carries ~1500 TLDs.
const MAX_LISTED_SUFFIXES: usize = 100;

/// Suffixes served when the root-zone fetch fails.
const FALLBACK_SUFFIXES: &[&str] = &[
    "com", "net", "org", "edu", "gov", "io", "ai", "co", "xyz", "dev", "app", "cn", "uk", "de",
    "fr", "jp", "au", "ca", "br", "ru",
];

/// One suffix the resolver can serve, with its aggregator entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuffixEntry {
    pub suffix: String,
    pub status: String,
    pub rdap_url: String,
}

/// The full listing plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuffixListing {
    pub suffixes: Vec<SuffixEntry>,
    pub total: usize,
    pub source: String,
}

struct CachedListing {
    fetched: Instant,
    listing: SuffixListing,
}

/// Injected cache + fetcher for the suffix listing.
///
/// Owned by the engine, never a process global; tests substitute an
/// isolated directory with a local source URL.
pub struct SuffixDirectory {
    http_client: reqwest::Client,
    source_url: String,
    rdap_base_url: String,
    ttl: Duration,
    cache: Mutex<Option<CachedListing>>,
}

impl SuffixDirectory {
    pub fn new(config: &EngineConfig) -> Result<Self, DomainQueryError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.rdap_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                DomainQueryError::network_with_source(
                    "Failed to create suffix directory HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            source_url: config.suffix_source_url.clone(),
            rdap_base_url: config.rdap_base_url.trim_end_matches('/').to_string(),
            ttl: config.suffix_cache_ttl,
            cache: Mutex::new(None),
        })
    }

    /// The current listing: cached if fresh, refetched when stale, static
    /// fallback when upstream is unreachable.
    pub async fn list(&self) -> SuffixListing {
        if let Some(listing) = self.cached() {
            return listing;
        }

        match self.fetch_root_zone().await {
            Ok(listing) => {
                let mut cache = self.cache.lock().expect("suffix cache lock poisoned");
                *cache = Some(CachedListing {
                    fetched: Instant::now(),
                    listing: listing.clone(),
                });
                listing
            }
            Err(e) => {
                warn!(error = %e, "root zone fetch failed, serving static fallback");
                self.fallback_listing()
            }
        }
    }

    fn cached(&self) -> Option<SuffixListing> {
        let cache = self.cache.lock().expect("suffix cache lock poisoned");
        match cache.as_ref() {
            Some(entry) if entry.fetched.elapsed() <= self.ttl => {
                debug!("serving suffix listing from cache");
                Some(entry.listing.clone())
            }
            _ => None,
        }
    }

    async fn fetch_root_zone(&self) -> Result<SuffixListing, DomainQueryError> {
        let response = self
            .http_client
            .get(&self.source_url)
            .send()
            .await
            .map_err(DomainQueryError::from)?;

        if !response.status().is_success() {
            return Err(DomainQueryError::network(format!(
                "root zone source returned HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(DomainQueryError::from)?;

        let suffixes: Vec<SuffixEntry> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|tld| self.entry_for(&tld.to_lowercase()))
            .take(MAX_LISTED_SUFFIXES)
            .collect();

        if suffixes.is_empty() {
            return Err(DomainQueryError::internal(
                "root zone source returned no suffixes",
            ));
        }

        debug!(total = suffixes.len(), "fetched root zone suffix listing");
        Ok(SuffixListing {
            total: suffixes.len(),
            suffixes,
            source: "IANA Root Zone Database".to_string(),
        })
    }

    fn entry_for(&self, suffix: &str) -> SuffixEntry {
        SuffixEntry {
            suffix: suffix.to_string(),
            status: "active".to_string(),
            rdap_url: format!("{}/{}/", self.rdap_base_url, suffix),
        }
    }

    fn fallback_listing(&self) -> SuffixListing {
        let suffixes: Vec<SuffixEntry> = FALLBACK_SUFFIXES
            .iter()
            .map(|suffix| self.entry_for(suffix))
            .collect();
        SuffixListing {
            total: suffixes.len(),
            suffixes,
            source: "static fallback list".to_string(),
        }
    }
}
