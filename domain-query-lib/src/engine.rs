//! Resolution orchestrator.
//!
//! `QueryEngine` owns every stateful collaborator — quota store, suffix
//! directory, both protocol clients, the price table — and exposes the
//! three gated operations. Resolution runs as an explicit state machine so
//! the RDAP→WHOIS fallback trigger is one named predicate
//! ([`DomainQueryError::wants_whois_fallback`]) instead of nested
//! error-handling branches.

use crate::config::EngineConfig;
use crate::error::DomainQueryError;
use crate::normalize::{parse_rdap, parse_whois};
use crate::pricing::{lookup_prices, seed_price_table, PriceInfo, PriceKind, PriceTable};
use crate::protocols::{RdapClient, WhoisClient};
use crate::quota::{spawn_sweeper, QuotaStore};
use crate::suffixes::{SuffixDirectory, SuffixListing};
use crate::types::{
    AuthDecision, CallerIdentity, GatedReport, LookupMode, LookupRequest, QuerySource,
    QuotaStatus, ResolvedLookup,
};
use crate::utils::{is_valid_dns_name, validate_request};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// States of one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveStep {
    Validating,
    QuotaCheck,
    RdapQuery,
    WhoisQuery,
    WhoisFallback,
    Done,
}

/// The resolution engine. One instance per process; every operation is
/// safe to call from concurrent tasks.
pub struct QueryEngine {
    config: EngineConfig,
    quota: Arc<QuotaStore>,
    suffixes: SuffixDirectory,
    rdap_client: RdapClient,
    whois_client: WhoisClient,
    price_table: PriceTable,
}

impl QueryEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Result<Self, DomainQueryError> {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine from an explicit configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self, DomainQueryError> {
        let rdap_client = RdapClient::new(&config.rdap_base_url, config.rdap_timeout)?;
        let whois_client = WhoisClient::new(&config.whois_gateway_url, config.whois_timeout)?;
        let suffixes = SuffixDirectory::new(&config)?;
        let quota = Arc::new(QuotaStore::new(config.quota_window));

        Ok(Self {
            config,
            quota,
            suffixes,
            rdap_client,
            whois_client,
            price_table: seed_price_table().clone(),
        })
    }

    /// Replace the seed price table, e.g. with a live feed snapshot.
    pub fn with_price_table(mut self, table: PriceTable) -> Self {
        self.price_table = table;
        self
    }

    /// Start the background sweep that evicts lapsed quota windows.
    ///
    /// Optional: expiry is also detected lazily on access; the sweep only
    /// bounds the window table's memory.
    pub fn start_quota_sweeper(&self) -> tokio::task::JoinHandle<()> {
        spawn_sweeper(Arc::clone(&self.quota), self.config.sweep_interval)
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn authenticate(&self, caller: &CallerIdentity) -> AuthDecision {
        AuthDecision::evaluate(
            caller.credential.as_deref(),
            self.config.auth_secret.as_deref(),
            self.config.auth_mode,
        )
    }

    /// Quota snapshot for paths that fail before the gate runs, so every
    /// report still carries a well-formed quota state.
    fn ungated_snapshot(&self) -> QuotaStatus {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        QuotaStatus {
            allowed: true,
            count: 0,
            reset_at: now_ms + self.config.quota_window.as_millis() as u64,
        }
    }

    /// Resolve one lookup request into a normalized record.
    ///
    /// Walks Validating → QuotaCheck → RdapQuery (→ WhoisFallback) or
    /// WhoisQuery → Done. The report carries the final quota state and
    /// auth mode on every path, success or failure.
    pub async fn resolve(
        &self,
        request: &LookupRequest,
        caller: &CallerIdentity,
    ) -> GatedReport<ResolvedLookup> {
        let auth = self.authenticate(caller);
        let mut quota = self.ungated_snapshot();
        let mut outcome: Result<ResolvedLookup, DomainQueryError> =
            Err(DomainQueryError::internal("resolution did not complete"));

        let mut step = ResolveStep::Validating;
        while step != ResolveStep::Done {
            step = match step {
                ResolveStep::Validating => match validate_request(request) {
                    Ok(()) => ResolveStep::QuotaCheck,
                    Err(e) => {
                        outcome = Err(e);
                        ResolveStep::Done
                    }
                },
                ResolveStep::QuotaCheck => {
                    quota = self
                        .quota
                        .check(&caller.source_ip, &auth, self.config.detail_ceiling);
                    if !quota.allowed {
                        outcome = Err(DomainQueryError::quota_exceeded(quota.reset_at));
                        ResolveStep::Done
                    } else {
                        match request.mode {
                            LookupMode::Rdap => ResolveStep::RdapQuery,
                            LookupMode::Whois => ResolveStep::WhoisQuery,
                        }
                    }
                }
                ResolveStep::RdapQuery => {
                    // Validation guarantees an object type in RDAP mode.
                    let Some(object_type) = request.object_type else {
                        outcome = Err(DomainQueryError::internal(
                            "RDAP step reached without an object type",
                        ));
                        step = ResolveStep::Done;
                        continue;
                    };
                    match self.rdap_client.query(object_type, &request.identifier).await {
                        Ok(payload) => {
                            outcome = Ok(ResolvedLookup {
                                record: parse_rdap(&payload, &request.identifier),
                                source: QuerySource::Rdap,
                                fallback_note: None,
                            });
                            ResolveStep::Done
                        }
                        Err(e) if e.wants_whois_fallback() => {
                            info!(identifier = %request.identifier, "RDAP reports unsupported suffix, falling back to WHOIS");
                            ResolveStep::WhoisFallback
                        }
                        Err(e) => {
                            outcome = Err(e);
                            ResolveStep::Done
                        }
                    }
                }
                ResolveStep::WhoisFallback => {
                    match self.whois_client.query(&request.identifier).await {
                        Ok(raw) => {
                            outcome = Ok(ResolvedLookup {
                                record: parse_whois(&raw, &request.identifier),
                                source: QuerySource::Whois,
                                fallback_note: Some(
                                    "RDAP does not cover this suffix; WHOIS was queried instead"
                                        .to_string(),
                                ),
                            });
                        }
                        Err(e) => {
                            outcome = Err(e);
                        }
                    }
                    ResolveStep::Done
                }
                ResolveStep::WhoisQuery => {
                    match self.whois_client.query(&request.identifier).await {
                        Ok(raw) => {
                            outcome = Ok(ResolvedLookup {
                                record: parse_whois(&raw, &request.identifier),
                                source: QuerySource::Whois,
                                fallback_note: None,
                            });
                        }
                        Err(e) => {
                            outcome = Err(e);
                        }
                    }
                    ResolveStep::Done
                }
                ResolveStep::Done => ResolveStep::Done,
            };
        }

        debug!(
            identifier = %request.identifier,
            ok = outcome.is_ok(),
            count = quota.count,
            "resolution finished"
        );

        GatedReport {
            outcome,
            quota,
            auth_mode: auth.mode,
        }
    }

    /// List the suffixes the resolver can serve, under the higher bulk
    /// quota ceiling. The listing itself never fails; upstream outages
    /// degrade to the static fallback set.
    pub async fn list_supported_suffixes(
        &self,
        caller: &CallerIdentity,
    ) -> GatedReport<SuffixListing> {
        let auth = self.authenticate(caller);
        let quota = self
            .quota
            .check(&caller.source_ip, &auth, self.config.listing_ceiling);

        let outcome = if quota.allowed {
            Ok(self.suffixes.list().await)
        } else {
            Err(DomainQueryError::quota_exceeded(quota.reset_at))
        };

        GatedReport {
            outcome,
            quota,
            auth_mode: auth.mode,
        }
    }

    /// Price comparison for a domain's suffix: the cheapest quotes of the
    /// requested kind. Invalid domains are rejected before the quota
    /// window is charged.
    pub async fn price_lookup(
        &self,
        domain: &str,
        sort_by: PriceKind,
        caller: &CallerIdentity,
    ) -> GatedReport<PriceInfo> {
        let auth = self.authenticate(caller);
        let domain = domain.trim().to_lowercase();

        if !is_valid_dns_name(&domain) {
            return GatedReport {
                outcome: Err(DomainQueryError::invalid_input(format!(
                    "'{}' is not a valid domain",
                    domain
                ))),
                quota: self.ungated_snapshot(),
                auth_mode: auth.mode,
            };
        }

        let quota = self
            .quota
            .check(&caller.source_ip, &auth, self.config.detail_ceiling);

        let outcome = if quota.allowed {
            Ok(lookup_prices(&self.price_table, &domain, sort_by))
        } else {
            Err(DomainQueryError::quota_exceeded(quota.reset_at))
        };

        GatedReport {
            outcome,
            quota,
            auth_mode: auth.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthMode;

    fn engine() -> QueryEngine {
        QueryEngine::new().unwrap()
    }

    #[tokio::test]
    async fn test_invalid_identifier_fails_fast_without_charging_quota() {
        let engine = engine();
        let caller = CallerIdentity::anonymous("1.2.3.4");

        let report = engine
            .resolve(&LookupRequest::rdap_domain("-bad-.com"), &caller)
            .await;
        assert!(matches!(
            report.outcome,
            Err(DomainQueryError::InvalidInput { .. })
        ));
        // Bad input never reaches the gate.
        assert_eq!(report.quota.count, 0);
        assert_eq!(report.auth_mode, AuthMode::None);
    }

    #[tokio::test]
    async fn test_rdap_mode_without_object_type_is_invalid() {
        let engine = engine();
        let caller = CallerIdentity::anonymous("1.2.3.4");
        let request = LookupRequest::new(LookupMode::Rdap, None, "example.com");

        let report = engine.resolve(&request, &caller).await;
        assert!(matches!(
            report.outcome,
            Err(DomainQueryError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_quota_denial_carries_reset_time() {
        let config = EngineConfig::default().with_detail_ceiling(1);
        let engine = QueryEngine::with_config(config).unwrap();
        let caller = CallerIdentity::anonymous("5.6.7.8");

        // Exhaust the single slot without touching the network.
        let first = engine
            .price_lookup("example.com", PriceKind::Registration, &caller)
            .await;
        assert!(first.outcome.is_ok());
        assert_eq!(first.quota.count, 1);

        let denied = engine
            .price_lookup("example.com", PriceKind::Registration, &caller)
            .await;
        match denied.outcome {
            Err(DomainQueryError::QuotaExceeded { reset_at }) => {
                assert_eq!(reset_at, denied.quota.reset_at);
                assert_eq!(reset_at, first.quota.reset_at);
            }
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
        assert!(!denied.quota.allowed);
    }

    #[tokio::test]
    async fn test_authenticated_caller_bypasses_quota_and_reports_mode() {
        let config = EngineConfig::default()
            .with_detail_ceiling(1)
            .with_auth_secret("s3cret")
            .with_auth_mode(AuthMode::Personal);
        let engine = QueryEngine::with_config(config).unwrap();
        let caller = CallerIdentity::with_credential("5.6.7.8", "s3cret");

        for _ in 0..10 {
            let report = engine
                .price_lookup("example.com", PriceKind::Registration, &caller)
                .await;
            assert!(report.outcome.is_ok());
            assert_eq!(report.quota.count, 0);
            assert_eq!(report.auth_mode, AuthMode::Personal);
        }
    }

    #[tokio::test]
    async fn test_wrong_credential_is_treated_as_anonymous() {
        let config = EngineConfig::default()
            .with_detail_ceiling(1)
            .with_auth_secret("s3cret");
        let engine = QueryEngine::with_config(config).unwrap();
        let caller = CallerIdentity::with_credential("5.6.7.8", "wrong");

        let first = engine
            .price_lookup("example.com", PriceKind::Registration, &caller)
            .await;
        assert_eq!(first.auth_mode, AuthMode::None);
        assert_eq!(first.quota.count, 1);

        let denied = engine
            .price_lookup("example.com", PriceKind::Registration, &caller)
            .await;
        assert!(denied.outcome.is_err());
    }

    #[tokio::test]
    async fn test_price_lookup_rejects_invalid_domain_before_quota() {
        let config = EngineConfig::default().with_detail_ceiling(1);
        let engine = QueryEngine::with_config(config).unwrap();
        let caller = CallerIdentity::anonymous("9.9.9.9");

        let report = engine
            .price_lookup("-bad-.com", PriceKind::Registration, &caller)
            .await;
        assert!(matches!(
            report.outcome,
            Err(DomainQueryError::InvalidInput { .. })
        ));

        // The rejected call must not have consumed the only slot.
        let ok = engine
            .price_lookup("example.com", PriceKind::Registration, &caller)
            .await;
        assert!(ok.outcome.is_ok());
    }

    #[tokio::test]
    async fn test_price_lookup_normalizes_domain() {
        let engine = engine();
        let caller = CallerIdentity::anonymous("9.9.9.9");

        let report = engine
            .price_lookup("  SITE.XYZ ", PriceKind::Registration, &caller)
            .await;
        let info = report.outcome.unwrap();
        assert_eq!(info.suffix, "xyz");
        assert!(!info.quotes.is_empty());
    }
}
