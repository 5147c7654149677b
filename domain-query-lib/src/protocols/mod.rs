//! Registry protocol clients.
//!
//! Two upstreams answer lookups: the RDAP aggregator (structured JSON) and
//! a legacy WHOIS HTTP gateway (raw text). Both clients return unparsed
//! payloads; normalization is a separate, pure step so callers needing the
//! raw payload are not forced through it.

mod rdap;
mod whois;

pub use rdap::RdapClient;
pub use whois::WhoisClient;
