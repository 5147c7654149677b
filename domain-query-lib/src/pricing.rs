//! Registrar price aggregation.
//!
//! Prices come from a static seed table keyed by domain suffix, not a live
//! market feed; the lookup is a pluggable point with a deterministic
//! fallback set for unlisted suffixes. Quotes are filtered to the requested
//! price kind and the three cheapest are returned.

use crate::utils::suffix_of;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which price a quote covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PriceKind {
    #[serde(rename = "registration")]
    Registration,
    #[serde(rename = "renewal")]
    Renewal,
    #[serde(rename = "transfer")]
    Transfer,
}

impl PriceKind {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "registration" => Some(PriceKind::Registration),
            "renewal" => Some(PriceKind::Renewal),
            "transfer" => Some(PriceKind::Transfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for PriceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceKind::Registration => write!(f, "registration"),
            PriceKind::Renewal => write!(f, "renewal"),
            PriceKind::Transfer => write!(f, "transfer"),
        }
    }
}

/// One registrar's offer for a suffix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    pub registrar: String,
    pub price: f64,
    pub currency: String,
    pub period: String,
    pub kind: PriceKind,
}

impl PriceQuote {
    fn new(registrar: &str, price: f64, currency: &str, kind: PriceKind) -> Self {
        Self {
            registrar: registrar.to_string(),
            price,
            currency: currency.to_string(),
            period: "1 year".to_string(),
            kind,
        }
    }
}

/// Result of a price lookup: at most the three cheapest quotes of the
/// requested kind for the domain's suffix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceInfo {
    pub suffix: String,
    pub quotes: Vec<PriceQuote>,
    pub sorted_by: PriceKind,
}

/// Suffix → ordered registrar quotes. Seeded once at process start.
pub type PriceTable = HashMap<String, Vec<PriceQuote>>;

/// Per-registrar triple (registration, renewal, transfer) sharing currency.
fn offers(registrar: &str, currency: &str, reg: f64, renew: f64, transfer: f64) -> Vec<PriceQuote> {
    vec![
        PriceQuote::new(registrar, reg, currency, PriceKind::Registration),
        PriceQuote::new(registrar, renew, currency, PriceKind::Renewal),
        PriceQuote::new(registrar, transfer, currency, PriceKind::Transfer),
    ]
}

fn table_entry(rows: &[(&str, &str, f64, f64, f64)]) -> Vec<PriceQuote> {
    rows.iter()
        .flat_map(|(registrar, currency, reg, renew, transfer)| {
            offers(registrar, currency, *reg, *renew, *transfer)
        })
        .collect()
}

lazy_static::lazy_static! {
    /// Seed quotes for the suffixes the tool sees most.
    static ref SEED_TABLE: PriceTable = {
        let mut table = PriceTable::new();
        table.insert("com".into(), table_entry(&[
            ("NameSilo", "USD", 8.99, 10.99, 8.99),
            ("GoDaddy", "USD", 12.99, 17.99, 12.99),
            ("NameCheap", "USD", 9.98, 13.98, 9.98),
        ]));
        table.insert("net".into(), table_entry(&[
            ("GoDaddy", "USD", 12.99, 17.99, 12.99),
            ("NameCheap", "USD", 11.98, 14.98, 11.98),
        ]));
        table.insert("org".into(), table_entry(&[
            ("NameCheap", "USD", 9.99, 12.99, 9.99),
            ("Porkbun", "USD", 8.97, 11.97, 8.97),
        ]));
        table.insert("cn".into(), table_entry(&[
            ("Aliyun", "CNY", 28.00, 35.00, 28.00),
            ("Tencent Cloud", "CNY", 25.00, 32.00, 25.00),
        ]));
        table.insert("io".into(), table_entry(&[
            ("Porkbun", "USD", 64.99, 69.99, 64.99),
            ("NameSilo", "USD", 68.99, 73.99, 68.99),
        ]));
        table.insert("ai".into(), table_entry(&[
            ("NameSilo", "USD", 89.99, 94.99, 89.99),
            ("Porkbun", "USD", 85.97, 90.97, 85.97),
        ]));
        table.insert("co".into(), table_entry(&[
            ("GoDaddy", "USD", 29.99, 34.99, 29.99),
            ("NameCheap", "USD", 26.98, 31.98, 26.98),
        ]));
        table.insert("xyz".into(), table_entry(&[
            ("NameCheap", "USD", 2.99, 14.98, 2.99),
            ("Porkbun", "USD", 3.97, 13.97, 3.97),
        ]));
        table.insert("dev".into(), table_entry(&[
            ("Google Domains", "USD", 12.99, 12.99, 12.99),
            ("NameCheap", "USD", 11.98, 14.98, 11.98),
        ]));
        table.insert("app".into(), table_entry(&[
            ("Google Domains", "USD", 19.99, 19.99, 19.99),
            ("Porkbun", "USD", 17.97, 17.97, 17.97),
        ]));
        table
    };

    /// Fallback quotes for suffixes the seed table doesn't cover.
    static ref DEFAULT_QUOTES: Vec<PriceQuote> =
        table_entry(&[("Unknown", "USD", 15.99, 18.99, 15.99)]);
}

/// The process-wide seed table.
pub fn seed_price_table() -> &'static PriceTable {
    &SEED_TABLE
}

/// Look up the cheapest quotes for `domain`'s suffix.
///
/// The suffix is the substring after the last dot (the whole string when
/// there is no dot), matched case-insensitively. Quotes of the requested
/// kind are sorted ascending by price — ties keep table order — and the
/// first three are returned.
pub fn lookup_prices(table: &PriceTable, domain: &str, sort_by: PriceKind) -> PriceInfo {
    let suffix = suffix_of(domain);

    let candidates = table
        .get(&suffix.to_lowercase())
        .map(|quotes| quotes.as_slice())
        .unwrap_or(DEFAULT_QUOTES.as_slice());

    let mut quotes: Vec<PriceQuote> = candidates
        .iter()
        .filter(|quote| quote.kind == sort_by)
        .cloned()
        .collect();
    quotes.sort_by(|a, b| a.price.total_cmp(&b.price));
    quotes.truncate(3);

    PriceInfo {
        suffix: suffix.to_string(),
        quotes,
        sorted_by: sort_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cheapest_three_registration_quotes_for_xyz() {
        let info = lookup_prices(seed_price_table(), "site.xyz", PriceKind::Registration);
        assert_eq!(info.suffix, "xyz");
        assert_eq!(info.sorted_by, PriceKind::Registration);
        assert_eq!(info.quotes.len(), 2); // only two registrars list .xyz
        assert_eq!(info.quotes[0].registrar, "NameCheap");
        assert_eq!(info.quotes[0].price, 2.99);
        assert_eq!(info.quotes[1].registrar, "Porkbun");
        assert!(info.quotes.iter().all(|q| q.kind == PriceKind::Registration));
    }

    #[test]
    fn test_com_returns_exactly_three_ascending() {
        let info = lookup_prices(seed_price_table(), "example.com", PriceKind::Registration);
        assert_eq!(info.quotes.len(), 3);
        assert!(info.quotes.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(info.quotes[0].registrar, "NameSilo");
    }

    #[test]
    fn test_renewal_sort_differs_from_registration() {
        let info = lookup_prices(seed_price_table(), "example.xyz", PriceKind::Renewal);
        // Porkbun renews cheaper than NameCheap even though it registers
        // more expensively.
        assert_eq!(info.quotes[0].registrar, "Porkbun");
        assert_eq!(info.quotes[0].price, 13.97);
    }

    #[test]
    fn test_unlisted_suffix_uses_default_set() {
        let info = lookup_prices(seed_price_table(), "example.museum", PriceKind::Registration);
        assert_eq!(info.suffix, "museum");
        assert_eq!(info.quotes.len(), 1);
        assert_eq!(info.quotes[0].registrar, "Unknown");
        assert_eq!(info.quotes[0].price, 15.99);
    }

    #[test]
    fn test_suffix_lookup_is_case_insensitive() {
        let info = lookup_prices(seed_price_table(), "EXAMPLE.COM", PriceKind::Registration);
        assert_eq!(info.quotes.len(), 3);
    }

    #[test]
    fn test_multi_label_domain_prices_by_last_label_only() {
        let info = lookup_prices(seed_price_table(), "sub.example.co.uk", PriceKind::Registration);
        assert_eq!(info.suffix, "uk");
        // "uk" is unlisted, so the default set answers — NOT the "co" entry.
        assert_eq!(info.quotes[0].registrar, "Unknown");
    }

    #[test]
    fn test_dotless_input_is_its_own_suffix() {
        let info = lookup_prices(seed_price_table(), "xyz", PriceKind::Transfer);
        assert_eq!(info.suffix, "xyz");
        assert_eq!(info.quotes[0].price, 2.99);
    }

    #[test]
    fn test_stable_sort_keeps_table_order_on_ties() {
        let mut table = PriceTable::new();
        table.insert(
            "tie".into(),
            vec![
                PriceQuote::new("First", 5.0, "USD", PriceKind::Registration),
                PriceQuote::new("Second", 5.0, "USD", PriceKind::Registration),
                PriceQuote::new("Third", 5.0, "USD", PriceKind::Registration),
                PriceQuote::new("Cheapest", 1.0, "USD", PriceKind::Registration),
            ],
        );
        let info = lookup_prices(&table, "x.tie", PriceKind::Registration);
        assert_eq!(info.quotes.len(), 3);
        assert_eq!(info.quotes[0].registrar, "Cheapest");
        assert_eq!(info.quotes[1].registrar, "First");
        assert_eq!(info.quotes[2].registrar, "Second");
    }
}
