//! Normalization of loosely-formatted WHOIS text.
//!
//! WHOIS output is line-oriented prose with no schema; extraction is
//! label-contains matching over trimmed, lower-cased lines. The first line
//! carrying a recognized label wins for single-valued fields; nameservers
//! and statuses accumulate across the whole payload.

use super::{apply_day_counts, date_portion};
use crate::types::{NormalizedRecord, UNKNOWN};

const REGISTRATION_LABELS: &[&str] = &["creation date", "registered on", "registration date"];
const EXPIRATION_LABELS: &[&str] = &["registry expiry date", "expiry date", "expiration date"];
const UPDATED_LABELS: &[&str] = &["updated date", "last updated", "modified"];
const NAMESERVER_LABELS: &[&str] = &["name server", "nserver"];

/// Reduce raw WHOIS text to the canonical record shape. Never fails.
pub fn parse_whois(raw: &str, identifier: &str) -> NormalizedRecord {
    let mut record = NormalizedRecord::unknown(identifier);
    let lines: Vec<&str> = raw.lines().map(str::trim).collect();

    if let Some(line) = find_labelled(&lines, &["registrar"]) {
        if let Some(value) = after_last_colon(line) {
            record.registrar_name = value;
        }
    }

    if let Some(line) = find_labelled(&lines, REGISTRATION_LABELS) {
        if let Some(value) = date_value(line) {
            record.registration_date = value;
        }
    }
    if let Some(line) = find_labelled(&lines, EXPIRATION_LABELS) {
        if let Some(value) = date_value(line) {
            record.expiration_date = value;
        }
    }
    if let Some(line) = find_labelled(&lines, UPDATED_LABELS) {
        if let Some(value) = date_value(line) {
            record.last_updated_date = value;
        }
    }

    for line in &lines {
        let lower = line.to_lowercase();
        if NAMESERVER_LABELS.iter().any(|label| lower.contains(label)) {
            if let Some(host) = after_last_colon(line) {
                if !record.name_servers.iter().any(|h| h == &host) {
                    record.name_servers.push(host);
                }
            }
        }
    }
    if record.name_servers.is_empty() {
        record.name_servers.push(UNKNOWN.to_string());
    }

    // "signed" must appear as its own token; "unsigned" does not qualify.
    if let Some(line) = find_labelled(&lines, &["dnssec"]) {
        let signed = line
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| token == "signed");
        record.dnssec = if signed { "signed" } else { "unsigned" }.to_string();
    }

    for line in &lines {
        if line.to_lowercase().contains("status") && line.contains(':') {
            if let Some(value) = after_last_colon(line) {
                if !record.statuses.iter().any(|s| s == &value) {
                    record.statuses.push(value);
                }
            }
        }
    }
    if record.statuses.is_empty() {
        // WHOIS rarely states a status for healthy registrations; reported
        // as implicit "active", unlike RDAP's always-explicit list.
        record.statuses.push("active".to_string());
    }

    apply_day_counts(&mut record);
    record
}

/// First line whose lower-cased text contains any of the labels.
fn find_labelled<'a>(lines: &[&'a str], labels: &[&str]) -> Option<&'a str> {
    lines.iter().copied().find(|line| {
        let lower = line.to_lowercase();
        labels.iter().any(|label| lower.contains(label))
    })
}

/// Value portion of a `label: value` line, taken after the last colon.
fn after_last_colon(line: &str) -> Option<String> {
    let (_, value) = line.rsplit_once(':')?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Date value of a `label: timestamp` line: everything after the label's
/// colon, truncated at the `T` time separator.
///
/// Splitting at the first colon matters here — RFC 3339 timestamps carry
/// colons of their own.
fn date_value(line: &str) -> Option<String> {
    let (_, value) = line.split_once(':')?;
    let value = date_portion(value);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Domain Name: EXAMPLE.COM
Registry Domain ID: 2336799_DOMAIN_COM-VRSN
Registrar: ICANN Reserved
Updated Date: 2024-08-14T07:01:44Z
Creation Date: 1995-08-14T04:00:00Z
Registry Expiry Date: 2030-08-13T04:00:00Z
Domain Status: clientDeleteProhibited
Domain Status: clientTransferProhibited
Name Server: A.IANA-SERVERS.NET
Name Server: B.IANA-SERVERS.NET
Name Server: A.IANA-SERVERS.NET
DNSSEC: signedDelegation signed
";

    #[test]
    fn test_parse_typical_registry_output() {
        let record = parse_whois(SAMPLE, "example.com");
        assert_eq!(record.registrar_name, "ICANN Reserved");
        assert_eq!(record.registration_date, "1995-08-14");
        assert_eq!(record.expiration_date, "2030-08-13");
        assert_eq!(record.last_updated_date, "2024-08-14");
        assert_eq!(
            record.statuses,
            vec!["clientDeleteProhibited", "clientTransferProhibited"]
        );
        assert_eq!(
            record.name_servers,
            vec!["A.IANA-SERVERS.NET", "B.IANA-SERVERS.NET"]
        );
        assert_eq!(record.dnssec, "signed");
        assert!(record.age_in_days > 0);
    }

    #[test]
    fn test_creation_date_round_trip() {
        let record = parse_whois("Creation Date: 2020-01-01T00:00:00Z\n", "example.com");
        assert_eq!(record.registration_date, "2020-01-01");
    }

    #[test]
    fn test_empty_payload_degrades_to_sentinels() {
        let record = parse_whois("", "example.com");
        assert_eq!(record.registrar_name, UNKNOWN);
        assert_eq!(record.registration_date, UNKNOWN);
        assert_eq!(record.expiration_date, UNKNOWN);
        assert_eq!(record.last_updated_date, UNKNOWN);
        assert_eq!(record.name_servers, vec![UNKNOWN]);
        assert_eq!(record.statuses, vec!["active"]);
        assert_eq!(record.dnssec, "unsigned");
        assert_eq!(record.age_in_days, 0);
        assert_eq!(record.remaining_days, 0);
    }

    #[test]
    fn test_unsigned_dnssec_is_not_signed() {
        let record = parse_whois("DNSSEC: unsigned\n", "example.com");
        assert_eq!(record.dnssec, "unsigned");
    }

    #[test]
    fn test_registered_on_label_variant() {
        // .uk registries phrase the creation date differently.
        let text = "Registered on: 2014-03-02\nExpiry date: 2026-03-02\n";
        let record = parse_whois(text, "example.co.uk");
        assert_eq!(record.registration_date, "2014-03-02");
        assert_eq!(record.expiration_date, "2026-03-02");
    }

    #[test]
    fn test_nserver_label_variant_and_dedup() {
        let text = "nserver: ns1.example.net\nnserver: ns2.example.net\nnserver: ns1.example.net\n";
        let record = parse_whois(text, "example.de");
        assert_eq!(record.name_servers, vec!["ns1.example.net", "ns2.example.net"]);
    }

    #[test]
    fn test_status_lines_without_colon_ignored() {
        let text = "the current status of the domain is unclear\nDomain Status: ok\n";
        let record = parse_whois(text, "example.com");
        assert_eq!(record.statuses, vec!["ok"]);
    }
}
