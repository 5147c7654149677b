//! Identifier validation and small parsing helpers.

use crate::error::DomainQueryError;
use crate::types::{LookupMode, LookupRequest, ObjectType};

lazy_static::lazy_static! {
    /// DNS-label syntax: dot-separated labels of 1-63 alphanumeric-or-hyphen
    /// characters, no label starting or ending with a hyphen.
    static ref DNS_LABEL_RE: regex::Regex = regex::Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("DNS label regex is valid");
}

/// Check an identifier against DNS-label syntax.
///
/// Applies to domain and IP identifiers (dotted IPv4 strings are valid
/// label sequences). AS numbers and entity handles are not label-shaped
/// and are only checked for non-emptiness by the caller.
pub fn is_valid_dns_name(identifier: &str) -> bool {
    !identifier.is_empty() && DNS_LABEL_RE.is_match(identifier)
}

/// Validate a lookup request's identifier, failing fast on bad input.
pub fn validate_request(request: &LookupRequest) -> Result<(), DomainQueryError> {
    if request.identifier.is_empty() {
        return Err(DomainQueryError::invalid_input(
            "identifier cannot be empty",
        ));
    }

    match request.mode {
        LookupMode::Rdap => {
            let object_type = request.object_type.ok_or_else(|| {
                DomainQueryError::invalid_input("RDAP lookups require an object type")
            })?;
            match object_type {
                ObjectType::Domain | ObjectType::Ip => {
                    if !is_valid_dns_name(&request.identifier) {
                        return Err(DomainQueryError::invalid_input(format!(
                            "'{}' is not a valid domain/IP identifier",
                            request.identifier
                        )));
                    }
                }
                // AS numbers and entity handles have registry-specific
                // shapes; the aggregator is the authority on those.
                ObjectType::Autnum | ObjectType::Entity => {}
            }
        }
        LookupMode::Whois => {
            if !is_valid_dns_name(&request.identifier) {
                return Err(DomainQueryError::invalid_input(format!(
                    "'{}' is not a valid domain identifier",
                    request.identifier
                )));
            }
        }
    }

    Ok(())
}

/// Extract the pricing suffix of a domain: the substring after the last
/// dot, or the whole string when there is no dot.
///
/// Deliberately one label only, so "sub.example.co.uk" maps to "uk".
/// True public-suffix-list resolution is out of scope.
pub fn suffix_of(domain: &str) -> &str {
    match domain.rfind('.') {
        Some(idx) => &domain[idx + 1..],
        None => domain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_dns_name() {
        assert!(is_valid_dns_name("example.com"));
        assert!(is_valid_dns_name("sub.example.co.uk"));
        assert!(is_valid_dns_name("xn--p1ai.com"));
        assert!(is_valid_dns_name("8.8.8.8"));
        assert!(is_valid_dns_name("example"));

        assert!(!is_valid_dns_name(""));
        assert!(!is_valid_dns_name("-bad-.com"));
        assert!(!is_valid_dns_name("bad-.com"));
        assert!(!is_valid_dns_name("-bad.com"));
        assert!(!is_valid_dns_name("ex ample.com"));
        assert!(!is_valid_dns_name("example..com"));
        assert!(!is_valid_dns_name(".example.com"));
    }

    #[test]
    fn test_validate_request_rdap_requires_object_type() {
        let mut req = LookupRequest::rdap_domain("example.com");
        assert!(validate_request(&req).is_ok());

        req.object_type = None;
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_validate_request_entity_skips_label_check() {
        let req = LookupRequest::new(
            LookupMode::Rdap,
            Some(ObjectType::Entity),
            "IANA-REGISTRAR-42",
        );
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_validate_request_whois_rejects_bad_domain() {
        let req = LookupRequest::whois("-bad-.com");
        assert!(validate_request(&req).is_err());

        let req = LookupRequest::whois("xn--p1ai.com");
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_suffix_of_takes_last_label() {
        assert_eq!(suffix_of("example.com"), "com");
        assert_eq!(suffix_of("sub.example.co.uk"), "uk");
        assert_eq!(suffix_of("localhost"), "localhost");
        assert_eq!(suffix_of("site.xyz"), "xyz");
    }
}
