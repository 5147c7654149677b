//! Normalization of RDAP JSON payloads.

use super::{apply_day_counts, date_portion};
use crate::types::{NormalizedRecord, UNKNOWN};
use serde_json::Value;

/// Reduce an RDAP payload to the canonical record shape.
///
/// Every extraction is best-effort over `serde_json::Value`; a field the
/// payload doesn't carry stays at its sentinel. This function never fails.
pub fn parse_rdap(payload: &Value, identifier: &str) -> NormalizedRecord {
    let mut record = NormalizedRecord::unknown(identifier);

    // Status list, order preserved.
    if let Some(statuses) = payload.get("status").and_then(|s| s.as_array()) {
        for status in statuses {
            if let Some(s) = status.as_str() {
                record.statuses.push(s.to_string());
            }
        }
    }

    // Registrar name from the first registrar-role entity's contact card.
    if let Some(entities) = payload.get("entities").and_then(|e| e.as_array()) {
        for entity in entities {
            let is_registrar = entity
                .get("roles")
                .and_then(|r| r.as_array())
                .map(|roles| roles.iter().any(|role| role.as_str() == Some("registrar")))
                .unwrap_or(false);

            if is_registrar {
                if let Some(name) = extract_vcard_text(entity) {
                    record.registrar_name = name;
                    break;
                }
            }
        }
    }

    // Registration lifecycle dates from the events list.
    if let Some(events) = payload.get("events").and_then(|e| e.as_array()) {
        for event in events {
            let (Some(action), Some(date)) = (
                event.get("eventAction").and_then(|a| a.as_str()),
                event.get("eventDate").and_then(|d| d.as_str()),
            ) else {
                continue;
            };

            match action {
                "registration" => record.registration_date = date_portion(date),
                "expiration" => record.expiration_date = date_portion(date),
                "last changed" | "last update of RDAP database" => {
                    record.last_updated_date = date_portion(date)
                }
                _ => {}
            }
        }
    }

    // Nameserver hostnames, de-duplicated in listing order.
    if let Some(nameservers) = payload.get("nameservers").and_then(|ns| ns.as_array()) {
        for ns in nameservers {
            if let Some(host) = ns.get("ldhName").and_then(|n| n.as_str()) {
                if !record.name_servers.iter().any(|h| h == host) {
                    record.name_servers.push(host.to_string());
                }
            }
        }
    }
    if record.name_servers.is_empty() {
        record.name_servers.push(UNKNOWN.to_string());
    }

    record.dnssec = if payload
        .pointer("/secureDNS/delegationSigned")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        "signed".to_string()
    } else {
        "unsigned".to_string()
    };

    apply_day_counts(&mut record);
    record
}

/// Pull the registrar's display name out of the jCard structure.
///
/// Accepts either the `fn` or `org` property; the text value sits at
/// index 3 of the property array.
fn extract_vcard_text(entity: &Value) -> Option<String> {
    let properties = entity
        .get("vcardArray")
        .and_then(|v| v.as_array())?
        .get(1)?
        .as_array()?;

    for wanted in ["fn", "org"] {
        for property in properties {
            let Some(items) = property.as_array() else {
                continue;
            };
            if items.len() >= 4 && items.first().and_then(|f| f.as_str()) == Some(wanted) {
                if let Some(text) = items.get(3).and_then(|n| n.as_str()) {
                    if !text.is_empty() {
                        return Some(text.to_string());
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_payload() {
        let payload = json!({
            "ldhName": "EXAMPLE.COM",
            "status": ["client delete prohibited", "client transfer prohibited"],
            "entities": [
                {
                    "roles": ["registrar"],
                    "vcardArray": ["vcard", [
                        ["version", {}, "text", "4.0"],
                        ["fn", {}, "text", "Example Registrar Inc."]
                    ]]
                }
            ],
            "events": [
                { "eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z" },
                { "eventAction": "expiration", "eventDate": "2030-08-13T04:00:00Z" },
                { "eventAction": "last changed", "eventDate": "2024-08-14T07:01:44Z" }
            ],
            "nameservers": [
                { "ldhName": "A.IANA-SERVERS.NET" },
                { "ldhName": "B.IANA-SERVERS.NET" },
                { "ldhName": "A.IANA-SERVERS.NET" }
            ],
            "secureDNS": { "delegationSigned": true }
        });

        let record = parse_rdap(&payload, "example.com");
        assert_eq!(record.identifier, "example.com");
        assert_eq!(record.statuses.len(), 2);
        assert_eq!(record.statuses[0], "client delete prohibited");
        assert_eq!(record.registrar_name, "Example Registrar Inc.");
        assert_eq!(record.registration_date, "1995-08-14");
        assert_eq!(record.expiration_date, "2030-08-13");
        assert_eq!(record.last_updated_date, "2024-08-14");
        assert_eq!(
            record.name_servers,
            vec!["A.IANA-SERVERS.NET", "B.IANA-SERVERS.NET"]
        );
        assert_eq!(record.dnssec, "signed");
        assert!(record.age_in_days > 0);
        assert!(record.remaining_days != 0);
    }

    #[test]
    fn test_parse_empty_payload_degrades_to_sentinels() {
        let record = parse_rdap(&json!({}), "example.com");
        assert!(record.statuses.is_empty());
        assert_eq!(record.registrar_name, UNKNOWN);
        assert_eq!(record.registration_date, UNKNOWN);
        assert_eq!(record.expiration_date, UNKNOWN);
        assert_eq!(record.last_updated_date, UNKNOWN);
        assert_eq!(record.name_servers, vec![UNKNOWN]);
        assert_eq!(record.dnssec, "unsigned");
        assert_eq!(record.age_in_days, 0);
        assert_eq!(record.remaining_days, 0);
    }

    #[test]
    fn test_registrar_falls_back_to_org_property() {
        let payload = json!({
            "entities": [{
                "roles": ["registrar"],
                "vcardArray": ["vcard", [
                    ["org", {}, "text", "Registrar Org Ltd."]
                ]]
            }]
        });
        let record = parse_rdap(&payload, "example.com");
        assert_eq!(record.registrar_name, "Registrar Org Ltd.");
    }

    #[test]
    fn test_non_registrar_entities_ignored() {
        let payload = json!({
            "entities": [{
                "roles": ["registrant"],
                "vcardArray": ["vcard", [["fn", {}, "text", "Jane Doe"]]]
            }]
        });
        let record = parse_rdap(&payload, "example.com");
        assert_eq!(record.registrar_name, UNKNOWN);
    }

    #[test]
    fn test_last_update_of_rdap_database_counts_as_update() {
        let payload = json!({
            "events": [
                { "eventAction": "last update of RDAP database", "eventDate": "2024-01-02T03:04:05Z" }
            ]
        });
        let record = parse_rdap(&payload, "example.com");
        assert_eq!(record.last_updated_date, "2024-01-02");
    }

    #[test]
    fn test_malformed_shapes_do_not_panic() {
        // Wrong types everywhere; the parser must shrug and move on.
        let payload = json!({
            "status": "not-an-array",
            "entities": [{ "roles": "registrar", "vcardArray": 42 }],
            "events": [{ "eventAction": 1, "eventDate": null }, "garbage"],
            "nameservers": [{ "ldhName": 17 }],
            "secureDNS": { "delegationSigned": "yes" }
        });
        let record = parse_rdap(&payload, "example.com");
        assert_eq!(record.registrar_name, UNKNOWN);
        assert_eq!(record.dnssec, "unsigned");
        assert_eq!(record.name_servers, vec![UNKNOWN]);
    }
}
