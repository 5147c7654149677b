//! Terminal rendering for the domain-query CLI.
//!
//! All human-readable output lives here: the lookup detail card, the price
//! table, the suffix listing, and the dim quota footer. Uses only the
//! `console` crate. JSON output bypasses this module entirely.

use console::{pad_str, style, Alignment};
use domain_query_lib::{
    AuthMode, PriceInfo, QuotaStatus, ResolvedLookup, SuffixListing, UNKNOWN,
};
use serde::Serialize;

const LABEL_WIDTH: usize = 14;

fn detail_line(label: &str, value: &str) {
    let padded = pad_str(label, LABEL_WIDTH, Alignment::Left, None);
    if value == UNKNOWN {
        println!("  {}{}", style(padded).dim(), style(value).dim());
    } else {
        println!("  {}{}", style(padded).dim(), value);
    }
}

/// Render a resolved lookup as a detail card.
pub fn print_lookup(lookup: &ResolvedLookup) {
    let record = &lookup.record;

    println!(
        "{}  {}",
        style(&record.identifier).bold(),
        style(format!("via {}", lookup.source)).dim()
    );
    if let Some(note) = &lookup.fallback_note {
        println!("  {}", style(note).yellow());
    }
    println!();

    detail_line("Registrar", &record.registrar_name);
    detail_line("Registered", &record.registration_date);
    detail_line("Expires", &record.expiration_date);
    detail_line("Updated", &record.last_updated_date);
    detail_line("Status", &record.statuses.join(", "));
    detail_line("Nameservers", &record.name_servers.join(", "));
    detail_line("DNSSEC", &record.dnssec);

    if record.age_in_days > 0 {
        detail_line("Age", &format!("{} days", record.age_in_days));
    }
    if record.remaining_days != 0 {
        let remaining = if record.remaining_days > 0 {
            format!("{} days", record.remaining_days)
        } else {
            format!("expired {} days ago", -record.remaining_days)
        };
        detail_line("Remaining", &remaining);
    }
}

/// Render the cheapest registrar quotes for a domain's suffix.
pub fn print_prices(domain: &str, info: &PriceInfo) {
    println!(
        "{}  {}",
        style(domain).bold(),
        style(format!("cheapest .{} {} prices", info.suffix, info.sorted_by)).dim()
    );
    println!();

    for quote in &info.quotes {
        let registrar = pad_str(&quote.registrar, 18, Alignment::Left, Some(".."));
        println!(
            "  {}  {} {}  {}",
            registrar,
            style(format!("{:.2}", quote.price)).green().bold(),
            quote.currency,
            style(format!("/ {}", quote.period)).dim()
        );
    }

    if info.quotes.iter().any(|q| q.registrar == "Unknown") {
        println!();
        println!(
            "  {}",
            style("No registrar listings for this suffix; showing indicative pricing.").dim()
        );
    }
}

/// Render the supported-suffix listing.
pub fn print_suffixes(listing: &SuffixListing) {
    println!(
        "{} {}",
        style(format!("{} supported suffixes", listing.total)).bold(),
        style(format!("(source: {})", listing.source)).dim()
    );
    println!();

    // Flow the suffixes into columns instead of one per line.
    const PER_ROW: usize = 8;
    for row in listing.suffixes.chunks(PER_ROW) {
        let line: Vec<String> = row
            .iter()
            .map(|e| format!("{:<9}", format!(".{}", e.suffix)))
            .collect();
        println!("  {}", line.join(""));
    }
}

/// Dim one-line quota footer shown after every command.
pub fn print_quota_line(quota: &QuotaStatus, auth_mode: AuthMode) {
    println!();
    let line = match auth_mode {
        AuthMode::None => format!("quota: {} used this window", quota.count),
        mode => format!("quota: exempt ({})", mode),
    };
    println!("{}", style(line).dim());
}

/// Print an error message to stderr in the CLI's house style.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold(), message);
}

/// Serialize any payload as pretty JSON on stdout.
pub fn print_json<T: Serialize>(payload: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(payload)
        .map_err(|e| format!("failed to render JSON output: {}", e))?;
    println!("{}", rendered);
    Ok(())
}
