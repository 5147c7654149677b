//! Domain Query CLI Application
//!
//! A command-line interface for registration-metadata lookups over RDAP and
//! WHOIS, registrar price comparison, and the supported-suffix listing.
//! This CLI is a thin shell over the domain-query-lib engine.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use domain_query_lib::{
    load_env_config, CallerIdentity, LookupMode, LookupRequest, ObjectType, PriceKind,
    QueryEngine,
};
use std::process;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-query
#[derive(Parser, Debug)]
#[command(name = "domain-query")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look up domain registration metadata via RDAP with WHOIS fallback")]
#[command(styles = STYLES)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", global = true)]
    pub json: bool,

    /// Credential exempting this client from quota limits
    #[arg(long = "auth", value_name = "SECRET", global = true)]
    pub auth: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve registration metadata for a domain, IP, AS number, or entity
    Lookup {
        /// The identifier to resolve
        identifier: String,

        /// RDAP object type: domain, ip, autnum, or entity
        #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "domain")]
        object_type: String,

        /// Query the WHOIS gateway directly, skipping RDAP
        #[arg(long = "whois")]
        whois: bool,
    },

    /// Compare registrar prices for a domain's suffix
    Price {
        /// Domain whose suffix to price
        domain: String,

        /// Price kind to sort by: registration, renewal, or transfer
        #[arg(short = 's', long = "sort", value_name = "KIND", default_value = "registration")]
        sort_by: String,
    },

    /// List the suffixes the resolver can serve over RDAP
    Tlds,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(message) = run(args).await {
        ui::print_error(&message);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), String> {
    let engine = QueryEngine::with_config(load_env_config())
        .map_err(|e| format!("failed to initialize engine: {}", e))?;

    // A CLI invocation is one local caller; quota gating matters for the
    // embedding/server case but still runs here for parity.
    let caller = match &args.auth {
        Some(secret) => CallerIdentity::with_credential("local", secret),
        None => CallerIdentity::anonymous("local"),
    };

    match args.command {
        Command::Lookup {
            identifier,
            object_type,
            whois,
        } => {
            let request = if whois {
                LookupRequest::whois(&identifier)
            } else {
                let object_type = ObjectType::from_str_loose(&object_type).ok_or_else(|| {
                    format!(
                        "unknown object type '{}' (expected domain, ip, autnum, or entity)",
                        object_type
                    )
                })?;
                LookupRequest::new(LookupMode::Rdap, Some(object_type), &identifier)
            };

            let report = engine.resolve(&request, &caller).await;
            let lookup = report.outcome.map_err(|e| e.to_string())?;
            if args.json {
                ui::print_json(&lookup)?;
            } else {
                ui::print_lookup(&lookup);
                ui::print_quota_line(&report.quota, report.auth_mode);
            }
        }

        Command::Price { domain, sort_by } => {
            let kind = PriceKind::from_str_loose(&sort_by).ok_or_else(|| {
                format!(
                    "unknown price kind '{}' (expected registration, renewal, or transfer)",
                    sort_by
                )
            })?;

            let report = engine.price_lookup(&domain, kind, &caller).await;
            let info = report.outcome.map_err(|e| e.to_string())?;
            if args.json {
                ui::print_json(&info)?;
            } else {
                ui::print_prices(&domain, &info);
                ui::print_quota_line(&report.quota, report.auth_mode);
            }
        }

        Command::Tlds => {
            let report = engine.list_supported_suffixes(&caller).await;
            let listing = report.outcome.map_err(|e| e.to_string())?;
            if args.json {
                ui::print_json(&listing)?;
            } else {
                ui::print_suffixes(&listing);
                ui::print_quota_line(&report.quota, report.auth_mode);
            }
        }
    }

    Ok(())
}
