//!  Travel Buddy Trip Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! CLI for travel date extraction and flight offer search.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::cmp::max;
use travelbuddy_trip_agent::{
    DateRangeExtractor, ENV_BASE_URL, ENV_CLIENT_ID, ENV_CLIENT_SECRET, FlightOffer,
    FlightSearchGateway, GatewayConfig, SearchError, SearchRequest, to_records,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "travelbuddy-flights")]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a departure/return date pair from free text
    Dates {
        /// Free text, e.g. "Paris from Feb 5 to Feb 12"
        text: Vec<String>,
    },

    /// Search flight offers, repairing dates and codes first
    Search(SearchArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Origin airport or city code (e.g., PAR, CDG)
    #[arg(short, long)]
    from: String,

    /// Destination airport or city code (e.g., BER)
    #[arg(short, long)]
    to: String,

    /// Departure date (YYYY-MM-DD)
    #[arg(short, long, conflicts_with = "text")]
    date: Option<String>,

    /// Return date (YYYY-MM-DD)
    #[arg(short = 'R', long, conflicts_with = "text")]
    return_date: Option<String>,

    /// Free text to extract dates from instead of --date/--return-date
    #[arg(long)]
    text: Option<String>,

    /// Number of adults
    #[arg(short, long, default_value = "1")]
    adults: u32,

    /// Maximum number of offers
    #[arg(short, long, default_value = "5")]
    max: u32,

    /// Print offers as JSON records instead of a table
    #[arg(long)]
    json: bool,

    #[arg(long, env = ENV_CLIENT_ID, hide_env_values = true)]
    client_id: String,

    #[arg(long, env = ENV_CLIENT_SECRET, hide_env_values = true)]
    client_secret: String,

    #[arg(long, env = ENV_BASE_URL, default_value = travelbuddy_trip_agent::DEFAULT_BASE_URL)]
    base_url: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "20")]
    timeout: u64,
}

/// Configure logging based on verbosity level
fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Format an ISO 8601 duration such as `PT2H10M` as `2h 10m`.
fn fmt_iso_duration(iso: &str) -> String {
    let Some(body) = iso.strip_prefix("PT") else {
        return iso.to_string();
    };
    let mut hrs: u32 = 0;
    let mut mins: u32 = 0;
    let mut num = String::new();
    for c in body.chars() {
        match c {
            '0'..='9' => num.push(c),
            'H' => hrs = num.drain(..).collect::<String>().parse().unwrap_or(0),
            'M' => mins = num.drain(..).collect::<String>().parse().unwrap_or(0),
            _ => num.clear(),
        }
    }
    if mins == 0 {
        format!("{}h", hrs)
    } else if hrs == 0 {
        format!("{}m", mins)
    } else {
        format!("{}h {:02}m", hrs, mins)
    }
}

/// `HH:MM` from an ISO timestamp
fn clock_time(at: Option<&str>) -> &str {
    at.and_then(|s| s.get(11..16)).unwrap_or("??:??")
}

/// One display row per itinerary leg: carriers, times, duration, stops.
fn leg_columns(itinerary: &Value) -> (String, String, String, String) {
    let segments = itinerary["segments"].as_array().cloned().unwrap_or_default();
    let first = segments.first();
    let last = segments.last();

    let mut carriers: Vec<String> = segments
        .iter()
        .filter_map(|s| s["carrierCode"].as_str().map(str::to_string))
        .collect();
    carriers.dedup();
    let carriers = if carriers.is_empty() {
        "??".to_string()
    } else {
        carriers.join("/")
    };

    let times = format!(
        "{} {} → {} {}",
        first.and_then(|s| s["departure"]["iataCode"].as_str()).unwrap_or("???"),
        clock_time(first.and_then(|s| s["departure"]["at"].as_str())),
        last.and_then(|s| s["arrival"]["iataCode"].as_str()).unwrap_or("???"),
        clock_time(last.and_then(|s| s["arrival"]["at"].as_str())),
    );
    let duration = itinerary["duration"]
        .as_str()
        .map(fmt_iso_duration)
        .unwrap_or_else(|| "??".to_string());
    let stops = match segments.len().saturating_sub(1) {
        0 => "direct".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    };
    (carriers, times, duration, stops)
}

/// Get terminal width for responsive tables
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(100)
}

fn dash_bar() -> String {
    "-".repeat(get_terminal_width().min(100))
}

/// Route and dates actually searched, after repairs.
fn search_title(request: &SearchRequest) -> String {
    match &request.return_date {
        Some(rd) => format!(
            "{} → {} on {}, back {}",
            request.origin_code, request.dest_code, request.depart_date, rd
        ),
        None => format!(
            "{} → {} on {}",
            request.origin_code, request.dest_code, request.depart_date
        ),
    }
}

/// Render offers to stdout
fn render_offers(request: &SearchRequest, offers: &[FlightOffer]) {
    let title_bar = format!(
        "================================================================================================\n  🛫  {}\n================================================================================================",
        search_title(request)
    );
    println!("{}\n", title_bar);
    println!("📊 Total Offers: {}", offers.len());

    let rows: Vec<(usize, String, (String, String, String, String))> = offers
        .iter()
        .enumerate()
        .flat_map(|(i, offer)| {
            let price = match (offer.price.as_deref(), offer.raw["price"]["currency"].as_str()) {
                (Some(p), Some(cur)) => format!("{} {}", p, cur),
                (Some(p), None) => p.to_string(),
                (None, _) => "?".to_string(),
            };
            offer
                .itineraries
                .as_array()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(move |itin| (i + 1, price.clone(), leg_columns(&itin)))
        })
        .collect();

    let mut aw = 7;
    let mut tw = 15;
    let mut dw = 8;
    for (_, _, (carriers, times, duration, _)) in &rows {
        aw = max(aw, carriers.chars().count());
        tw = max(tw, times.chars().count());
        dw = max(dw, duration.len());
    }

    println!("{}\n", dash_bar());
    println!(
        "  {:>3}  {:<aw$}  {:<tw$}  {:<dw$}  {:<8}  PRICE",
        "#", "AIRLINE", "DEP → ARR", "DURATION", "STOPS"
    );
    println!("{}\n", dash_bar());

    let mut last_rank = 0;
    for (rank, price, (carriers, times, duration, stops)) in &rows {
        let (rank_label, price_label) = if *rank == last_rank {
            (String::new(), String::new())
        } else {
            (rank.to_string(), price.clone())
        };
        last_rank = *rank;
        println!(
            "  {:>3}  {:<aw$}  {:<tw$}  {:<dw$}  {:<8}  {}",
            rank_label, carriers, times, duration, stops, price_label
        );
    }
}

fn run_dates(text: &[String]) {
    let text = text.join(" ");
    let (range, source) = DateRangeExtractor::default().extract_with_source(&text);
    tracing::debug!("Extracted via {:?}", source);
    println!("depart: {}", range.depart_str());
    println!("return: {}", range.return_str());
    println!("nights: {}", range.nights());
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let mut config = GatewayConfig::new(args.client_id, args.client_secret);
    config.base_url = args.base_url.trim_end_matches('/').to_string();
    config.timeout_secs = args.timeout;
    config.adults = args.adults;
    config.max_results = args.max;
    tracing::debug!("Gateway config: {:?}", config);

    let gateway =
        FlightSearchGateway::from_config(config).context("Failed to create flight gateway")?;

    let (depart, return_date) = match (&args.text, &args.date) {
        (Some(text), _) => {
            let range = DateRangeExtractor::default().extract(text);
            tracing::info!("Dates from text: {}", range);
            (range.depart_str(), Some(range.return_str()))
        }
        (None, Some(date)) => (date.clone(), args.return_date.clone()),
        (None, None) => anyhow::bail!("Either --date or --text is required"),
    };

    let request = match gateway.sanitize(&args.from, &args.to, &depart, return_date.as_deref()) {
        Ok(request) => request,
        Err(e) if args.json => {
            println!("{}", serde_json::to_string_pretty(&to_records(&Err(e)))?);
            return Ok(());
        }
        Err(e) => anyhow::bail!("{}", e),
    };
    tracing::debug!("Sanitized request: {:?}", request);

    let result = gateway.search(&request).await.context("Search failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_records(&result))?);
        return Ok(());
    }

    match result {
        Ok(offers) => {
            render_offers(&request, &offers);
            Ok(())
        }
        Err(SearchError::Provider(msg)) => anyhow::bail!("Provider error: {}", msg),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    tracing::info!("Starting travelbuddy-flights CLI");

    match args.command {
        Command::Dates { text } => {
            run_dates(&text);
            Ok(())
        }
        Command::Search(search) => run_search(search).await,
    }
}
