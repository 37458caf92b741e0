//! homeseek search - Hybrid property search
//!
//! Lexical and vector retrieval fused with RRF, narrowed by any location
//! the query mentions.

use clap::Args;
use colored::Colorize;
use serde_json::Value;

use super::emit_robot;
use crate::app::AppContext;
use crate::error::Result;
use crate::location::LocationIntent;
use crate::search::{HybridSearchParams, HybridSearchResult};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query, e.g. "3 bedroom house with a pool in Austin"
    pub query: String,

    /// Maximum number of results (default: search.default_size)
    #[arg(long, short)]
    pub size: Option<usize>,

    /// RRF rank constant k (default: search.rank_constant)
    #[arg(long)]
    pub rank_constant: Option<u32>,

    /// Candidates per retriever eligible for fusion (default: search.rank_window_size)
    #[arg(long)]
    pub rank_window_size: Option<usize>,

    /// Skip location extraction and search the raw query
    #[arg(long)]
    pub no_location: bool,

    /// Print the composed backend request instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let engine = ctx.engine(!args.no_location);
    let params = build_params(ctx, args, engine.understand(&args.query))?;

    if args.dry_run {
        let request = engine.build_request(&params)?;
        if ctx.robot_mode {
            return emit_robot(&serde_json::json!({
                "query": args.query,
                "effective_query": params.effective_query(),
                "request": request,
            }));
        }
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let result = engine.search(&params)?;
    if ctx.robot_mode {
        emit_robot(&result)
    } else {
        display_human(&result, params.location_intent());
        Ok(())
    }
}

fn build_params(ctx: &AppContext, args: &SearchArgs, intent: LocationIntent) -> Result<HybridSearchParams> {
    let search = &ctx.config.search;
    let size = args.size.unwrap_or(search.default_size);
    let window = args
        .rank_window_size
        .unwrap_or_else(|| search.rank_window_size.max(size));

    let mut builder = HybridSearchParams::builder(args.query.as_str())
        .defaults_from(search)
        .size(size)
        .rank_window_size(window)
        .location_intent(intent);
    if let Some(rank_constant) = args.rank_constant {
        builder = builder.rank_constant(rank_constant);
    }
    builder.build()
}

fn display_human(result: &HybridSearchResult, intent: Option<&LocationIntent>) {
    if let Some(intent) = intent.filter(|intent| intent.has_location()) {
        let place: Vec<&str> = [
            intent.neighborhood(),
            intent.city(),
            intent.state(),
            intent.zip_code(),
        ]
        .into_iter()
        .flatten()
        .collect();
        println!(
            "{} {} {}",
            "Location:".bold(),
            place.join(", ").cyan(),
            format!("(confidence {:.2})", intent.confidence()).dimmed()
        );
        println!(
            "{} \"{}\"",
            "Searching for:".bold(),
            result.fusion.effective_query.green()
        );
    }

    if result.is_empty() {
        println!("{} No properties matched \"{}\"", "!".yellow(), result.query);
        return;
    }

    println!(
        "{} {} of {} matches in {}ms",
        "Results:".bold(),
        result.len().to_string().cyan(),
        result.total,
        result.latency_ms
    );
    println!();

    for (rank, hit) in result.results.iter().enumerate() {
        let title = hit.source["title"].as_str().unwrap_or(hit.id.as_str());
        println!(
            "{:>3}. {} {}",
            rank + 1,
            title.bold(),
            format!("[{:.4}]", hit.score).dimmed()
        );
        let summary = summarize_source(&hit.source);
        if !summary.is_empty() {
            println!("     {}", summary);
        }
    }
}

/// One-line price / rooms / address summary of a property document.
fn summarize_source(source: &Value) -> String {
    let mut parts = Vec::new();
    if let Some(price) = source["price"].as_f64() {
        parts.push(format!("${price:.0}"));
    }
    if let Some(bedrooms) = source["bedrooms"].as_u64() {
        parts.push(format!("{bedrooms} bd"));
    }
    if let Some(bathrooms) = source["bathrooms"].as_f64() {
        parts.push(format!("{bathrooms} ba"));
    }
    let address = &source["address"];
    let location: Vec<&str> = ["street", "city", "state"]
        .iter()
        .filter_map(|key| address[*key].as_str())
        .collect();
    if !location.is_empty() {
        parts.push(location.join(", "));
    }
    parts.join(" · ")
}
