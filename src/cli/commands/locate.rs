//! homeseek locate - Show extracted location intent

use clap::Args;
use colored::Colorize;

use super::emit_robot;
use crate::app::AppContext;
use crate::error::Result;
use crate::location::{LocationFilterBuilder, LocationIntent, to_filter_clauses};

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Query to analyse
    pub query: String,
}

pub fn run(ctx: &AppContext, args: &LocateArgs) -> Result<()> {
    let (intent, model) = match &ctx.location {
        Some(module) => (module.extract(&args.query), Some(module.model_name())),
        None => (LocationIntent::none(&args.query), None),
    };
    let predicates =
        LocationFilterBuilder::new(ctx.config.search.location_fields.clone()).build(&intent);

    if ctx.robot_mode {
        return emit_robot(&serde_json::json!({
            "query": args.query,
            "model": model,
            "intent": intent,
            "filters": to_filter_clauses(&predicates),
        }));
    }

    match model {
        Some(model) => println!("{} {}", "Model:".bold(), model.cyan()),
        None => println!(
            "{} location extraction is disabled (set location.api_key)",
            "!".yellow()
        ),
    }
    println!("{} {}", "Has location:".bold(), yes_no(intent.has_location()));
    for (label, value) in [
        ("City", intent.city()),
        ("State", intent.state()),
        ("Neighborhood", intent.neighborhood()),
        ("Zip", intent.zip_code()),
    ] {
        if let Some(value) = value {
            println!("  {label}: {}", value.green());
        }
    }
    println!("{} \"{}\"", "Cleaned query:".bold(), intent.cleaned_query());
    println!("{} {:.2}", "Confidence:".bold(), intent.confidence());

    if !predicates.is_empty() {
        println!("{}", "Filters:".bold());
        for predicate in &predicates {
            println!("  {} = {}", predicate.field.cyan(), predicate.value);
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value { "yes".green() } else { "no".dimmed() }
}
