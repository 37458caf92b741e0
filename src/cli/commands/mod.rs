//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use serde::Serialize;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod embed;
pub mod locate;
pub mod search;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args),
        Commands::Locate(args) => locate::run(ctx, args),
        Commands::Embed(args) => embed::run(ctx, args),
    }
}

/// Print `payload` wrapped in the `{"status": "ok", ...}` envelope.
pub(crate) fn emit_robot<T: Serialize>(payload: &T) -> Result<()> {
    let mut value = serde_json::to_value(payload)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("status".to_string(), serde_json::Value::from("ok"));
    }
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}
