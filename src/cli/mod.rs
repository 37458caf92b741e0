//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;

/// homeseek - Location-aware hybrid property search
#[derive(Parser, Debug)]
#[command(name = "homeseek")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit JSON on stdout (results or a structured error) and JSON logs on stderr
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/homeseek/config.toml, then ./homeseek.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a hybrid (lexical + vector, RRF-fused) property search
    Search(commands::search::SearchArgs),

    /// Show the location intent extracted from a query
    Locate(commands::locate::LocateArgs),

    /// Embed one or more texts with the configured provider
    Embed(commands::embed::EmbedArgs),
}
