pub mod app;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod http;
pub mod location;
pub mod search;
pub mod test_utils;

pub use error::{HsError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
