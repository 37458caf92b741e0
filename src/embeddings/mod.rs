//! Query embeddings.
//!
//! A provider hands out sessions; a session turns text into vectors. The
//! credential is only needed when a session is opened, so a provider can be
//! built (and asked for its `dims`) without one.

pub mod api;
pub mod hash;
pub mod service;

use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::error::{HsError, Result};

pub use api::ApiEmbeddingProvider;
pub use hash::{HashEmbedder, HashEmbeddingProvider};
pub use service::QueryEmbeddingService;

/// Pluggable embedding backend.
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Provider-defined vector length.
    fn dims(&self) -> usize;

    /// Open a session authenticated with `credential`.
    fn open_session(&self, credential: &str) -> Result<Box<dyn EmbeddingSession>>;
}

/// An open connection to an embedding provider.
pub trait EmbeddingSession: Send {
    /// Embed several texts, one vector per input, in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| HsError::EmbeddingProvider("provider returned no vector".to_string()))
    }

    /// Release provider-side resources. Called exactly once.
    fn close(&mut self) {}
}

/// Build the configured embedding provider.
pub fn build_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    if config.dims == 0 {
        return Err(HsError::Config(
            "embedding.dims must be greater than 0".to_string(),
        ));
    }

    match config.provider.trim().to_lowercase().as_str() {
        "" | "api" => Ok(Arc::new(ApiEmbeddingProvider::from_config(config)?)),
        "hash" => Ok(Arc::new(HashEmbeddingProvider::new(config.dims))),
        other => Err(HsError::Config(format!(
            "unknown embedding provider: {other}"
        ))),
    }
}
