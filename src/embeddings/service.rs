//! Scoped query embedding.
//!
//! [`QueryEmbeddingService`] owns at most one provider session. The session
//! is opened by [`initialize`](QueryEmbeddingService::initialize), released
//! by [`close`](QueryEmbeddingService::close), and released again on drop if
//! the caller forgot. [`QueryEmbeddingService::scoped`] brackets a closure
//! with both.

use std::sync::Arc;

use tracing::debug;

use super::{EmbeddingProvider, EmbeddingSession};
use crate::error::{HsError, Result};

const NOT_INITIALIZED: &str = "embedding service not initialized; call initialize() first";

pub struct QueryEmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    credential: Option<String>,
    session: Option<Box<dyn EmbeddingSession>>,
}

impl QueryEmbeddingService {
    /// The credential may be unset here; it is only required by `initialize`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, credential: Option<String>) -> Self {
        Self {
            provider,
            credential,
            session: None,
        }
    }

    /// Run `f` against an initialized service, closing it on every exit path.
    pub fn scoped<T, F>(
        provider: Arc<dyn EmbeddingProvider>,
        credential: Option<String>,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let mut service = Self::new(provider, credential);
        service.initialize()?;
        let outcome = f(&service);
        service.close();
        outcome
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn dims(&self) -> usize {
        self.provider.dims()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Open the provider session. No-op when already open.
    pub fn initialize(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let credential = self
            .credential
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                HsError::MissingConfig(format!(
                    "embedding credential is required to initialize the {} provider",
                    self.provider.name()
                ))
            })?;

        self.session = Some(self.provider.open_session(credential)?);
        debug!(provider = %self.provider.name(), dims = self.provider.dims(), "embedding service initialized");
        Ok(())
    }

    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let session = self.session()?;
        if text.trim().is_empty() {
            return Err(HsError::EmbeddingGeneration(
                "cannot embed empty or whitespace-only text".to_string(),
            ));
        }

        let vector = session.embed(text)?;
        self.check_dims(&vector)?;
        Ok(vector)
    }

    /// Embed every non-blank entry of `texts`, in order. Blank entries are
    /// dropped before submission, so the output may be shorter than the input.
    pub fn batch_embed_queries(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let session = self.session()?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let kept: Vec<String> = texts
            .iter()
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .collect();
        if kept.is_empty() {
            return Err(HsError::EmbeddingGeneration(format!(
                "all {} texts are empty or whitespace-only",
                texts.len()
            )));
        }

        let vectors = session.embed_batch(&kept)?;
        if vectors.len() != kept.len() {
            return Err(HsError::EmbeddingProvider(format!(
                "expected {} vectors, got {}",
                kept.len(),
                vectors.len()
            )));
        }
        for vector in &vectors {
            self.check_dims(vector)?;
        }

        debug!(
            submitted = kept.len(),
            skipped = texts.len() - kept.len(),
            "batch embedded"
        );
        Ok(vectors)
    }

    /// Release the session. Safe to call when not initialized.
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
            debug!(provider = %self.provider.name(), "embedding service closed");
        }
    }

    fn session(&self) -> Result<&dyn EmbeddingSession> {
        self.session
            .as_deref()
            .ok_or_else(|| HsError::EmbeddingGeneration(NOT_INITIALIZED.to_string()))
    }

    fn check_dims(&self, vector: &[f32]) -> Result<()> {
        let expected = self.provider.dims();
        if vector.len() != expected {
            return Err(HsError::EmbeddingProvider(format!(
                "dimension mismatch: expected {expected}, got {}",
                vector.len()
            )));
        }
        Ok(())
    }
}

impl Drop for QueryEmbeddingService {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for QueryEmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEmbeddingService")
            .field("provider", &self.provider.name())
            .field("dims", &self.provider.dims())
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
