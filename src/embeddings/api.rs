//! OpenAI-compatible `/embeddings` provider.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingProvider, EmbeddingSession};
use crate::config::EmbeddingConfig;
use crate::error::{HsError, Result};
use crate::http::{authorized_client, error_reason};

#[derive(Debug, Clone)]
pub struct ApiEmbeddingProvider {
    endpoint: String,
    model: String,
    dims: usize,
    timeout: Duration,
}

impl ApiEmbeddingProvider {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(HsError::Config(
                "embedding.base_url is empty; set [embedding].base_url".to_string(),
            ));
        }
        if config.model.trim().is_empty() {
            return Err(HsError::Config(
                "embedding.model is empty; set [embedding].model".to_string(),
            ));
        }
        Ok(Self {
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            dims: config.dims,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }
}

impl EmbeddingProvider for ApiEmbeddingProvider {
    fn name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn open_session(&self, credential: &str) -> Result<Box<dyn EmbeddingSession>> {
        let client = authorized_client(&format!("Bearer {credential}"), self.timeout)?;
        debug!(endpoint = %self.endpoint, model = %self.model, "embedding session opened");
        Ok(Box::new(ApiEmbeddingSession {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            dims: self.dims,
            client: Some(client),
        }))
    }
}

struct ApiEmbeddingSession {
    endpoint: String,
    model: String,
    dims: usize,
    client: Option<reqwest::blocking::Client>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingSession for ApiEmbeddingSession {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| HsError::EmbeddingGeneration("session is closed".to_string()))?;

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dims,
            encoding_format: "float",
        };

        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|err| HsError::EmbeddingProvider(format!("request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| HsError::EmbeddingProvider(format!("read response: {err}")))?;
        if !status.is_success() {
            return Err(HsError::EmbeddingProvider(format!(
                "HTTP {status}: {}",
                error_reason(&body)
            )));
        }

        let mut parsed: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|err| HsError::EmbeddingProvider(format!("response parse: {err}")))?;
        if parsed.data.len() != texts.len() {
            return Err(HsError::EmbeddingProvider(format!(
                "expected {} vectors, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|datum| datum.index);
        Ok(parsed.data.into_iter().map(|datum| datum.embedding).collect())
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            debug!(endpoint = %self.endpoint, "embedding session closed");
        }
    }
}
