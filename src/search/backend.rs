//! Search backend boundary and the Elasticsearch implementation.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::request::RrfSearchRequest;
use crate::config::BackendConfig;
use crate::error::{HsError, Result};
use crate::http::{authorized_client, error_reason, plain_client};

/// Executes a fused request and returns ranked hits.
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    fn search(&self, request: &RrfSearchRequest) -> Result<BackendResponse>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendHit {
    pub id: String,
    pub score: f64,
    pub source: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendResponse {
    pub total: u64,
    pub took_ms: Option<u64>,
    pub hits: Vec<BackendHit>,
}

impl BackendResponse {
    /// Parse an Elasticsearch `_search` response body.
    ///
    /// `hits.total` may be a bare number or `{"value": n}`; when missing the
    /// hit count is used. A hit without `_score` scores 0.
    pub fn from_json(body: &Value) -> Result<Self> {
        let hits_obj = body
            .get("hits")
            .ok_or_else(|| HsError::Backend("response has no hits section".to_string()))?;
        let raw_hits = hits_obj
            .get("hits")
            .and_then(Value::as_array)
            .ok_or_else(|| HsError::Backend("response hits.hits is not an array".to_string()))?;

        let mut hits = Vec::with_capacity(raw_hits.len());
        for (position, hit) in raw_hits.iter().enumerate() {
            let id = match hit.get("_id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(HsError::Backend(format!(
                        "hit {position} has no _id"
                    )));
                }
            };
            hits.push(BackendHit {
                id,
                score: hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0),
                source: hit.get("_source").cloned().unwrap_or(Value::Null),
            });
        }

        let total = match hits_obj.get("total") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::Object(obj)) => obj.get("value").and_then(Value::as_u64),
            _ => None,
        }
        .unwrap_or(hits.len() as u64);

        Ok(Self {
            total,
            took_ms: body.get("took").and_then(Value::as_u64),
            hits,
        })
    }
}

/// `POST {url}/{index}/_search` over blocking HTTP.
#[derive(Debug, Clone)]
pub struct ElasticsearchBackend {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl ElasticsearchBackend {
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let url = config.url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(HsError::Config("backend.url must not be empty".to_string()));
        }
        let index = config.index.trim();
        if index.is_empty() {
            return Err(HsError::Config("backend.index must not be empty".to_string()));
        }

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => authorized_client(&format!("ApiKey {key}"), timeout)?,
            _ => plain_client(timeout)?,
        };

        Ok(Self {
            endpoint: format!("{url}/{index}/_search"),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SearchBackend for ElasticsearchBackend {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    fn search(&self, request: &RrfSearchRequest) -> Result<BackendResponse> {
        debug!(endpoint = %self.endpoint, size = request.size, "submitting rrf request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|err| HsError::Backend(format!("request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| HsError::Backend(format!("read response: {err}")))?;
        if !status.is_success() {
            return Err(HsError::Backend(format!(
                "HTTP {status}: {}",
                error_reason(&body)
            )));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|err| HsError::Backend(format!("response parse: {err}")))?;
        BackendResponse::from_json(&value)
    }
}
