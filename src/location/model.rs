//! Language model providers for location extraction.
//!
//! A provider exposes one capability: turn query text into
//! [`RawLocationFields`]. Nothing it returns is trusted until it passes
//! through [`LocationIntent::from_raw`](super::LocationIntent::from_raw).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::intent::RawLocationFields;
use crate::config::LocationConfig;
use crate::error::{HsError, Result};
use crate::http::error_reason;

/// Structured-extraction capability of a language model.
///
/// Implementations are shared across concurrent searches and must not keep
/// per-call mutable state.
pub trait LanguageModel: Send + Sync {
    /// Provider/model name for logs.
    fn name(&self) -> &str;

    /// Extract the location fields from `query`.
    fn extract_location(&self, query: &str) -> Result<RawLocationFields>;
}

const SYSTEM_PROMPT: &str = r#"You extract geographic intent from real-estate search queries.

Think step by step about which words in the query name a place, then answer with a single JSON object with exactly these keys:
- "reasoning": a short explanation of your decision
- "city": city name in its usual capitalization, or "unknown"
- "state": two-letter US state code or state name, or "unknown"
- "neighborhood": neighborhood or district name, or "unknown"
- "zip_code": five-digit postal code, or "unknown"
- "has_location": true if any of city, state, neighborhood or zip_code is known, otherwise false
- "cleaned_query": the query with every location phrase (including connecting words like "in" or "near") removed, keeping all property features
- "confidence": a number between 0.0 and 1.0 for how sure you are about the location

Never invent a location the query does not mention."#;

/// OpenAI-compatible `chat/completions` model in JSON mode.
pub struct ChatCompletionModel {
    endpoint: String,
    model: String,
    temperature: f32,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for ChatCompletionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionModel")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionModel {
    /// Build the client once; the handle is reused for every query.
    pub fn from_config(config: &LocationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| HsError::MissingConfig("location.api_key".to_string()))?;
        if config.base_url.trim().is_empty() {
            return Err(HsError::Config(
                "location.base_url is empty; set [location].base_url".to_string(),
            ));
        }
        if config.model.trim().is_empty() {
            return Err(HsError::Config(
                "location.model is empty; set [location].model".to_string(),
            ));
        }

        let client = crate::http::authorized_client(
            &format!("Bearer {api_key}"),
            Duration::from_secs(config.timeout_secs.max(1)),
        )?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: Value,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LanguageModel for ChatCompletionModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn extract_location(&self, query: &str) -> Result<RawLocationFields> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            response_format: serde_json::json!({ "type": "json_object" }),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: query,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|err| HsError::LocationExtraction(format!("request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| HsError::LocationExtraction(format!("read response: {err}")))?;
        if !status.is_success() {
            return Err(HsError::LocationExtraction(format!(
                "model returned HTTP {status}: {}",
                error_reason(&body)
            )));
        }

        let body: ChatResponse = serde_json::from_str(&body)
            .map_err(|err| HsError::LocationExtraction(format!("response parse: {err}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| HsError::LocationExtraction("model returned no content".to_string()))?;

        let raw = parse_fields(&content)?;
        if let Some(reasoning) = &raw.reasoning {
            debug!(model = %self.model, reasoning = %reasoning, "location extraction reasoning");
        }
        Ok(raw)
    }
}

/// Parse model content into raw fields, tolerating a Markdown code fence.
pub fn parse_fields(content: &str) -> Result<RawLocationFields> {
    let trimmed = strip_code_fence(content.trim());
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|err| HsError::LocationExtraction(format!("content is not JSON: {err}")))?;
    if !value.is_object() {
        return Err(HsError::LocationExtraction(
            "content is not a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|err| HsError::LocationExtraction(format!("unexpected field shape: {err}")))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
