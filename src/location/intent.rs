//! Location intent extracted from a query.
//!
//! Language model output crosses into the crate as [`RawLocationFields`]:
//! every field is an untyped JSON value. [`LocationIntent::from_raw`] is the
//! only way to turn that into an intent, and it enforces the invariants:
//!
//! - `"unknown"` and empty strings are absent values
//! - `has_location` is false when city, state, neighborhood and zip are all absent
//! - `confidence` is in `[0.0, 1.0]` and is `0.0` whenever `has_location` is false
//! - `cleaned_query` is never empty for a non-empty query

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel the extractor uses for "no value".
pub const UNKNOWN_SENTINEL: &str = "unknown";

/// Untrusted extractor output, one JSON value per requested field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocationFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<Value>,
    #[serde(default, alias = "zip", skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_location: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_query: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
}

/// Validated geographic intent for one query. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationIntent {
    city: Option<String>,
    state: Option<String>,
    neighborhood: Option<String>,
    zip_code: Option<String>,
    has_location: bool,
    cleaned_query: String,
    confidence: f64,
}

impl LocationIntent {
    /// The "no location" intent: nothing extracted, query passed through.
    #[must_use]
    pub fn none(query: &str) -> Self {
        Self {
            city: None,
            state: None,
            neighborhood: None,
            zip_code: None,
            has_location: false,
            cleaned_query: query.to_string(),
            confidence: 0.0,
        }
    }

    /// Validate and coerce raw extractor output for `query`.
    #[must_use]
    pub fn from_raw(query: &str, raw: RawLocationFields) -> Self {
        let city = raw.city.as_ref().and_then(coerce_text);
        let state = raw.state.as_ref().and_then(coerce_text);
        let neighborhood = raw.neighborhood.as_ref().and_then(coerce_text);
        let zip_code = raw.zip_code.as_ref().and_then(coerce_text);

        let any_field = city.is_some() || state.is_some() || neighborhood.is_some() || zip_code.is_some();
        // The extractor's own flag is only trusted when a field backs it up.
        let claimed = raw.has_location.as_ref().and_then(coerce_flag).unwrap_or(any_field);
        let has_location = any_field && claimed;

        if !has_location {
            return Self::none(query);
        }

        let confidence = raw
            .confidence
            .as_ref()
            .map_or(0.0, coerce_confidence);
        let cleaned_query = raw
            .cleaned_query
            .as_ref()
            .and_then(coerce_text)
            .unwrap_or_else(|| query.to_string());

        Self {
            city,
            state,
            neighborhood,
            zip_code,
            has_location,
            cleaned_query,
            confidence,
        }
    }

    /// Start building an intent from known values; the result goes through
    /// the same validation as extractor output.
    #[must_use]
    pub fn builder(query: impl Into<String>) -> LocationIntentBuilder {
        LocationIntentBuilder {
            query: query.into(),
            raw: RawLocationFields::default(),
        }
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn neighborhood(&self) -> Option<&str> {
        self.neighborhood.as_deref()
    }

    #[must_use]
    pub fn zip_code(&self) -> Option<&str> {
        self.zip_code.as_deref()
    }

    #[must_use]
    pub const fn has_location(&self) -> bool {
        self.has_location
    }

    /// Query text with location phrases removed.
    #[must_use]
    pub fn cleaned_query(&self) -> &str {
        &self.cleaned_query
    }

    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Number of location fields present.
    #[must_use]
    pub fn field_count(&self) -> usize {
        [&self.city, &self.state, &self.neighborhood, &self.zip_code]
            .iter()
            .filter(|field| field.is_some())
            .count()
    }
}

/// Builder over [`RawLocationFields`] for callers that already know the values.
#[derive(Debug, Clone)]
pub struct LocationIntentBuilder {
    query: String,
    raw: RawLocationFields,
}

impl LocationIntentBuilder {
    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.raw.city = Some(Value::String(city.into()));
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.raw.state = Some(Value::String(state.into()));
        self
    }

    #[must_use]
    pub fn neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.raw.neighborhood = Some(Value::String(neighborhood.into()));
        self
    }

    #[must_use]
    pub fn zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.raw.zip_code = Some(Value::String(zip_code.into()));
        self
    }

    #[must_use]
    pub fn cleaned_query(mut self, cleaned: impl Into<String>) -> Self {
        self.raw.cleaned_query = Some(Value::String(cleaned.into()));
        self
    }

    #[must_use]
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.raw.confidence = serde_json::Number::from_f64(confidence).map(Value::Number);
        self
    }

    #[must_use]
    pub fn build(self) -> LocationIntent {
        LocationIntent::from_raw(&self.query, self.raw)
    }
}

/// Strings and numbers become trimmed text; the sentinel and blanks are absent.
fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || text.eq_ignore_ascii_case(UNKNOWN_SENTINEL) {
        None
    } else {
        Some(text)
    }
}

fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_confidence(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => 0.0,
    }
}
