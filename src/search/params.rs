//! Search request tunables and typed results.

use serde::Serialize;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::{HsError, Result};
use crate::location::{FilterPredicate, LocationIntent};

/// One search request's tunables. Built and validated through
/// [`HybridSearchParams::builder`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridSearchParams {
    query_text: String,
    size: usize,
    rank_constant: u32,
    rank_window_size: usize,
    text_boost: f32,
    vector_boost: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_intent: Option<LocationIntent>,
}

impl HybridSearchParams {
    pub fn builder(query_text: impl Into<String>) -> HybridSearchParamsBuilder {
        HybridSearchParamsBuilder::new(query_text)
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn rank_constant(&self) -> u32 {
        self.rank_constant
    }

    pub const fn rank_window_size(&self) -> usize {
        self.rank_window_size
    }

    pub const fn text_boost(&self) -> f32 {
        self.text_boost
    }

    pub const fn vector_boost(&self) -> f32 {
        self.vector_boost
    }

    pub fn location_intent(&self) -> Option<&LocationIntent> {
        self.location_intent.as_ref()
    }

    /// The intent, but only when it actually carries a location.
    pub fn active_location(&self) -> Option<&LocationIntent> {
        self.location_intent
            .as_ref()
            .filter(|intent| intent.has_location())
    }

    /// Text both retrievers run against: the cleaned query when a location
    /// was found, the raw query otherwise.
    pub fn effective_query(&self) -> &str {
        self.active_location()
            .map_or(self.query_text.as_str(), LocationIntent::cleaned_query)
    }
}

#[derive(Debug, Clone)]
pub struct HybridSearchParamsBuilder {
    query_text: String,
    size: usize,
    rank_constant: u32,
    rank_window_size: usize,
    text_boost: f32,
    vector_boost: f32,
    location_intent: Option<LocationIntent>,
}

impl HybridSearchParamsBuilder {
    fn new(query_text: impl Into<String>) -> Self {
        let defaults = SearchConfig::default();
        Self {
            query_text: query_text.into(),
            size: defaults.default_size,
            rank_constant: defaults.rank_constant,
            rank_window_size: defaults.rank_window_size,
            text_boost: defaults.text_boost,
            vector_boost: defaults.vector_boost,
            location_intent: None,
        }
    }

    /// Take size, RRF and boost defaults from configuration.
    #[must_use]
    pub fn defaults_from(mut self, config: &SearchConfig) -> Self {
        self.size = config.default_size;
        self.rank_constant = config.rank_constant;
        self.rank_window_size = config.rank_window_size;
        self.text_boost = config.text_boost;
        self.vector_boost = config.vector_boost;
        self
    }

    #[must_use]
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn rank_constant(mut self, rank_constant: u32) -> Self {
        self.rank_constant = rank_constant;
        self
    }

    #[must_use]
    pub fn rank_window_size(mut self, rank_window_size: usize) -> Self {
        self.rank_window_size = rank_window_size;
        self
    }

    #[must_use]
    pub fn text_boost(mut self, boost: f32) -> Self {
        self.text_boost = boost;
        self
    }

    #[must_use]
    pub fn vector_boost(mut self, boost: f32) -> Self {
        self.vector_boost = boost;
        self
    }

    #[must_use]
    pub fn location_intent(mut self, intent: LocationIntent) -> Self {
        self.location_intent = Some(intent);
        self
    }

    pub fn build(self) -> Result<HybridSearchParams> {
        if self.size == 0 {
            return Err(HsError::InvalidParams("size must be greater than 0".to_string()));
        }
        if self.rank_constant == 0 {
            return Err(HsError::InvalidParams(
                "rank_constant must be greater than 0".to_string(),
            ));
        }
        if self.rank_window_size < self.size {
            return Err(HsError::InvalidParams(format!(
                "rank_window_size ({}) must be at least size ({})",
                self.rank_window_size, self.size
            )));
        }
        for (name, boost) in [("text_boost", self.text_boost), ("vector_boost", self.vector_boost)] {
            if !boost.is_finite() || boost < 0.0 {
                return Err(HsError::InvalidParams(format!(
                    "{name} must be a finite, non-negative number (got {boost})"
                )));
            }
        }

        Ok(HybridSearchParams {
            query_text: self.query_text,
            size: self.size,
            rank_constant: self.rank_constant,
            rank_window_size: self.rank_window_size,
            text_boost: self.text_boost,
            vector_boost: self.vector_boost,
            location_intent: self.location_intent,
        })
    }
}

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    /// Fused RRF score as computed by the backend.
    pub score: f64,
    pub source: Value,
}

/// Summary of one retrieval leg, kept for observability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RetrieverSummary {
    Standard {
        fields: Vec<String>,
        fuzziness: String,
        boost: f32,
        filter_count: usize,
    },
    Knn {
        field: String,
        k: usize,
        num_candidates: usize,
        boost: f32,
        filter_count: usize,
    },
}

/// How the fused request was put together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionMetadata {
    pub effective_query: String,
    pub rank_constant: u32,
    pub rank_window_size: usize,
    pub retrievers: Vec<RetrieverSummary>,
    pub location_filters: Vec<FilterPredicate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridSearchResult {
    pub query: String,
    pub total: u64,
    pub latency_ms: u64,
    /// Server-side query time reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_took_ms: Option<u64>,
    pub results: Vec<SearchResult>,
    pub fusion: FusionMetadata,
}

impl HybridSearchResult {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}
