//! RRF request composition.
//!
//! The backend does the score arithmetic; this module decides what it is
//! asked. Every request has exactly two retrievers, `standard` then `knn`,
//! and both carry the same filter list.
//!
//! ```text
//! {"retriever": {"rrf": {"retrievers": [{"standard": ...}, {"knn": ...}],
//!                        "rank_constant": k, "rank_window_size": w}},
//!  "size": n, "_source": [...]}
//! ```

use serde::Serialize;
use serde_json::{Value, json};

use super::params::{HybridSearchParams, RetrieverSummary};
use crate::config::SearchConfig;

/// `k` and `num_candidates` for the kNN leg.
///
/// `size` is floored at 1 and the bound at 1, so both values are always at
/// least 1 and `num_candidates >= k`.
pub fn knn_bounds(size: usize, upper_bound: usize) -> (usize, usize) {
    let base = size.max(1);
    let upper = upper_bound.max(1);
    let k = base.saturating_mul(5).min(upper);
    let num_candidates = base.saturating_mul(10).min(upper);
    (k, num_candidates)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RrfSearchRequest {
    pub retriever: RootRetriever,
    pub size: usize,
    #[serde(rename = "_source")]
    pub source: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootRetriever {
    pub rrf: RrfRetriever,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RrfRetriever {
    pub retrievers: Vec<Retriever>,
    pub rank_constant: u32,
    pub rank_window_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Retriever {
    Standard(StandardRetriever),
    Knn(KnnRetriever),
}

impl Retriever {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Standard(_) => "standard",
            Self::Knn(_) => "knn",
        }
    }

    pub fn filter(&self) -> &[Value] {
        match self {
            Self::Standard(standard) => &standard.query.bool_query.filter,
            Self::Knn(knn) => &knn.filter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardRetriever {
    pub query: LexicalQuery,
}

/// `bool` query: one fuzzy `multi_match` under `must`, location terms under `filter`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexicalQuery {
    #[serde(rename = "bool")]
    pub bool_query: BoolQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolQuery {
    pub must: Vec<Value>,
    pub filter: Vec<Value>,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnnRetriever {
    pub field: String,
    pub query_vector: Vec<f32>,
    pub k: usize,
    pub num_candidates: usize,
    pub filter: Vec<Value>,
}

impl RrfSearchRequest {
    /// Compose the fused request for `params`.
    ///
    /// `vector` is the embedding of `params.effective_query()` and `filters`
    /// the rendered location predicates (possibly empty).
    pub fn compose(
        params: &HybridSearchParams,
        vector: Vec<f32>,
        filters: Vec<Value>,
        config: &SearchConfig,
    ) -> Self {
        let (k, num_candidates) = knn_bounds(params.size(), config.knn_upper_bound);

        let multi_match = json!({
            "multi_match": {
                "query": params.effective_query(),
                "fields": config.lexical_fields,
                "type": "best_fields",
                "fuzziness": config.fuzziness,
            }
        });

        let standard = Retriever::Standard(StandardRetriever {
            query: LexicalQuery {
                bool_query: BoolQuery {
                    must: vec![multi_match],
                    filter: filters.clone(),
                    boost: params.text_boost(),
                },
            },
        });
        let knn = Retriever::Knn(KnnRetriever {
            field: config.embedding_field.clone(),
            query_vector: vector,
            k,
            num_candidates,
            filter: filters,
        });

        Self {
            retriever: RootRetriever {
                rrf: RrfRetriever {
                    retrievers: vec![standard, knn],
                    rank_constant: params.rank_constant(),
                    rank_window_size: params.rank_window_size(),
                },
            },
            size: params.size(),
            source: config.source_fields.clone(),
        }
    }

    pub fn retrievers(&self) -> &[Retriever] {
        &self.retriever.rrf.retrievers
    }

    pub fn standard(&self) -> Option<&StandardRetriever> {
        self.retrievers().iter().find_map(|retriever| match retriever {
            Retriever::Standard(standard) => Some(standard),
            Retriever::Knn(_) => None,
        })
    }

    pub fn knn(&self) -> Option<&KnnRetriever> {
        self.retrievers().iter().find_map(|retriever| match retriever {
            Retriever::Knn(knn) => Some(knn),
            Retriever::Standard(_) => None,
        })
    }

    /// Per-leg summaries for [`super::FusionMetadata`].
    pub fn summarize(&self, params: &HybridSearchParams, config: &SearchConfig) -> Vec<RetrieverSummary> {
        self.retrievers()
            .iter()
            .map(|retriever| match retriever {
                Retriever::Standard(standard) => RetrieverSummary::Standard {
                    fields: config.lexical_fields.clone(),
                    fuzziness: config.fuzziness.clone(),
                    boost: standard.query.bool_query.boost,
                    filter_count: standard.query.bool_query.filter.len(),
                },
                Retriever::Knn(knn) => RetrieverSummary::Knn {
                    field: knn.field.clone(),
                    k: knn.k,
                    num_candidates: knn.num_candidates,
                    boost: params.vector_boost(),
                    filter_count: knn.filter.len(),
                },
            })
            .collect()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
