//! Hybrid lexical + vector retrieval fused with RRF.
//!
//! - [`params`]: request tunables and typed results
//! - [`request`]: RRF request composition and kNN bounds
//! - [`backend`]: the Search Backend boundary and its Elasticsearch client
//! - [`engine`]: orchestration of extraction, embedding and the backend call

pub mod backend;
pub mod engine;
pub mod params;
pub mod request;

pub use backend::{BackendHit, BackendResponse, ElasticsearchBackend, SearchBackend};
pub use engine::HybridSearchEngine;
pub use params::{
    FusionMetadata, HybridSearchParams, HybridSearchParamsBuilder, HybridSearchResult,
    RetrieverSummary, SearchResult,
};
pub use request::{KnnRetriever, Retriever, RrfSearchRequest, StandardRetriever, knn_bounds};
