//! Hybrid search orchestration.
//!
//! ```text
//! params ─► effective query ─► QueryEmbeddingService::scoped ─► vector ─┐
//!        └► active location ─► LocationFilterBuilder ─► filters ────────┤
//!                                                                       ▼
//!                                      RrfSearchRequest::compose ─► SearchBackend
//! ```
//!
//! Embedding errors propagate as they are. Anything the backend returns is
//! surfaced as [`HsError::Backend`]. Location extraction never fails here.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::backend::SearchBackend;
use super::params::{FusionMetadata, HybridSearchParams, HybridSearchResult, SearchResult};
use super::request::RrfSearchRequest;
use crate::config::SearchConfig;
use crate::embeddings::{EmbeddingProvider, QueryEmbeddingService};
use crate::error::{HsError, Result};
use crate::location::{
    FilterPredicate, LocationFilterBuilder, LocationIntent, LocationUnderstandingModule,
    to_filter_clauses,
};

pub struct HybridSearchEngine {
    backend: Arc<dyn SearchBackend>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    embedding_credential: Option<String>,
    config: SearchConfig,
    filter_builder: LocationFilterBuilder,
    location: Option<LocationUnderstandingModule>,
}

impl std::fmt::Debug for HybridSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSearchEngine")
            .field("backend", &self.backend.name())
            .field("embedding_provider", &self.embedding_provider.name())
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl HybridSearchEngine {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        embedding_credential: Option<String>,
        config: SearchConfig,
    ) -> Self {
        let filter_builder = LocationFilterBuilder::new(config.location_fields.clone());
        Self {
            backend,
            embedding_provider,
            embedding_credential,
            config,
            filter_builder,
            location: None,
        }
    }

    /// Enable location extraction in [`search_query`](Self::search_query).
    #[must_use]
    pub fn with_location_understanding(mut self, module: LocationUnderstandingModule) -> Self {
        self.location = Some(module);
        self
    }

    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Extract location intent for `query`, or pass it through untouched when
    /// extraction is disabled.
    pub fn understand(&self, query: &str) -> LocationIntent {
        self.location
            .as_ref()
            .map_or_else(|| LocationIntent::none(query), |module| module.extract(query))
    }

    /// Run the whole pipeline for a free-text query with configured defaults.
    ///
    /// `size` overrides `default_size`; the rank window grows to cover it.
    pub fn search_query(&self, query: &str, size: Option<usize>) -> Result<HybridSearchResult> {
        let params = self.params_for(query, size)?;
        self.search(&params)
    }

    /// Params for `query` using configured defaults and extracted location.
    pub fn params_for(&self, query: &str, size: Option<usize>) -> Result<HybridSearchParams> {
        let size = size.unwrap_or(self.config.default_size);
        HybridSearchParams::builder(query)
            .defaults_from(&self.config)
            .size(size)
            .rank_window_size(self.config.rank_window_size.max(size))
            .location_intent(self.understand(query))
            .build()
    }

    /// Embed and compose the request without submitting it.
    pub fn build_request(&self, params: &HybridSearchParams) -> Result<RrfSearchRequest> {
        self.compose(params).map(|(request, _)| request)
    }

    pub fn search(&self, params: &HybridSearchParams) -> Result<HybridSearchResult> {
        let started = Instant::now();
        let (request, predicates) = self.compose(params)?;

        let response = self.backend.search(&request).map_err(as_backend_failure)?;
        let backend_took_ms = response.took_ms;

        let results: Vec<SearchResult> = response
            .hits
            .into_iter()
            .map(|hit| SearchResult {
                id: hit.id,
                score: hit.score,
                source: hit.source,
            })
            .collect();
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            backend = self.backend.name(),
            total = response.total,
            returned = results.len(),
            latency_ms,
            backend_took_ms = backend_took_ms.unwrap_or_default(),
            "hybrid search complete"
        );

        Ok(HybridSearchResult {
            query: params.query_text().to_string(),
            total: response.total,
            latency_ms,
            backend_took_ms,
            fusion: FusionMetadata {
                effective_query: params.effective_query().to_string(),
                rank_constant: params.rank_constant(),
                rank_window_size: params.rank_window_size(),
                retrievers: request.summarize(params, &self.config),
                location_filters: predicates,
            },
            results,
        })
    }

    fn compose(&self, params: &HybridSearchParams) -> Result<(RrfSearchRequest, Vec<FilterPredicate>)> {
        let text = params.effective_query();
        let vector = QueryEmbeddingService::scoped(
            Arc::clone(&self.embedding_provider),
            self.embedding_credential.clone(),
            |service| service.embed_query(text),
        )?;

        let predicates = params
            .active_location()
            .map(|intent| self.filter_builder.build(intent))
            .unwrap_or_default();

        let request = RrfSearchRequest::compose(
            params,
            vector,
            to_filter_clauses(&predicates),
            &self.config,
        );

        let knn = request.knn();
        debug!(
            query = text,
            filters = predicates.len(),
            size = request.size,
            k = knn.map_or(0, |knn| knn.k),
            num_candidates = knn.map_or(0, |knn| knn.num_candidates),
            rank_constant = params.rank_constant(),
            rank_window_size = params.rank_window_size(),
            "composed rrf request"
        );

        Ok((request, predicates))
    }
}

fn as_backend_failure(err: HsError) -> HsError {
    match err {
        HsError::Backend(_) => err,
        other => HsError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbeddingProvider;
    use crate::search::BackendResponse;
    use crate::test_utils::doubles::{
        CountingEmbeddingProvider, FailingLanguageModel, RecordingBackend, ScriptedLanguageModel,
    };
    use crate::test_utils::fixtures;
    use serde_json::json;

    fn engine(backend: Arc<RecordingBackend>) -> HybridSearchEngine {
        HybridSearchEngine::new(
            backend,
            Arc::new(HashEmbeddingProvider::new(8)),
            Some("test-key".to_string()),
            SearchConfig::default(),
        )
    }

    #[test]
    fn search_maps_hits_in_backend_order() {
        let backend = Arc::new(RecordingBackend::new(fixtures::sample_backend_response()));
        let params = HybridSearchParams::builder("loft").size(2).build().unwrap();

        let result = engine(backend.clone()).search(&params).unwrap();

        assert_eq!(result.query, "loft");
        assert_eq!(result.total, 42);
        assert_eq!(result.backend_took_ms, Some(7));
        let ids: Vec<_> = result.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["prop-1", "prop-2"]);
        assert_eq!(backend.requests().len(), 1);
        assert_eq!(result.fusion.retrievers.len(), 2);
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HybridSearchEngine>();
    }

    #[test]
    fn concurrent_searches_use_independent_sessions() {
        const THREADS: usize = 8;
        let provider = Arc::new(CountingEmbeddingProvider::new(8));
        let backend = Arc::new(RecordingBackend::new(fixtures::sample_backend_response()));
        let engine = HybridSearchEngine::new(
            backend.clone(),
            provider.clone(),
            Some("k".to_string()),
            SearchConfig::default(),
        );

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let engine = &engine;
                    scope.spawn(move || {
                        let params = HybridSearchParams::builder(format!("loft {i}"))
                            .size(2)
                            .build()
                            .unwrap();
                        engine.search(&params).unwrap()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().len(), 2);
            }
        });

        assert_eq!(provider.sessions_opened(), THREADS);
        assert_eq!(provider.sessions_closed(), THREADS);
        assert_eq!(provider.texts_embedded(), THREADS);
        assert_eq!(backend.requests().len(), THREADS);
    }

    #[test]
    fn location_intent_drives_text_and_filters() {
        let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
        let intent = LocationIntent::builder("museums in San Francisco")
            .city("San Francisco")
            .cleaned_query("museums")
            .confidence(0.9)
            .build();
        let params = HybridSearchParams::builder("museums in San Francisco")
            .location_intent(intent)
            .build()
            .unwrap();

        let result = engine(backend.clone()).search(&params).unwrap();
        let request = backend.last_request().unwrap();

        assert_eq!(result.fusion.effective_query, "museums");
        assert_eq!(result.fusion.location_filters.len(), 1);
        let expected = vec![json!({ "term": { "address.city": "San Francisco" } })];
        assert_eq!(request.retrievers()[0].filter(), expected.as_slice());
        assert_eq!(request.retrievers()[1].filter(), expected.as_slice());
    }

    #[test]
    fn embedding_is_scoped_per_search() {
        let provider = Arc::new(CountingEmbeddingProvider::new(8));
        let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
        let engine = HybridSearchEngine::new(
            backend,
            provider.clone(),
            Some("k".to_string()),
            SearchConfig::default(),
        );
        let params = HybridSearchParams::builder("patio").build().unwrap();

        engine.search(&params).unwrap();
        engine.search(&params).unwrap();

        assert_eq!(provider.sessions_opened(), 2);
        assert_eq!(provider.sessions_closed(), 2);
    }

    #[test]
    fn missing_credential_fails_before_backend() {
        let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
        let engine = HybridSearchEngine::new(
            backend.clone(),
            Arc::new(HashEmbeddingProvider::new(8)),
            None,
            SearchConfig::default(),
        );
        let params = HybridSearchParams::builder("patio").build().unwrap();

        assert!(matches!(engine.search(&params), Err(HsError::MissingConfig(_))));
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn blank_query_is_embedding_error() {
        let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
        let params = HybridSearchParams::builder("   ").build().unwrap();
        assert!(matches!(
            engine(backend).search(&params),
            Err(HsError::EmbeddingGeneration(_))
        ));
    }

    #[test]
    fn backend_failures_become_search_failures() {
        let backend = Arc::new(RecordingBackend::unreachable("connection reset"));
        let params = HybridSearchParams::builder("patio").build().unwrap();

        let err = engine(backend).search(&params).unwrap_err();
        assert!(matches!(err, HsError::Backend(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn search_query_extracts_location() {
        let model = ScriptedLanguageModel::new().with_response(
            "3 bedroom house in Austin",
            json!({
                "city": "Austin",
                "state": "unknown",
                "has_location": true,
                "cleaned_query": "3 bedroom house",
                "confidence": 0.8
            }),
        );
        let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
        let engine = engine(backend.clone())
            .with_location_understanding(LocationUnderstandingModule::new(Arc::new(model)));

        let result = engine.search_query("3 bedroom house in Austin", None).unwrap();

        assert_eq!(result.fusion.effective_query, "3 bedroom house");
        assert_eq!(result.fusion.location_filters.len(), 1);
        assert_eq!(backend.last_request().unwrap().size, 10);
    }

    #[test]
    fn search_query_survives_extractor_failure() {
        let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
        let engine = engine(backend.clone()).with_location_understanding(
            LocationUnderstandingModule::new(Arc::new(FailingLanguageModel::default())),
        );

        let result = engine.search_query("house in Boston", Some(5)).unwrap();

        assert_eq!(result.fusion.effective_query, "house in Boston");
        assert!(result.fusion.location_filters.is_empty());
        assert!(backend.last_request().unwrap().knn().unwrap().filter.is_empty());
    }

    #[test]
    fn search_query_widens_window_for_large_sizes() {
        let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
        let engine = engine(backend.clone());
        engine.search_query("barn", Some(150)).unwrap();
        let request = backend.last_request().unwrap();
        assert_eq!(request.retriever.rrf.rank_window_size, 150);
        assert_eq!(request.knn().unwrap().k, 100);
    }

    #[test]
    fn build_request_does_not_touch_backend() {
        let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
        let params = HybridSearchParams::builder("studio").size(3).build().unwrap();
        let request = engine(backend.clone()).build_request(&params).unwrap();
        assert_eq!(request.size, 3);
        assert_eq!(request.knn().unwrap().query_vector.len(), 8);
        assert!(backend.requests().is_empty());
    }
}
