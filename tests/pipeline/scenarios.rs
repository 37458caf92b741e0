//! Query → extraction → filters → fused request, against in-process doubles.

use std::sync::Arc;

use serde_json::json;

use homeseek::HsError;
use homeseek::config::SearchConfig;
use homeseek::embeddings::HashEmbeddingProvider;
use homeseek::location::{LocationFilterBuilder, LocationUnderstandingModule};
use homeseek::search::{BackendResponse, HybridSearchEngine, RrfSearchRequest};
use homeseek::test_utils::doubles::{
    CountingEmbeddingProvider, FailingLanguageModel, RecordingBackend, ScriptedLanguageModel,
};
use homeseek::test_utils::fixtures;

fn scripted_model() -> ScriptedLanguageModel {
    ScriptedLanguageModel::new()
        .with_response(
            "museums in San Francisco",
            json!({
                "reasoning": "San Francisco is a city; no state, neighborhood or zip given.",
                "city": "San Francisco",
                "state": "unknown",
                "neighborhood": "unknown",
                "zip_code": "unknown",
                "has_location": true,
                "cleaned_query": "museums",
                "confidence": 0.92
            }),
        )
        .with_response(
            "modern kitchen with stainless steel appliances",
            json!({
                "reasoning": "No place is mentioned.",
                "city": "unknown",
                "state": "unknown",
                "neighborhood": "unknown",
                "zip_code": "unknown",
                "has_location": false,
                "cleaned_query": "modern kitchen with stainless steel appliances",
                "confidence": 0.0
            }),
        )
}

fn engine_with(
    backend: Arc<RecordingBackend>,
    module: LocationUnderstandingModule,
) -> HybridSearchEngine {
    HybridSearchEngine::new(
        backend,
        Arc::new(HashEmbeddingProvider::new(32)),
        Some("test-key".to_string()),
        SearchConfig::default(),
    )
    .with_location_understanding(module)
}

fn only_request(backend: &RecordingBackend) -> RrfSearchRequest {
    let requests = backend.requests();
    assert_eq!(requests.len(), 1, "expected exactly one backend call");
    requests.into_iter().next().unwrap()
}

#[test]
fn query_without_location_uses_raw_text_and_no_filters() {
    let query = "modern kitchen with stainless steel appliances";
    let module = LocationUnderstandingModule::new(Arc::new(scripted_model()));
    assert!(!module.extract(query).has_location());

    let backend = Arc::new(RecordingBackend::new(fixtures::sample_backend_response()));
    let result = engine_with(backend.clone(), module).search_query(query, None).unwrap();

    let request = only_request(&backend);
    let standard = request.standard().unwrap();
    assert_eq!(standard.query.bool_query.must[0]["multi_match"]["query"], query);
    assert!(request.retrievers().iter().all(|r| r.filter().is_empty()));
    assert_eq!(result.fusion.effective_query, query);
    assert!(result.fusion.location_filters.is_empty());
    assert_eq!(result.results.len(), 2);
}

#[test]
fn city_in_query_becomes_shared_filter_and_cleaned_text() {
    let query = "museums in San Francisco";
    let module = LocationUnderstandingModule::new(Arc::new(scripted_model()));

    let intent = module.extract(query);
    assert!(intent.has_location());
    assert_eq!(intent.city(), Some("San Francisco"));
    assert!(intent.state().is_none());
    assert!(intent.cleaned_query().contains("museums"));
    assert!(!intent.cleaned_query().contains("San Francisco"));
    assert_eq!(LocationFilterBuilder::default().build(&intent).len(), 1);

    let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
    engine_with(backend.clone(), module).search_query(query, None).unwrap();

    let request = only_request(&backend);
    let expected = vec![json!({ "term": { "address.city": "San Francisco" } })];
    assert_eq!(request.retrievers()[0].filter(), expected.as_slice());
    assert_eq!(request.retrievers()[1].filter(), expected.as_slice());
    assert_eq!(
        request.standard().unwrap().query.bool_query.must[0]["multi_match"]["query"],
        "museums"
    );
}

#[test]
fn extractor_failure_still_searches_original_text() {
    let query = "craftsman bungalow in Portland";
    let model = Arc::new(FailingLanguageModel::new("upstream timed out"));
    let module = LocationUnderstandingModule::new(model.clone());

    let backend = Arc::new(RecordingBackend::new(fixtures::sample_backend_response()));
    let result = engine_with(backend.clone(), module).search_query(query, None).unwrap();

    assert_eq!(model.calls(), 1);
    let request = only_request(&backend);
    assert!(request.retrievers().iter().all(|r| r.filter().is_empty()));
    assert_eq!(result.fusion.effective_query, query);
    assert_eq!(result.total, 42);
}

#[test]
fn size_ten_bounds_knn_pools() {
    let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
    let module = LocationUnderstandingModule::new(Arc::new(scripted_model()));
    engine_with(backend.clone(), module)
        .search_query("sunny two bedroom", Some(10))
        .unwrap();

    let request = only_request(&backend);
    let knn = request.knn().unwrap();
    assert!(knn.k <= 50);
    assert!(knn.num_candidates <= 100);
    assert!(knn.num_candidates >= knn.k);
    assert_eq!(request.size, 10);
}

#[test]
fn request_always_has_standard_then_knn() {
    let module = LocationUnderstandingModule::new(Arc::new(scripted_model()));
    let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
    let engine = engine_with(backend.clone(), module);

    engine.search_query("museums in San Francisco", None).unwrap();
    engine.search_query("quiet street", None).unwrap();

    for request in backend.requests() {
        let kinds: Vec<_> = request.retrievers().iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec!["standard", "knn"]);
    }
}

#[test]
fn embedding_failure_propagates_and_skips_backend() {
    let backend = Arc::new(RecordingBackend::new(BackendResponse::default()));
    let provider = Arc::new(CountingEmbeddingProvider::new(8).with_output_dims(4));
    let engine = HybridSearchEngine::new(
        backend.clone(),
        provider.clone(),
        Some("k".to_string()),
        SearchConfig::default(),
    );

    let err = engine.search_query("loft", None).unwrap_err();
    assert!(matches!(err, HsError::EmbeddingProvider(_)));
    assert!(backend.requests().is_empty());
    assert_eq!(provider.sessions_closed(), 1);
}

#[test]
fn backend_failure_is_reported_as_search_failure() {
    let backend = Arc::new(RecordingBackend::unreachable("connection refused"));
    let module = LocationUnderstandingModule::new(Arc::new(scripted_model()));
    let err = engine_with(backend, module)
        .search_query("loft", None)
        .unwrap_err();
    assert!(matches!(err, HsError::Backend(_)));
}
