//! The real HTTP providers wired through `AppContext`, served by httpmock.

use httpmock::prelude::*;
use serde_json::json;

use homeseek::HsError;
use homeseek::app::AppContext;
use homeseek::config::Config;
use homeseek::test_utils::fixtures;

struct Servers {
    llm: MockServer,
    embeddings: MockServer,
    elastic: MockServer,
}

impl Servers {
    fn start() -> Self {
        Self {
            llm: MockServer::start(),
            embeddings: MockServer::start(),
            elastic: MockServer::start(),
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        config.backend.url = self.elastic.base_url();
        config.backend.api_key = Some("es-key".to_string());
        config.embedding.base_url = self.embeddings.base_url();
        config.embedding.api_key = Some("sk-embed".to_string());
        config.embedding.dims = 3;
        config.location.base_url = self.llm.base_url();
        config.location.api_key = Some("sk-llm".to_string());
        config
    }
}

#[test]
fn located_query_flows_through_every_provider() {
    let servers = Servers::start();

    let llm = servers.llm.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("authorization", "Bearer sk-llm");
        then.status(200).json_body(fixtures::chat_completion_body(&json!({
            "reasoning": "Mission is a San Francisco neighborhood.",
            "city": "San Francisco",
            "state": "CA",
            "neighborhood": "Mission",
            "zip_code": "unknown",
            "has_location": true,
            "cleaned_query": "loft with exposed brick",
            "confidence": 0.88
        })));
    });
    let embeddings = servers.embeddings.mock(|when, then| {
        when.method(POST)
            .path("/embeddings")
            .header("authorization", "Bearer sk-embed");
        then.status(200)
            .json_body(fixtures::embeddings_body(&[vec![0.1, 0.2, 0.3]]));
    });
    let elastic = servers.elastic.mock(|when, then| {
        when.method(POST)
            .path("/properties/_search")
            .header("authorization", "ApiKey es-key");
        then.status(200).json_body(fixtures::sample_search_response());
    });

    let ctx = AppContext::from_config(servers.config(), true).unwrap();
    let result = ctx
        .engine(true)
        .search_query("loft with exposed brick in the Mission, San Francisco", Some(5))
        .unwrap();

    llm.assert();
    embeddings.assert();
    elastic.assert();

    assert_eq!(result.fusion.effective_query, "loft with exposed brick");
    assert_eq!(result.fusion.location_filters.len(), 3);
    assert_eq!(result.total, 42);
    assert_eq!(result.results[0].id, "prop-1");
}

#[test]
fn llm_outage_does_not_block_search() {
    let servers = Servers::start();

    servers.llm.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(503).body("upstream overloaded");
    });
    servers.embeddings.mock(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(200)
            .json_body(fixtures::embeddings_body(&[vec![0.0, 1.0, 0.0]]));
    });
    let elastic = servers.elastic.mock(|when, then| {
        when.method(POST).path("/properties/_search");
        then.status(200).json_body(fixtures::sample_search_response());
    });

    let ctx = AppContext::from_config(servers.config(), false).unwrap();
    let result = ctx
        .engine(true)
        .search_query("townhouse in Denver", None)
        .unwrap();

    elastic.assert();
    assert_eq!(result.fusion.effective_query, "townhouse in Denver");
    assert!(result.fusion.location_filters.is_empty());
}

#[test]
fn embedding_outage_fails_the_search() {
    let servers = Servers::start();

    servers.embeddings.mock(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(500)
            .json_body(json!({ "error": { "message": "internal error" } }));
    });

    let ctx = AppContext::from_config(servers.config(), false).unwrap();
    let err = ctx.engine(false).search_query("ranch house", None).unwrap_err();

    // No backend mock is registered: reaching it would surface as a Backend error.
    assert!(matches!(err, HsError::EmbeddingProvider(_)));
    assert!(err.to_string().contains("internal error"));
}

#[test]
fn config_file_drives_the_pipeline() {
    let servers = Servers::start();
    servers.embeddings.mock(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(200)
            .json_body(fixtures::embeddings_body(&[vec![1.0, 0.0]]));
    });
    let elastic = servers.elastic.mock(|when, then| {
        when.method(POST).path("/homes/_search");
        then.status(200).json_body(json!({ "hits": { "total": 0, "hits": [] } }));
    });

    let workspace = fixtures::TempWorkspace::new();
    let path = workspace.write(
        "homeseek.toml",
        &format!(
            r#"
[backend]
url = "{elastic}"
index = "homes"

[embedding]
base_url = "{embeddings}"
api_key = "sk-file"
dims = 2

[location]
enabled = false

[search]
default_size = 3
rank_constant = 20
"#,
            elastic = servers.elastic.base_url(),
            embeddings = servers.embeddings.base_url(),
        ),
    );

    let config = Config::load_with_env(Some(path.as_path()), workspace.root(), |_| None).unwrap();
    let ctx = AppContext::from_config(config, false).unwrap();
    let engine = ctx.engine(true);
    let params = engine.params_for("cabin", None).unwrap();
    assert_eq!(params.size(), 3);
    assert_eq!(params.rank_constant(), 20);

    let result = engine.search(&params).unwrap();
    elastic.assert();
    assert!(result.is_empty());
    assert_eq!(result.total, 0);
}
