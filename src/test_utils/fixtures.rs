use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::search::BackendResponse;

/// Isolated directory for config files and project roots.
pub struct TempWorkspace {
    pub temp_dir: TempDir,
}

impl TempWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        println!("[FIXTURE] Created temp directory: {:?}", temp_dir.path());
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` at `relative_path`, creating parent directories.
    pub fn write(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root().join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Elasticsearch `_search` body with two fused hits, 42 total.
pub fn sample_search_response() -> Value {
    json!({
        "took": 7,
        "timed_out": false,
        "hits": {
            "total": { "value": 42, "relation": "eq" },
            "max_score": 0.032_522_54,
            "hits": [
                {
                    "_index": "properties",
                    "_id": "prop-1",
                    "_score": 0.032_522_54,
                    "_source": {
                        "title": "Mission loft",
                        "price": 1_250_000,
                        "bedrooms": 2,
                        "address": { "city": "San Francisco", "state": "CA", "zip_code": "94110" }
                    }
                },
                {
                    "_index": "properties",
                    "_id": "prop-2",
                    "_score": 0.016_129_032,
                    "_source": {
                        "title": "Noe Valley cottage",
                        "price": 1_800_000,
                        "bedrooms": 3,
                        "address": { "city": "San Francisco", "state": "CA", "zip_code": "94114" }
                    }
                }
            ]
        }
    })
}

pub fn sample_backend_response() -> BackendResponse {
    BackendResponse::from_json(&sample_search_response()).expect("fixture parses")
}

/// OpenAI-style chat completion whose message content is `content` as JSON text.
pub fn chat_completion_body(content: &Value) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content.to_string() },
                "finish_reason": "stop"
            }
        ]
    })
}

/// OpenAI-style embeddings body, one entry per vector in input order.
pub fn embeddings_body(vectors: &[Vec<f32>]) -> Value {
    let data: Vec<Value> = vectors
        .iter()
        .enumerate()
        .map(|(index, embedding)| json!({ "object": "embedding", "index": index, "embedding": embedding }))
        .collect();
    json!({ "object": "list", "data": data })
}
