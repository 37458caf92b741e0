//! Deterministic stand-ins for the three external providers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use crate::embeddings::{EmbeddingProvider, EmbeddingSession, HashEmbedder};
use crate::error::{HsError, Result};
use crate::location::{LanguageModel, RawLocationFields};
use crate::search::{BackendResponse, RrfSearchRequest, SearchBackend};

/// Language model that answers from a fixed query → output table.
///
/// Unscripted queries get an empty response, i.e. no location.
#[derive(Debug, Default)]
pub struct ScriptedLanguageModel {
    responses: HashMap<String, Value>,
    calls: AtomicUsize,
}

impl ScriptedLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(mut self, query: &str, output: Value) -> Self {
        self.responses.insert(query.to_string(), output);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LanguageModel for ScriptedLanguageModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn extract_location(&self, query: &str) -> Result<RawLocationFields> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(query) {
            Some(output) => serde_json::from_value(output.clone())
                .map_err(|err| HsError::LocationExtraction(format!("scripted output: {err}"))),
            None => Ok(RawLocationFields::default()),
        }
    }
}

/// Language model whose every call fails.
#[derive(Debug)]
pub struct FailingLanguageModel {
    message: String,
    calls: AtomicUsize,
}

impl Default for FailingLanguageModel {
    fn default() -> Self {
        Self::new("language model unavailable")
    }
}

impl FailingLanguageModel {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LanguageModel for FailingLanguageModel {
    fn name(&self) -> &str {
        "failing"
    }

    fn extract_location(&self, _query: &str) -> Result<RawLocationFields> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(HsError::LocationExtraction(self.message.clone()))
    }
}

/// Backend that records every request and replays one canned response.
#[derive(Debug)]
pub struct RecordingBackend {
    response: BackendResponse,
    failure: Option<String>,
    requests: Mutex<Vec<RrfSearchRequest>>,
}

impl RecordingBackend {
    pub fn new(response: BackendResponse) -> Self {
        Self {
            response,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every search fails with a transport error carrying `message`.
    pub fn unreachable(message: &str) -> Self {
        Self {
            response: BackendResponse::default(),
            failure: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RrfSearchRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<RrfSearchRequest> {
        self.requests.lock().last().cloned()
    }
}

impl SearchBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn search(&self, request: &RrfSearchRequest) -> Result<BackendResponse> {
        self.requests.lock().push(request.clone());
        match &self.failure {
            Some(message) => Err(HsError::Io(std::io::Error::other(message.clone()))),
            None => Ok(self.response.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct SessionCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    texts: AtomicUsize,
}

/// Hash-backed embedding provider that counts session lifecycle events.
#[derive(Debug, Clone)]
pub struct CountingEmbeddingProvider {
    dims: usize,
    output_dims: usize,
    counters: Arc<SessionCounters>,
}

impl CountingEmbeddingProvider {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            output_dims: dims,
            counters: Arc::new(SessionCounters::default()),
        }
    }

    /// Produce vectors of a different length than `dims` advertises.
    #[must_use]
    pub fn with_output_dims(mut self, output_dims: usize) -> Self {
        self.output_dims = output_dims;
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    pub fn texts_embedded(&self) -> usize {
        self.counters.texts.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for CountingEmbeddingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn open_session(&self, _credential: &str) -> Result<Box<dyn EmbeddingSession>> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingSession {
            embedder: HashEmbedder::new(self.output_dims),
            counters: Arc::clone(&self.counters),
            closed: false,
        }))
    }
}

struct CountingSession {
    embedder: HashEmbedder,
    counters: Arc<SessionCounters>,
    closed: bool,
}

impl EmbeddingSession for CountingSession {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.counters.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|text| self.embedder.embed(text)).collect())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
