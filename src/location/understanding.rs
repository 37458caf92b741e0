//! Fail-open location extraction.

use std::sync::Arc;

use tracing::{debug, warn};

use super::intent::LocationIntent;
use super::model::LanguageModel;

/// Turns query text into a [`LocationIntent`] using an injected model.
///
/// `extract` has no error path: any provider failure yields
/// [`LocationIntent::none`], so a broken extractor never blocks a search.
#[derive(Clone)]
pub struct LocationUnderstandingModule {
    model: Arc<dyn LanguageModel>,
}

impl std::fmt::Debug for LocationUnderstandingModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationUnderstandingModule")
            .field("model", &self.model.name())
            .finish()
    }
}

impl LocationUnderstandingModule {
    /// The model handle is created once by the application and shared.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Extract location intent from `query`.
    pub fn extract(&self, query: &str) -> LocationIntent {
        if query.trim().is_empty() {
            return LocationIntent::none(query);
        }

        match self.model.extract_location(query) {
            Ok(raw) => {
                let intent = LocationIntent::from_raw(query, raw);
                debug!(
                    model = self.model.name(),
                    has_location = intent.has_location(),
                    city = intent.city().unwrap_or("-"),
                    state = intent.state().unwrap_or("-"),
                    neighborhood = intent.neighborhood().unwrap_or("-"),
                    zip_code = intent.zip_code().unwrap_or("-"),
                    confidence = intent.confidence(),
                    "location extracted"
                );
                intent
            }
            Err(err) => {
                warn!(
                    model = self.model.name(),
                    error = %err,
                    "location extraction failed; searching without location"
                );
                LocationIntent::none(query)
            }
        }
    }
}
