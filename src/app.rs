//! Process-wide context: configuration plus the provider handles, built once.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cli::Cli;
use crate::config::Config;
use crate::embeddings::{EmbeddingProvider, QueryEmbeddingService, build_provider};
use crate::error::Result;
use crate::location::{ChatCompletionModel, LocationUnderstandingModule};
use crate::search::{ElasticsearchBackend, HybridSearchEngine, SearchBackend};

/// The offline hash provider has no credential of its own.
const OFFLINE_CREDENTIAL: &str = "offline";

pub struct AppContext {
    pub config: Config,
    pub robot_mode: bool,
    pub location: Option<LocationUnderstandingModule>,
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub backend: Arc<dyn SearchBackend>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("robot_mode", &self.robot_mode)
            .field("location", &self.location)
            .field("embedding_provider", &self.embedding_provider.name())
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &cwd)?;
        Self::from_config(config, cli.robot)
    }

    /// Build every provider handle from `config`.
    ///
    /// A location model that cannot be built (usually a missing API key)
    /// disables extraction rather than failing startup.
    pub fn from_config(config: Config, robot_mode: bool) -> Result<Self> {
        let location = if config.location.enabled {
            match ChatCompletionModel::from_config(&config.location) {
                Ok(model) => Some(LocationUnderstandingModule::new(Arc::new(model))),
                Err(err) => {
                    warn!(error = %err, "location extraction disabled");
                    None
                }
            }
        } else {
            debug!("location extraction disabled by config");
            None
        };

        let embedding_provider = build_provider(&config.embedding)?;
        let backend: Arc<dyn SearchBackend> =
            Arc::new(ElasticsearchBackend::from_config(&config.backend)?);

        Ok(Self {
            config,
            robot_mode,
            location,
            embedding_provider,
            backend,
        })
    }

    /// Credential handed to embedding sessions.
    pub fn embedding_credential(&self) -> Option<String> {
        self.config.embedding.api_key.clone().or_else(|| {
            self.config
                .embedding
                .provider
                .trim()
                .eq_ignore_ascii_case("hash")
                .then(|| OFFLINE_CREDENTIAL.to_string())
        })
    }

    /// Uninitialized embedding service; callers bracket it with
    /// `initialize`/`close` or use [`QueryEmbeddingService::scoped`].
    pub fn embedding_service(&self) -> QueryEmbeddingService {
        QueryEmbeddingService::new(
            Arc::clone(&self.embedding_provider),
            self.embedding_credential(),
        )
    }

    /// Search engine wired with this context's providers.
    pub fn engine(&self, with_location: bool) -> HybridSearchEngine {
        let engine = HybridSearchEngine::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.embedding_provider),
            self.embedding_credential(),
            self.config.search.clone(),
        );
        match (&self.location, with_location) {
            (Some(module), true) => engine.with_location_understanding(module.clone()),
            _ => engine,
        }
    }
}
