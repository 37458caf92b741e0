use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HsError, Result};

/// Project-level config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "homeseek.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Load config from defaults, files and the process environment.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        Self::load_with_env(explicit_path, project_root, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(explicit_path: Option<&Path>, project_root: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env("HOMESEEK_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?
                .ok_or_else(|| HsError::ConfigNotFound(path.clone()))?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&project_root.join(PROJECT_CONFIG_FILE))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(&env)?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("homeseek/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| HsError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| HsError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.backend {
            self.backend.merge(patch);
        }
        if let Some(patch) = patch.embedding {
            self.embedding.merge(patch);
        }
        if let Some(patch) = patch.location {
            self.location.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
    }

    fn apply_env_overrides<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env("HOMESEEK_BACKEND_URL") {
            self.backend.url = value;
        }
        if let Some(value) = env("HOMESEEK_BACKEND_INDEX") {
            self.backend.index = value;
        }
        if let Some(value) = env("HOMESEEK_BACKEND_API_KEY") {
            self.backend.api_key = non_blank(value);
        }
        if let Some(value) = env_parse::<u64, _>(env, "HOMESEEK_BACKEND_TIMEOUT_SECS")? {
            self.backend.timeout_secs = value;
        }

        if let Some(value) = env("HOMESEEK_EMBEDDING_PROVIDER") {
            self.embedding.provider = value;
        }
        if let Some(value) = env("HOMESEEK_EMBEDDING_BASE_URL") {
            self.embedding.base_url = value;
        }
        if let Some(value) = env("HOMESEEK_EMBEDDING_MODEL") {
            self.embedding.model = value;
        }
        if let Some(value) = env_parse::<usize, _>(env, "HOMESEEK_EMBEDDING_DIMS")? {
            self.embedding.dims = value;
        }
        if let Some(value) = env("HOMESEEK_EMBEDDING_API_KEY") {
            self.embedding.api_key = non_blank(value);
        }

        if let Some(value) = env_bool(env, "HOMESEEK_LOCATION_ENABLED") {
            self.location.enabled = value;
        }
        if let Some(value) = env("HOMESEEK_LOCATION_BASE_URL") {
            self.location.base_url = value;
        }
        if let Some(value) = env("HOMESEEK_LOCATION_MODEL") {
            self.location.model = value;
        }
        if let Some(value) = env("HOMESEEK_LOCATION_API_KEY") {
            self.location.api_key = non_blank(value);
        }

        if let Some(value) = env_parse::<usize, _>(env, "HOMESEEK_SEARCH_SIZE")? {
            self.search.default_size = value;
        }
        if let Some(value) = env_parse::<u32, _>(env, "HOMESEEK_SEARCH_RANK_CONSTANT")? {
            self.search.rank_constant = value;
        }
        if let Some(value) = env_parse::<usize, _>(env, "HOMESEEK_SEARCH_RANK_WINDOW_SIZE")? {
            self.search.rank_window_size = value;
        }
        if let Some(value) = env_parse::<f32, _>(env, "HOMESEEK_SEARCH_TEXT_BOOST")? {
            self.search.text_boost = value;
        }
        if let Some(value) = env_parse::<f32, _>(env, "HOMESEEK_SEARCH_VECTOR_BOOST")? {
            self.search.vector_boost = value;
        }

        Ok(())
    }

    /// Reject values no search could run with.
    pub fn validate(&self) -> Result<()> {
        if self.backend.index.trim().is_empty() {
            return Err(HsError::Config("backend.index must not be empty".to_string()));
        }
        if self.embedding.dims == 0 {
            return Err(HsError::Config(
                "embedding.dims must be greater than 0".to_string(),
            ));
        }
        match self.embedding.provider.trim().to_lowercase().as_str() {
            "api" | "hash" => {}
            other => {
                return Err(HsError::Config(format!(
                    "unknown embedding provider: {other}"
                )));
            }
        }
        if self.search.default_size == 0 {
            return Err(HsError::Config(
                "search.default_size must be greater than 0".to_string(),
            ));
        }
        if self.search.rank_constant == 0 {
            return Err(HsError::Config(
                "search.rank_constant must be greater than 0".to_string(),
            ));
        }
        if self.search.rank_window_size == 0 {
            return Err(HsError::Config(
                "search.rank_window_size must be greater than 0".to_string(),
            ));
        }
        if self.search.knn_upper_bound == 0 {
            return Err(HsError::Config(
                "search.knn_upper_bound must be greater than 0".to_string(),
            ));
        }
        if self.search.lexical_fields.is_empty() {
            return Err(HsError::Config(
                "search.lexical_fields must list at least one field".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub index: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "properties".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    fn merge(&mut self, patch: BackendPatch) {
        if let Some(value) = patch.url {
            self.url = value;
        }
        if let Some(value) = patch.index {
            self.index = value;
        }
        if let Some(value) = patch.api_key {
            self.api_key = non_blank(value);
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `api` (OpenAI-compatible HTTP) or `hash` (offline, deterministic)
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub dims: usize,
    /// May be unset until a session is opened.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "api".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-large".to_string(),
            dims: 1024,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    fn merge(&mut self, patch: EmbeddingPatch) {
        if let Some(value) = patch.provider {
            self.provider = value;
        }
        if let Some(value) = patch.base_url {
            self.base_url = value;
        }
        if let Some(value) = patch.model {
            self.model = value;
        }
        if let Some(value) = patch.dims {
            self.dims = value;
        }
        if let Some(value) = patch.api_key {
            self.api_key = non_blank(value);
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: f32,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 20,
            temperature: 0.0,
        }
    }
}

impl LocationConfig {
    fn merge(&mut self, patch: LocationPatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.base_url {
            self.base_url = value;
        }
        if let Some(value) = patch.model {
            self.model = value;
        }
        if let Some(value) = patch.api_key {
            self.api_key = non_blank(value);
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.temperature {
            self.temperature = value;
        }
    }
}

/// Index attributes the location predicates match against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFieldMap {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub zip_code: String,
}

impl Default for LocationFieldMap {
    fn default() -> Self {
        Self {
            city: "address.city".to_string(),
            state: "address.state".to_string(),
            neighborhood: "neighborhood.name".to_string(),
            zip_code: "address.zip_code".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub default_size: usize,
    #[serde(default)]
    pub rank_constant: u32,
    #[serde(default)]
    pub rank_window_size: usize,
    #[serde(default)]
    pub text_boost: f32,
    #[serde(default)]
    pub vector_boost: f32,
    /// Cap applied to both kNN `k` and `num_candidates`.
    #[serde(default)]
    pub knn_upper_bound: usize,
    #[serde(default)]
    pub embedding_field: String,
    #[serde(default)]
    pub fuzziness: String,
    /// Lexical fields in `field^boost` form.
    #[serde(default)]
    pub lexical_fields: Vec<String>,
    #[serde(default)]
    pub source_fields: Vec<String>,
    #[serde(default)]
    pub location_fields: LocationFieldMap,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_size: 10,
            rank_constant: 60,
            rank_window_size: 100,
            text_boost: 1.0,
            vector_boost: 1.0,
            knn_upper_bound: 100,
            embedding_field: "embedding".to_string(),
            fuzziness: "AUTO".to_string(),
            lexical_fields: [
                "description^2",
                "features^1.5",
                "amenities^1.5",
                "address.street^1",
                "neighborhood.name^1",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            source_fields: [
                "title",
                "description",
                "price",
                "bedrooms",
                "bathrooms",
                "square_footage",
                "property_type",
                "address",
                "neighborhood",
                "features",
                "amenities",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            location_fields: LocationFieldMap::default(),
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.default_size {
            self.default_size = value;
        }
        if let Some(value) = patch.rank_constant {
            self.rank_constant = value;
        }
        if let Some(value) = patch.rank_window_size {
            self.rank_window_size = value;
        }
        if let Some(value) = patch.text_boost {
            self.text_boost = value;
        }
        if let Some(value) = patch.vector_boost {
            self.vector_boost = value;
        }
        if let Some(value) = patch.knn_upper_bound {
            self.knn_upper_bound = value;
        }
        if let Some(value) = patch.embedding_field {
            self.embedding_field = value;
        }
        if let Some(value) = patch.fuzziness {
            self.fuzziness = value;
        }
        if let Some(value) = patch.lexical_fields {
            self.lexical_fields = value;
        }
        if let Some(value) = patch.source_fields {
            self.source_fields = value;
        }
        if let Some(patch) = patch.location_fields {
            if let Some(value) = patch.city {
                self.location_fields.city = value;
            }
            if let Some(value) = patch.state {
                self.location_fields.state = value;
            }
            if let Some(value) = patch.neighborhood {
                self.location_fields.neighborhood = value;
            }
            if let Some(value) = patch.zip_code {
                self.location_fields.zip_code = value;
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub backend: Option<BackendPatch>,
    pub embedding: Option<EmbeddingPatch>,
    pub location: Option<LocationPatch>,
    pub search: Option<SearchPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BackendPatch {
    pub url: Option<String>,
    pub index: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EmbeddingPatch {
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub dims: Option<usize>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LocationPatch {
    pub enabled: Option<bool>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub default_size: Option<usize>,
    pub rank_constant: Option<u32>,
    pub rank_window_size: Option<usize>,
    pub text_boost: Option<f32>,
    pub vector_boost: Option<f32>,
    pub knn_upper_bound: Option<usize>,
    pub embedding_field: Option<String>,
    pub fuzziness: Option<String>,
    pub lexical_fields: Option<Vec<String>>,
    pub source_fields: Option<Vec<String>>,
    pub location_fields: Option<LocationFieldsPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LocationFieldsPatch {
    pub city: Option<String>,
    pub state: Option<String>,
    pub neighborhood: Option<String>,
    pub zip_code: Option<String>,
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn env_bool<F>(env: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    env(key).map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_parse<T, F>(env: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| HsError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}
