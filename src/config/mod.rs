//! Runtime settings.
//!
//! Every value has a default; any of them can be overridden with a
//! `CHATBOT_<SECTION>__<FIELD>` environment variable, e.g.
//! `CHATBOT_SERVER__PORT=8080` or `CHATBOT_INDEX__CACHE_PATH=.cache/langsmith.json`.
//! The OpenAI key is read from `OPENAI_API_KEY`. A `.env` file in the working
//! directory is loaded first.

mod error;
pub use error::*;

use std::path::PathBuf;

use config::{Config, Environment};
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    embedding::TEXT_EMBEDDING_ADA_002,
    llm::openai::GPT_3_5_TURBO_0125,
    prompt::{DEFAULT_HUB_API_URL, OPENAI_FUNCTIONS_AGENT_HANDLE},
    retrievers::{wikipedia_api_url, WebPageIndexConfig, DEFAULT_ARXIV_API_URL},
};

pub const ENV_PREFIX: &str = "CHATBOT";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub name: String,
    pub temperature: f32,
    pub embedding_model: String,
    /// Alternative OpenAI-compatible endpoint, e.g. a local proxy.
    pub api_base: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: GPT_3_5_TURBO_0125.to_string(),
            temperature: 0.0,
            embedding_model: TEXT_EMBEDDING_ADA_002.to_string(),
            api_base: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub top_k_results: usize,
    pub doc_content_chars_max: usize,
    pub wikipedia_api_url: String,
    pub arxiv_api_url: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            top_k_results: 1,
            doc_content_chars_max: 200,
            wikipedia_api_url: wikipedia_api_url("en"),
            arxiv_api_url: DEFAULT_ARXIV_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub source_url: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub k: usize,
    pub cache_path: Option<PathBuf>,
    /// Build the index in the background as soon as the server starts.
    pub warm_on_start: bool,
}

impl Default for IndexSettings {
    fn default() -> Self {
        let index = WebPageIndexConfig::default();
        Self {
            source_url: index.source_url,
            chunk_size: index.chunk_size,
            chunk_overlap: index.chunk_overlap,
            k: index.k,
            cache_path: index.cache_path,
            warm_on_start: true,
        }
    }
}

impl IndexSettings {
    pub fn to_index_config(&self) -> WebPageIndexConfig {
        WebPageIndexConfig {
            source_url: self.source_url.clone(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            k: self.k,
            cache_path: self.cache_path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub prompt_handle: String,
    pub hub_api_url: String,
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            prompt_handle: OPENAI_FUNCTIONS_AGENT_HANDLE.to_string(),
            hub_api_url: DEFAULT_HUB_API_URL.to_string(),
            max_iterations: crate::agent::DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub tools: ToolSettings,
    pub index: IndexSettings,
    pub agent: AgentSettings,
    #[serde(skip)]
    pub openai_api_key: Option<SecretString>,
}

impl Settings {
    /// Loads `.env`, then the environment.
    pub fn new() -> Result<Self, ConfigError> {
        match dotenv::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_env()
    }

    /// Reads settings from the process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = match config.try_deserialize() {
            Ok(settings) => settings,
            Err(config::ConfigError::Type {
                key: Some(key),
                expected,
                ..
            }) => {
                return Err(ConfigError::InvalidValue {
                    key: to_env_var(&key),
                    reason: format!("expected {}", expected),
                })
            }
            Err(e) => return Err(ConfigError::Other(e)),
        };

        settings.openai_api_key = std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(SecretString::from);

        settings.validate()?;
        Ok(settings)
    }

    pub fn has_openai_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: to_env_var("server.host"),
                reason: "must not be empty".to_string(),
            });
        }
        if self.index.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: to_env_var("index.chunk_size"),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.index.chunk_overlap > self.index.chunk_size {
            return Err(ConfigError::InvalidValue {
                key: to_env_var("index.chunk_overlap"),
                reason: format!(
                    "{} is larger than the chunk size {}",
                    self.index.chunk_overlap, self.index.chunk_size
                ),
            });
        }
        if self.index.k == 0 {
            return Err(ConfigError::InvalidValue {
                key: to_env_var("index.k"),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
