mod env_manager;

use crate::error::{DocsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub use env_manager::{get_env_value, ApiKeys, GEMINI_KEY_VAR, SERPAPI_KEY_VAR};

/// Environment variable overriding the server bind address
pub const BIND_ADDR_VAR: &str = "DEPDOCS_BIND";

/// Main configuration struct for the application
///
/// Built once at process start and shared read-only (behind an `Arc`) by
/// every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Upload filtering settings
    pub extraction: ExtractionConfig,
    /// Documentation resolution settings
    pub resolver: ResolverConfig,
    /// Fallback API keys used when a request does not carry its own
    pub api_keys: ApiKeys,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the server binds to
    pub bind_addr: String,
}

/// Upload filtering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lower-case file extensions accepted by the upload handler
    pub allowed_extensions: Vec<String>,
}

/// Documentation resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// SerpAPI search endpoint
    pub search_endpoint: String,
    /// Base URL of the Gemini REST API (up to and including the version segment)
    pub gemini_endpoint: String,
    /// Gemini model used to pick documentation URLs
    pub gemini_model: String,
    /// User-Agent sent when fetching documentation pages
    pub user_agent: String,
    /// Number of search results offered to the model
    pub max_search_results: usize,
    /// Maximum number of words per documentation chunk
    pub max_words: usize,
    /// Maximum number of libraries resolved at the same time
    pub max_concurrent: usize,
    /// Timeout applied to every outbound HTTP request, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["py", "js", "json", "txt", "java", "c", "cpp", "ts", "go", "rb"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl ExtractionConfig {
    /// Checks whether a file name carries an allowed extension
    pub fn is_allowed(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_endpoint: "https://serpapi.com/search".to_string(),
            gemini_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model: "gemini-2.0-flash-exp".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            max_search_results: 3,
            max_words: 30_000,
            max_concurrent: 4,
            request_timeout_secs: 30,
        }
    }
}

impl ResolverConfig {
    /// Outbound request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Loads configuration from `path`, the default config file location, or defaults
    ///
    /// Environment overrides are applied on top in every case.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match dirs::config_dir().map(|dir| dir.join("depdocs").join("config.toml")) {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env_overrides())
    }

    /// Parses a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DocsError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| DocsError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Applies `DEPDOCS_BIND`, `SERPAPI_KEY` and `GEMINI_KEY` from the environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(bind) = get_env_value(BIND_ADDR_VAR) {
            self.server.bind_addr = bind;
        }
        self.api_keys = ApiKeys::from_env().or(&self.api_keys);
        self
    }

    /// Rejects settings the resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.resolver.max_words == 0 {
            return Err(DocsError::Config("max_words must be greater than zero".into()));
        }
        if self.resolver.max_concurrent == 0 {
            return Err(DocsError::Config("max_concurrent must be greater than zero".into()));
        }
        url::Url::parse(&self.resolver.search_endpoint)?;
        url::Url::parse(&self.resolver.gemini_endpoint)?;
        Ok(())
    }
}
