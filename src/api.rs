use crate::config::{ApiKeys, Config};
use crate::error::Result;
use crate::resolver::{build_http_client, DocumentationResolver, ResolutionOutcome};
use crate::upload::{UploadHandler, UploadedFile};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Response of the upload endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Deduplicated library names, in no particular order
    pub libraries: Vec<String>,
}

/// Request payload of the documentation endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchDocsRequest {
    /// Libraries to resolve
    #[serde(default)]
    pub libraries: Vec<String>,
    /// SerpAPI key; falls back to the configured key when blank
    #[serde(default)]
    pub serpapi_key: Option<String>,
    /// Gemini key; falls back to the configured key when blank
    #[serde(default)]
    pub gemini_key: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current status
    pub status: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
    /// Service uptime in seconds
    pub uptime: u64,
}

/// Entry points shared by the HTTP server and the command-line tool
pub struct DocsService {
    config: Arc<Config>,
    uploads: UploadHandler,
    client: Client,
    start_time: DateTime<Utc>,
}

impl DocsService {
    /// Creates the service, building the shared HTTP client from `config`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = build_http_client(&config.resolver)?;
        Ok(Self {
            uploads: UploadHandler::new(config.extraction.clone()),
            config: Arc::new(config),
            client,
            start_time: Utc::now(),
        })
    }

    /// Configuration the service was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extracts library names from an uploaded batch
    pub fn upload(&self, files: &[UploadedFile]) -> Result<UploadResponse> {
        let libraries = self.uploads.handle(files)?;
        info!("Extracted {} libraries from {} file(s)", libraries.len(), files.len());
        Ok(UploadResponse {
            libraries: libraries.into_iter().collect(),
        })
    }

    /// Resolves documentation for every requested library
    pub async fn fetch_docs(&self, request: FetchDocsRequest) -> ResolutionOutcome {
        let keys = ApiKeys::new(request.serpapi_key.as_deref(), request.gemini_key.as_deref())
            .or(&self.config.api_keys);
        let resolver = Arc::new(DocumentationResolver::from_config(
            self.client.clone(),
            &self.config.resolver,
            &keys,
        ));

        info!("Fetching documentation for {} libraries", request.libraries.len());
        resolver.resolve_all(&request.libraries).await
    }

    /// Service health information
    pub fn health(&self) -> HealthResponse {
        let now = Utc::now();
        HealthResponse {
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            status: "healthy".to_string(),
            timestamp: now,
            uptime: (now - self.start_time).num_seconds().max(0) as u64,
        }
    }
}
