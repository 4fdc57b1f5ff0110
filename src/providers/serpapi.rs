use super::{SearchProvider, SearchResult};
use crate::error::{DocsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// SerpAPI Google search client
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<SearchResult>,
}

impl SerpApiClient {
    /// Creates a client for `endpoint` (normally `https://serpapi.com/search`)
    pub fn new(client: Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        debug!("SerpAPI search: {}", query);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("engine", "google"), ("q", query), ("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocsError::Search {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SearchResponse = response.json().await?;
        Ok(payload.organic_results)
    }
}
