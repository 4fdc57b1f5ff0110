use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Module for the Google Gemini URL selector
pub mod gemini;
/// Module for the SerpAPI web search client
pub mod serpapi;

pub use gemini::GeminiClient;
pub use serpapi::SerpApiClient;

/// One organic (non-sponsored) web search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Rank on the results page, starting at 1
    #[serde(default)]
    pub position: u32,
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Page URL
    #[serde(default)]
    pub link: Option<String>,
}

/// Web search used to locate documentation candidates
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the organic results for `query`, best first
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Picks the most official documentation URL among search results
#[async_trait]
pub trait UrlSelector: Send + Sync {
    /// Returns the chosen URL, or `None` when the reply holds no usable URL
    ///
    /// An `Err` means the selection service itself failed.
    async fn select_url(&self, library: &str, results: &[SearchResult]) -> Result<Option<String>>;
}
