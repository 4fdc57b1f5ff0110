//! Documentation resolution: search, URL selection, fetch, flatten, chunk.

use crate::chunk::split_into_chunks;
use crate::config::{ApiKeys, ResolverConfig};
use crate::error::{DocsError, Result};
use crate::html::html_to_text;
use crate::parallel::ParallelProcessor;
use crate::providers::{GeminiClient, SearchProvider, SearchResult, SerpApiClient, UrlSelector};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-library outcome: ordered text chunks, or a single error message
pub type ResolutionOutcome = BTreeMap<String, Vec<String>>;

/// Builds the shared HTTP client with the configured timeout
pub fn build_http_client(settings: &ResolverConfig) -> Result<Client> {
    Ok(Client::builder().timeout(settings.request_timeout()).build()?)
}

/// Locates, fetches and chunks the official documentation of libraries
pub struct DocumentationResolver {
    client: Client,
    settings: ResolverConfig,
    search: Arc<dyn SearchProvider>,
    selector: Arc<dyn UrlSelector>,
}

impl DocumentationResolver {
    /// Creates a resolver over explicit search and selection backends
    pub fn new(
        client: Client,
        settings: ResolverConfig,
        search: Arc<dyn SearchProvider>,
        selector: Arc<dyn UrlSelector>,
    ) -> Self {
        Self {
            client,
            settings,
            search,
            selector,
        }
    }

    /// Creates a resolver backed by SerpAPI and Gemini with the given keys
    pub fn from_config(client: Client, settings: &ResolverConfig, keys: &ApiKeys) -> Self {
        let search = SerpApiClient::new(client.clone(), &settings.search_endpoint, keys.serpapi());
        let selector = GeminiClient::new(
            client.clone(),
            &settings.gemini_endpoint,
            &settings.gemini_model,
            keys.gemini(),
        );
        Self::new(client, settings.clone(), Arc::new(search), Arc::new(selector))
    }

    /// Resolves one library into documentation chunks
    ///
    /// Every step is terminal on failure: search, empty results, model
    /// failure, missing URL, fetch failure and empty page each end in an
    /// error for this library.
    pub async fn resolve(&self, library: &str) -> Result<Vec<String>> {
        let library = library.trim();
        if library.is_empty() {
            return Err(DocsError::EmptyLibraryName);
        }

        let query = format!("{} official documentation", library);
        let results = self.search.search(&query).await?;
        if results.is_empty() {
            return Err(DocsError::NotFound(library.to_string()));
        }

        let top: Vec<SearchResult> = results
            .into_iter()
            .take(self.settings.max_search_results.max(1))
            .collect();

        let url = match self.selector.select_url(library, &top).await? {
            Some(url) => url,
            None => {
                debug!("No URL in model reply for {}, using top search result", library);
                top.first()
                    .and_then(|result| result.link.clone())
                    .ok_or_else(|| DocsError::NoValidUrl(library.to_string()))?
            }
        };

        let html = self.fetch_page(&url).await?;
        let text = html_to_text(&html);
        let chunks = split_into_chunks(&text, self.settings.max_words);
        if chunks.is_empty() {
            return Err(DocsError::EmptyDocument(url));
        }

        info!("Resolved {} from {} into {} chunk(s)", library, url, chunks.len());
        Ok(chunks)
    }

    /// Resolves one library, rendering any failure as a one-element message list
    pub async fn resolve_outcome(&self, library: &str) -> Vec<String> {
        match self.resolve(library).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!("Documentation lookup failed for {}: {}", library, e);
                vec![e.to_string()]
            }
        }
    }

    /// Resolves every library with bounded concurrency
    ///
    /// Entries are keyed by the names exactly as submitted; surrounding
    /// whitespace is only dropped for the search query. Duplicate names are
    /// resolved once. A failure, or a panic, while resolving one name only
    /// affects that name's entry.
    pub async fn resolve_all(self: &Arc<Self>, libraries: &[String]) -> ResolutionOutcome {
        let names: Vec<String> = libraries
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let tasks: Vec<_> = names
            .iter()
            .map(|name| {
                let resolver = Arc::clone(self);
                let name = name.clone();
                async move { Ok::<_, DocsError>(resolver.resolve_outcome(&name).await) }
            })
            .collect();

        let processor = ParallelProcessor::new(self.settings.max_concurrent);
        let results = processor.process(tasks).await;

        names
            .into_iter()
            .zip(results)
            .map(|(name, result)| {
                let outcome = result.unwrap_or_else(|e| vec![format!("Error processing {}: {}", name, e)]);
                (name, outcome)
            })
            .collect()
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("Fetching documentation page {}", url);
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.settings.user_agent.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Search stub: `broken*` fails, `ghost*` has no hits, anything else points at `page`
    struct StubSearch {
        page: String,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
            if query.starts_with("broken") {
                return Err(DocsError::Search { status: 500, body: "upstream down".into() });
            }
            if query.starts_with("ghost") {
                return Ok(Vec::new());
            }
            Ok((1..=5)
                .map(|position| SearchResult {
                    position,
                    title: format!("Result {}", position),
                    link: Some(format!("{}/{}", self.page, position)),
                })
                .collect())
        }
    }

    /// Selector stub returning a fixed answer and recording what it was offered
    struct StubSelector {
        answer: Option<String>,
        fail: bool,
        offered: Mutex<Vec<usize>>,
    }

    impl StubSelector {
        fn answering(answer: Option<String>) -> Self {
            Self { answer, fail: false, offered: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { answer: None, fail: true, offered: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl UrlSelector for StubSelector {
        async fn select_url(&self, _library: &str, results: &[SearchResult]) -> Result<Option<String>> {
            self.offered.lock().unwrap().push(results.len());
            if self.fail {
                return Err(DocsError::Gemini { status: 429, body: "quota exceeded".into() });
            }
            Ok(self.answer.clone())
        }
    }

    fn resolver(page: &str, selector: Arc<StubSelector>, max_words: usize) -> DocumentationResolver {
        let settings = ResolverConfig {
            max_words,
            ..ResolverConfig::default()
        };
        DocumentationResolver::new(
            Client::new(),
            settings,
            Arc::new(StubSearch { page: page.to_string() }),
            selector,
        )
    }

    #[tokio::test]
    async fn test_selected_url_is_fetched_and_chunked() {
        let mut server = Server::new_async().await;
        let page = server
            .mock("GET", "/docs/2")
            .match_header("user-agent", Matcher::Regex("Mozilla".into()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><h1>Guide</h1><p>one two three four five</p></body></html>")
            .create_async()
            .await;

        let base = format!("{}/docs", server.url());
        let selector = Arc::new(StubSelector::answering(Some(format!("{}/2", base))));
        let resolver = resolver(&base, Arc::clone(&selector), 4);

        let chunks = resolver.resolve("flask").await.unwrap();

        page.assert_async().await;
        assert_eq!(chunks, vec!["GUIDE one two three".to_string(), "four five".to_string()]);
        assert_eq!(*selector.offered.lock().unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_falls_back_to_first_result_without_model_url() {
        let mut server = Server::new_async().await;
        let page = server
            .mock("GET", "/docs/1")
            .with_status(200)
            .with_body("<p>fallback page</p>")
            .create_async()
            .await;

        let base = format!("{}/docs", server.url());
        let resolver = resolver(&base, Arc::new(StubSelector::answering(None)), 100);

        assert_eq!(resolver.resolve("flask").await.unwrap(), vec!["fallback page".to_string()]);
        page.assert_async().await;
    }

    #[tokio::test]
    async fn test_terminal_failures() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", "/docs/1")
            .with_status(404)
            .create_async()
            .await;
        let base = format!("{}/docs", server.url());

        let resolver_ok_model = resolver(&base, Arc::new(StubSelector::answering(None)), 100);
        assert!(matches!(
            resolver_ok_model.resolve("ghost-lib").await,
            Err(DocsError::NotFound(name)) if name == "ghost-lib"
        ));
        assert!(matches!(
            resolver_ok_model.resolve("broken-lib").await,
            Err(DocsError::Search { status: 500, .. })
        ));
        assert!(matches!(
            resolver_ok_model.resolve("flask").await,
            Err(DocsError::Fetch { status: 404, .. })
        ));

        let failing_model = resolver(&base, Arc::new(StubSelector::failing()), 100);
        match failing_model.resolve("flask").await {
            Err(e @ DocsError::Gemini { .. }) => assert!(e.to_string().contains("quota exceeded")),
            other => panic!("expected Gemini error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_page_is_an_error() {
        let mut server = Server::new_async().await;
        let _blank = server
            .mock("GET", "/docs/1")
            .with_status(200)
            .with_body("<html><body>   </body></html>")
            .create_async()
            .await;

        let base = format!("{}/docs", server.url());
        let resolver = resolver(&base, Arc::new(StubSelector::answering(None)), 100);
        assert!(matches!(resolver.resolve("flask").await, Err(DocsError::EmptyDocument(_))));
    }

    #[tokio::test]
    async fn test_resolve_all_isolates_failures() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/docs/1")
            .with_status(200)
            .with_body("<p>requests docs</p>")
            .expect_at_least(1)
            .create_async()
            .await;

        let base = format!("{}/docs", server.url());
        let resolver = Arc::new(resolver(&base, Arc::new(StubSelector::answering(None)), 100));

        let libraries = vec![
            "requests".to_string(),
            "broken-lib".to_string(),
            "numpy".to_string(),
            "requests".to_string(),
        ];
        let outcome = resolver.resolve_all(&libraries).await;

        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome["requests"], vec!["requests docs".to_string()]);
        assert_eq!(outcome["numpy"], vec!["requests docs".to_string()]);
        assert_eq!(outcome["broken-lib"].len(), 1);
        assert!(outcome["broken-lib"][0].contains("SERPAPI error"));
    }

    #[tokio::test]
    async fn test_resolve_all_keys_by_submitted_name() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/docs/1")
            .with_status(200)
            .with_body("<p>flask docs</p>")
            .expect_at_least(1)
            .create_async()
            .await;

        let base = format!("{}/docs", server.url());
        let resolver = Arc::new(resolver(&base, Arc::new(StubSelector::answering(None)), 100));

        let libraries = vec![" flask".to_string(), "".to_string(), "   ".to_string()];
        let outcome = resolver.resolve_all(&libraries).await;

        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome[" flask"], vec!["flask docs".to_string()]);
        assert!(!outcome.contains_key("flask"));
        assert_eq!(outcome[""], vec!["Library name is empty".to_string()]);
        assert_eq!(outcome["   "], vec!["Library name is empty".to_string()]);
    }
}
