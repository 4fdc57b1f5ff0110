use super::{SearchResult, UrlSelector};
use crate::error::{DocsError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

static URL_IN_REPLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>`()\[\]]+"#).expect("valid regex"));

/// Google Gemini `generateContent` client used to choose documentation URLs
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

impl GeminiClient {
    /// Creates a client for `endpoint` (the API base including its version segment)
    pub fn new(client: Client, endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Instruction sent to the model for one library
pub fn selection_prompt(library: &str, results: &[SearchResult]) -> Result<String> {
    let listing = serde_json::to_string(results)?;
    Ok(format!(
        "Here are web search results for the library \"{}\": {}. \
         Pick the single most official and stable documentation URL among them. \
         Reply with the URL only, and always reply with a URL.",
        library, listing
    ))
}

/// First http(s) URL in a model reply, with trailing punctuation removed
pub fn extract_url(reply: &str) -> Option<String> {
    let candidate = URL_IN_REPLY
        .find(reply)?
        .as_str()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '*'));
    Url::parse(candidate).ok().map(|url| url.to_string())
}

#[async_trait]
impl UrlSelector for GeminiClient {
    async fn select_url(&self, library: &str, results: &[SearchResult]) -> Result<Option<String>> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: selection_prompt(library, results)?,
                }],
            }],
        };

        debug!("Gemini {} selecting documentation URL for {}", self.model, library);
        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DocsError::Gemini {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateContentResponse = match serde_json::from_str(&body) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Unreadable Gemini reply for {}: {}", library, e);
                return Ok(None);
            }
        };
        Ok(reply.first_text().and_then(extract_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    fn results() -> Vec<SearchResult> {
        vec![
            SearchResult {
                position: 1,
                title: "Welcome to Flask".into(),
                link: Some("https://flask.palletsprojects.com/".into()),
            },
            SearchResult {
                position: 2,
                title: "Flask Intro".into(),
                link: Some("https://python-adv-web-apps.readthedocs.io/en/latest/flask.html".into()),
            },
        ]
    }

    #[test]
    fn test_extract_url_variants() {
        assert_eq!(
            extract_url("https://flask.palletsprojects.com/\n").as_deref(),
            Some("https://flask.palletsprojects.com/")
        );
        assert_eq!(
            extract_url("The best one is `https://docs.python.org/3/`.").as_deref(),
            Some("https://docs.python.org/3/")
        );
        assert_eq!(
            extract_url("[docs](https://react.dev/reference)").as_deref(),
            Some("https://react.dev/reference")
        );
        assert_eq!(extract_url("I could not find one."), None);
    }

    #[test]
    fn test_prompt_lists_results() {
        let prompt = selection_prompt("flask", &results()).unwrap();
        assert!(prompt.contains("\"flask\""));
        assert!(prompt.contains("https://flask.palletsprojects.com/"));
        assert!(prompt.contains("\"position\":2"));
    }

    #[tokio::test]
    async fn test_select_url_reads_first_candidate() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "g-key".into()))
            .match_body(Matcher::Regex("palletsprojects".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"https://flask.palletsprojects.com/\n"}]},"finishReason":"STOP"}]}"#,
            )
            .create_async()
            .await;

        let client = GeminiClient::new(
            Client::new(),
            &format!("{}/v1beta/", server.url()),
            "gemini-test",
            "g-key",
        );
        let url = client.select_url("flask", &results()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(url.as_deref(), Some("https://flask.palletsprojects.com/"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_none() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[],"promptFeedback":{"blockReason":"OTHER"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(Client::new(), &format!("{}/v1beta", server.url()), "gemini-test", "k");
        assert_eq!(client.select_url("flask", &results()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid."}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(Client::new(), &format!("{}/v1beta", server.url()), "gemini-test", "bad");
        match client.select_url("flask", &results()).await {
            Err(DocsError::Gemini { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("API key not valid"));
            }
            other => panic!("expected Gemini error, got {:?}", other),
        }
    }
}
