use axum::http::StatusCode;
use std::io;
use thiserror::Error;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, DocsError>;

/// Errors that can occur while extracting dependencies or resolving documentation
#[derive(Debug, Error)]
pub enum DocsError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP transport errors (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Upload request carried no `files[]` part
    #[error("No file part")]
    NoFilePart,

    /// Malformed upload body
    #[error("Invalid upload: {0}")]
    Upload(String),

    /// Requested library name was blank
    #[error("Library name is empty")]
    EmptyLibraryName,

    /// Search API answered with a non-success status
    #[error("SERPAPI error: HTTP {status}")]
    Search {
        /// Upstream status code
        status: u16,
        /// Upstream response body
        body: String,
    },

    /// Search returned no organic results
    #[error("No search results found for {0}")]
    NotFound(String),

    /// Generative-AI API answered with a non-success status
    #[error("Gemini API error: HTTP {status}: {body}")]
    Gemini {
        /// Upstream status code
        status: u16,
        /// Upstream response body
        body: String,
    },

    /// Neither the AI reply nor the search results yielded a URL
    #[error("No valid documentation URL found for {0}")]
    NoValidUrl(String),

    /// Documentation page fetch answered with a non-success status
    #[error("Failed to fetch documentation from {url}: HTTP {status}")]
    Fetch {
        /// Page URL
        url: String,
        /// Upstream status code
        status: u16,
    },

    /// Documentation page had no readable text
    #[error("No readable text found at {0}")]
    EmptyDocument(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic processing errors
    #[error("Processing error: {0}")]
    Processing(String),
}

impl DocsError {
    /// HTTP status this error maps to when surfaced directly to a caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFilePart | Self::Upload(_) | Self::Json(_) | Self::EmptyLibraryName => {
                StatusCode::BAD_REQUEST
            }
            Self::Search { .. } | Self::Gemini { .. } | Self::Fetch { .. } | Self::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::NotFound(_) | Self::NoValidUrl(_) | Self::EmptyDocument(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error was caused by the caller's input rather than by us or an upstream
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}
