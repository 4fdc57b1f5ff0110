#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! ## Usage
//! ```rust,ignore
//! use depdocs::{Config, DocsService, FetchDocsRequest, UploadedFile};
//!
//! async fn example() -> depdocs::Result<()> {
//!     let service = DocsService::new(Config::load(None)?)?;
//!
//!     let upload = service.upload(&[UploadedFile::new("app.py", "import flask\n")])?;
//!     let docs = service
//!         .fetch_docs(FetchDocsRequest {
//!             libraries: upload.libraries,
//!             ..Default::default()
//!         })
//!         .await;
//!     for (library, chunks) in docs {
//!         println!("{}: {} chunk(s)", library, chunks.len());
//!     }
//!     Ok(())
//! }
//! ```

/// Request/response types and the service facade
pub mod api;
/// Word-bounded text chunking
pub mod chunk;
/// Configuration module for the application
pub mod config;
/// Error handling types and utilities
pub mod error;
/// Dependency extraction from source files and manifests
pub mod extract;
/// HTML flattening
pub mod html;
/// Logging configuration and utilities
pub mod logging;
/// JSON and plain-text rendering of resolved documentation
pub mod output;
/// Bounded-concurrency task execution
pub mod parallel;
/// Search and URL-selection backends (SerpAPI, Gemini)
pub mod providers;
/// Documentation resolution pipeline
pub mod resolver;
/// HTTP routes
pub mod server;
/// Upload batch handling
pub mod upload;

// Re-export common types
pub use api::{DocsService, FetchDocsRequest, HealthResponse, UploadResponse};
pub use config::Config;
pub use error::{DocsError, Result};
pub use output::OutputFormat;
pub use resolver::{DocumentationResolver, ResolutionOutcome};
pub use upload::{UploadHandler, UploadedFile};
