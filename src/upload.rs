use crate::config::ExtractionConfig;
use crate::error::{DocsError, Result};
use crate::extract;
use bytes::Bytes;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A file received in one upload request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the client
    pub name: String,
    /// Raw file content
    pub content: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file from a name and raw bytes
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Base name of the file with any client-side directories removed
    pub fn base_name(&self) -> &str {
        self.name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// Lower-case extension after the last dot, if any
    pub fn extension(&self) -> Option<String> {
        self.base_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}

/// Decodes UTF-8, dropping invalid byte sequences instead of replacing them
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Turns a batch of uploaded files into one deduplicated set of library names
#[derive(Debug, Clone)]
pub struct UploadHandler {
    settings: ExtractionConfig,
}

impl UploadHandler {
    /// Creates a handler that accepts the extensions in `settings`
    pub fn new(settings: ExtractionConfig) -> Self {
        Self { settings }
    }

    /// Extracts library names from every accepted file
    ///
    /// Files with disallowed extensions are skipped silently; files whose
    /// bytes hold no decodable text are logged and skipped. An empty batch is
    /// `DocsError::NoFilePart`.
    pub fn handle(&self, files: &[UploadedFile]) -> Result<HashSet<String>> {
        if files.is_empty() {
            return Err(DocsError::NoFilePart);
        }

        let mut libraries = HashSet::new();
        for file in files {
            let name = file.base_name();
            if !self.settings.is_allowed(name) {
                debug!("Skipping {}: extension not allowed", file.name);
                continue;
            }

            let content = decode_lossy(&file.content);
            if content.is_empty() && !file.content.is_empty() {
                warn!("Skipping {}: no valid UTF-8 text in {} bytes", name, file.content.len());
                continue;
            }

            let found = extract::extract_file(name, &content);
            debug!("{}: {} dependencies", name, found.len());
            libraries.extend(found);
        }
        Ok(libraries)
    }
}
