//! Rendering resolved documentation as JSON or plain-text files.

use crate::error::Result;
use crate::resolver::ResolutionOutcome;
use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Line closing each library section of the consolidated text
pub const SECTION_SEPARATOR: &str = "-------------------------";

/// Shape of the documentation handed back to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON mapping each library to its chunks
    #[default]
    Json,
    /// One text document holding every library, separated by a rule
    Consolidated,
    /// One `<library>_documentation.txt` file per library
    Separate,
}

/// Text for a single library: a heading line, then every chunk followed by a blank line
pub fn render_library(library: &str, chunks: &[String]) -> String {
    let mut out = format!("Documentation for {}:\n\n", library);
    for chunk in chunks {
        out.push_str(chunk);
        out.push_str("\n\n");
    }
    out
}

/// All libraries in one document, each section closed by [`SECTION_SEPARATOR`]
pub fn render_consolidated(outcome: &ResolutionOutcome) -> String {
    let mut out = String::new();
    for (library, chunks) in outcome {
        out.push_str(&render_library(library, chunks));
        out.push_str(SECTION_SEPARATOR);
        out.push_str("\n\n");
    }
    out
}

/// `<library>_documentation.txt`, with path separators and other unsafe characters replaced
pub fn separate_file_name(library: &str) -> String {
    let safe: String = library
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_documentation.txt", safe)
}

/// Writes one text file per library into `dir`, creating it if needed
///
/// Returns the written paths in library order.
pub fn write_separate(outcome: &ResolutionOutcome, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(outcome.len());
    for (library, chunks) in outcome {
        let path = dir.join(separate_file_name(library));
        fs::write(&path, render_library(library, chunks))?;
        debug!("Wrote documentation for {} to {}", library, path.display());
        written.push(path);
    }
    Ok(written)
}
