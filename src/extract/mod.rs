//! Dependency extraction from source files and package manifests.
//!
//! Source files go through per-language pattern rules ([`rules`]); the
//! manifests npm and pip understand are parsed structurally ([`manifest`]).

use std::collections::HashSet;
use tracing::{debug, warn};

/// Manifest parsing for `package.json` and `requirements.txt`
pub mod manifest;
/// Regex rules per source language
pub mod rules;

pub use manifest::{ManifestKind, ManifestParse};
pub use rules::Language;

/// Extracts the library names referenced in `content`
///
/// `extension` is the file extension without its dot. The language rules for
/// that extension run first, then the catch-all `install <name>` rule.
pub fn extract(content: &str, extension: &str) -> HashSet<String> {
    let mut names = Language::from_extension(extension).extract(content);
    names.extend(rules::catch_all_install(content));
    names
}

/// Extracts library names from one file, routing manifests by exact file name
pub fn extract_file(file_name: &str, content: &str) -> HashSet<String> {
    if let Some(kind) = ManifestKind::from_file_name(file_name) {
        return match kind.parse(content) {
            ManifestParse::Parsed(names) => {
                debug!("{} declares {} dependencies", file_name, names.len());
                names
            }
            ManifestParse::Malformed(reason) => {
                warn!("Ignoring malformed manifest {}: {}", file_name, reason);
                HashSet::new()
            }
        };
    }

    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    extract(content, extension)
}
