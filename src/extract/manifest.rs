use serde_json::Value;
use std::collections::HashSet;

/// Dependency-declaration files parsed structurally instead of by pattern rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// npm `package.json`
    PackageJson,
    /// pip `requirements.txt`
    Requirements,
}

/// Outcome of parsing a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestParse {
    /// The manifest was understood; these are its dependency names
    Parsed(HashSet<String>),
    /// The manifest could not be parsed; it contributes no names
    Malformed(String),
}

impl ManifestParse {
    /// Names from a parsed manifest, or nothing for a malformed one
    pub fn into_names(self) -> HashSet<String> {
        match self {
            Self::Parsed(names) => names,
            Self::Malformed(_) => HashSet::new(),
        }
    }
}

impl ManifestKind {
    /// Recognises a manifest by its exact file name
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match file_name {
            "package.json" => Some(Self::PackageJson),
            "requirements.txt" => Some(Self::Requirements),
            _ => None,
        }
    }

    /// Parses the manifest content
    pub fn parse(self, content: &str) -> ManifestParse {
        match self {
            Self::PackageJson => parse_package_json(content),
            Self::Requirements => ManifestParse::Parsed(parse_requirements(content)),
        }
    }
}

fn parse_package_json(content: &str) -> ManifestParse {
    let manifest: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => return ManifestParse::Malformed(format!("invalid JSON: {}", e)),
    };
    let Some(root) = manifest.as_object() else {
        return ManifestParse::Malformed("top-level value is not an object".to_string());
    };

    let mut names = HashSet::new();
    for section in ["dependencies", "devDependencies"] {
        match root.get(section) {
            None => {}
            Some(Value::Object(deps)) => names.extend(deps.keys().cloned()),
            Some(_) => {
                return ManifestParse::Malformed(format!("`{}` is not an object", section));
            }
        }
    }
    ManifestParse::Parsed(names)
}

/// `flask>=2.0` -> `flask`; blank lines and `#` comments are skipped
fn parse_requirements(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let name = line.split(['<', '>', '=']).next()?.trim();
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}
