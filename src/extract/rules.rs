use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Optional `--flag` / `-f` arguments between `install` and the package name
const FLAGS: &str = r"(?:-{1,2}[\w\-]+\s+)*";
/// Package token: optional npm scope, then a name that never starts with `-`
const NAME: &str = r"(@?[A-Za-z0-9_][\w\-\.]*(?:/[\w\-\.]+)?)";

static PY_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*import[ \t]+([^\n#;]+)").expect("valid regex"));
static PY_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*from[ \t]+([\w\.]+)[ \t]+import\b").expect("valid regex"));
static JS_REQUIRE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\brequire\(\s*["']([^"'\s]+)["']\s*\)"#).expect("valid regex"));
static JS_IMPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+[\w\{\}\*\s,$]+?\s+from\s+["']([^"'\s]+)["']"#).expect("valid regex")
});
static JS_DYNAMIC_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\(\s*["']([^"'\s]+)["']\s*\)"#).expect("valid regex"));
static RB_REQUIRE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\brequire\s+["']([^"'\s]+)["']"#).expect("valid regex"));
static GO_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import[ \t]+(?:[\w\.]+[ \t]+)?"([^"]+)""#).expect("valid regex")
});
static GO_IMPORT_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\bimport\s*\((.*?)\)").expect("valid regex"));
static JAVA_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+(?:static[ \t]+)?(\w+)(?:\.[\w\*]+)*[ \t]*;").expect("valid regex")
});

static PIP_INSTALL: LazyLock<Regex> = LazyLock::new(|| installer_pattern("pip3?"));
static NPM_INSTALL: LazyLock<Regex> = LazyLock::new(|| installer_pattern("npm"));
static GEM_INSTALL: LazyLock<Regex> = LazyLock::new(|| installer_pattern("gem"));
static ANY_INSTALL: LazyLock<Regex> = LazyLock::new(|| installer_pattern("pip3?|npm|gem"));
static BARE_INSTALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\binstall\s+{}{}", FLAGS, NAME)).expect("valid regex")
});

/// Source language inferred from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// `.py`
    Python,
    /// `.js` and `.ts`
    JavaScript,
    /// `.rb`
    Ruby,
    /// `.go`
    Go,
    /// `.java`
    Java,
    /// Anything else; only installer commands are recognised
    Other,
}

impl Language {
    /// Maps a file extension (without the dot, any case) to a language
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "py" => Self::Python,
            "js" | "ts" => Self::JavaScript,
            "rb" => Self::Ruby,
            "go" => Self::Go,
            "java" => Self::Java,
            _ => Self::Other,
        }
    }

    /// Collects every dependency name the language-specific rules find in `content`
    pub fn extract(self, content: &str) -> HashSet<String> {
        let mut names = HashSet::new();
        match self {
            Self::Python => {
                for list in captures(&PY_IMPORT, content) {
                    names.extend(list.split(',').filter_map(python_root));
                }
                names.extend(captures(&PY_FROM, content).iter().filter_map(|m| python_root(m)));
                names.extend(installer_names(&PIP_INSTALL, content));
            }
            Self::JavaScript => {
                for pattern in [&JS_REQUIRE, &JS_IMPORT_FROM, &JS_DYNAMIC_IMPORT] {
                    names.extend(captures(pattern, content).iter().filter_map(|m| js_package(m)));
                }
                names.extend(installer_names(&NPM_INSTALL, content));
            }
            Self::Ruby => {
                names.extend(captures(&RB_REQUIRE, content));
                names.extend(installer_names(&GEM_INSTALL, content));
            }
            Self::Go => {
                names.extend(captures(&GO_IMPORT, content));
                for block in captures(&GO_IMPORT_GROUP, content) {
                    names.extend(block.lines().filter_map(go_import_line));
                }
            }
            Self::Java => {
                names.extend(captures(&JAVA_IMPORT, content));
            }
            Self::Other => {
                names.extend(installer_names(&ANY_INSTALL, content));
            }
        }
        names
    }
}

/// Matches `install <name>` anywhere, including ordinary prose
///
/// Applied to every file kind on top of the language rules. Sentences such
/// as "then install the package" yield `the`; callers accept that recall
/// over precision.
pub fn catch_all_install(content: &str) -> HashSet<String> {
    installer_names(&BARE_INSTALL, content)
}

/// `<installers> install [flags] <name>`
fn installer_pattern(installers: &str) -> Regex {
    Regex::new(&format!(r"\b(?:{})\s+install\s+{}{}", installers, FLAGS, NAME)).expect("valid regex")
}

fn installer_names(re: &Regex, content: &str) -> HashSet<String> {
    captures(re, content)
        .iter()
        .filter_map(|m| clean_name(m))
        .collect()
}

/// Returns capture group 1 of every match of `re` in `content`
fn captures(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn clean_name(raw: &str) -> Option<String> {
    let name = raw.trim().trim_end_matches('.');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// `os.path as p` -> `os`; relative paths (`.models`) yield nothing
fn python_root(module: &str) -> Option<String> {
    let path = module.split_whitespace().next()?;
    let root = path.split('.').next()?;
    if !root.is_empty() && root.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Some(root.to_string())
    } else {
        None
    }
}

/// `lodash/fp` -> `lodash`, `@scope/pkg/sub` -> `@scope/pkg`; relative specifiers yield nothing
fn js_package(specifier: &str) -> Option<String> {
    if specifier.starts_with('.') || specifier.starts_with('/') {
        return None;
    }
    let mut segments = specifier.split('/');
    let first = segments.next()?;
    let package = if first.starts_with('@') {
        match segments.next() {
            Some(second) if !second.is_empty() => format!("{}/{}", first, second),
            _ => first.to_string(),
        }
    } else {
        first.to_string()
    };
    clean_name(&package)
}

/// One line of a grouped Go import: `alias "path"` -> `path`
fn go_import_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") {
        return None;
    }
    let path = line.split('"').nth(1)?.trim();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
