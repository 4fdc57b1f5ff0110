use serde::{Deserialize, Serialize};

/// Environment variable holding the SerpAPI key
pub const SERPAPI_KEY_VAR: &str = "SERPAPI_KEY";
/// Environment variable holding the Gemini key
pub const GEMINI_KEY_VAR: &str = "GEMINI_KEY";

/// Stores API keys for the upstream services
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    /// SerpAPI key used for documentation searches
    pub serpapi_key: Option<String>,
    /// Gemini key used for documentation URL selection
    pub gemini_key: Option<String>,
}

impl ApiKeys {
    /// Builds a key set from explicit values, dropping blank ones
    pub fn new(serpapi_key: Option<&str>, gemini_key: Option<&str>) -> Self {
        Self {
            serpapi_key: serpapi_key.and_then(non_blank),
            gemini_key: gemini_key.and_then(non_blank),
        }
    }

    /// Loads API keys from the environment
    pub fn from_env() -> Self {
        Self {
            serpapi_key: get_env_value(SERPAPI_KEY_VAR),
            gemini_key: get_env_value(GEMINI_KEY_VAR),
        }
    }

    /// Fills missing keys from `fallback`, keeping the ones already present
    pub fn or(self, fallback: &ApiKeys) -> Self {
        Self {
            serpapi_key: self.serpapi_key.or_else(|| fallback.serpapi_key.clone()),
            gemini_key: self.gemini_key.or_else(|| fallback.gemini_key.clone()),
        }
    }

    /// SerpAPI key, or an empty string when none is configured
    pub fn serpapi(&self) -> &str {
        self.serpapi_key.as_deref().unwrap_or_default()
    }

    /// Gemini key, or an empty string when none is configured
    pub fn gemini(&self) -> &str {
        self.gemini_key.as_deref().unwrap_or_default()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads an environment variable, treating empty values as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
