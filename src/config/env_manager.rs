use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable overriding the Gemini model name
pub const GEMINI_MODEL_VAR: &str = "GEMINI_MODEL";
/// Environment variable overriding the Gemini API base URL (useful for testing)
pub const GEMINI_BASE_URL_VAR: &str = "GEMINI_API_BASE_URL";
/// Environment variable overriding the server bind address
pub const BIND_ADDR_VAR: &str = "READMESMITH_BIND";
/// Environment variable overriding the parent directory for clones
pub const TEMP_DIR_VAR: &str = "READMESMITH_TEMP_DIR";

/// Stores API keys for the model provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Gemini API key; `None` means generation is not configured
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
}

impl ApiKeys {
    /// Returns true when a non-blank Gemini key is present
    pub fn has_gemini_key(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Reads an environment variable, treating empty values as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
