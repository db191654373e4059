/// Environment variable names and lookups
pub mod env_manager;

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::context::NO_KEY_FILES_NOTE;
use crate::error::{ReadmeError, Result};
use env_manager::get_env_value;

pub use env_manager::ApiKeys;

/// Directories that are never listed or descended into.
///
/// Version-control metadata and dependency caches only; build output is still listed.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "vendor",
    "__pycache__",
    ".venv",
    "venv",
];

/// Key files in priority order. Earlier entries win when the budget runs out.
pub const DEFAULT_KEY_FILES: &[&str] = &[
    // Manifests
    "package.json",
    "pyproject.toml",
    "requirements.txt",
    "setup.py",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "composer.json",
    "Gemfile",
    "mix.exs",
    "pubspec.yaml",
    // Build files
    "CMakeLists.txt",
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
    // Existing documentation
    "README.md",
    "README.rst",
    "README.txt",
    "README",
    // Lockfiles
    "Cargo.lock",
    "go.sum",
    "poetry.lock",
    "Gemfile.lock",
    "yarn.lock",
    "package-lock.json",
];

/// Main configuration struct for the application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model provider settings
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Clone settings
    #[serde(default)]
    pub clone: CloneConfig,
    /// Context extraction limits
    #[serde(default)]
    pub extraction: ExtractionLimits,
    /// API keys, normally taken from the environment
    #[serde(default, skip_serializing)]
    pub api_keys: ApiKeys,
}

/// Settings for the Gemini text generation API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model name used in the `generateContent` URL
    pub model: String,
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Upper bound for a single generation request
    pub timeout_secs: u64,
}

/// Settings for the HTTP server binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on
    pub bind_addr: String,
}

/// Settings for the shallow clone step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    /// git executable to run
    pub git_binary: String,
    /// Upper bound for a single clone; the child is killed when it expires
    pub timeout_secs: u64,
    /// Parent directory for per-request working directories (system temp when unset)
    pub temp_root: Option<PathBuf>,
}

/// Bounds applied by the context extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    /// Maximum number of paths kept in the file listing
    pub max_listed_files: usize,
    /// Hard ceiling on entries visited while counting omitted files
    pub max_scanned_entries: usize,
    /// Global budget for the extracted context, in bytes of UTF-8 text
    pub max_context_chars: usize,
    /// Maximum number of key files read into the context
    pub max_key_files: usize,
    /// Key files larger than this are skipped
    pub max_file_bytes: u64,
    /// Directory names that are pruned from the walk
    pub ignored_dirs: Vec<String>,
    /// Key file names in priority order, matched as case-insensitive path suffixes
    pub key_files: Vec<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            git_binary: "git".to_string(),
            timeout_secs: 120,
            temp_root: None,
        }
    }
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_listed_files: 100,
            max_scanned_entries: 10_000,
            max_context_chars: 15_000,
            max_key_files: 10,
            max_file_bytes: 50 * 1024,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            key_files: DEFAULT_KEY_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExtractionLimits {
    /// Returns true if a directory with this name must not be walked
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }
}

impl Config {
    /// Loads configuration from the default config file location, then applies
    /// environment overrides.
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a TOML file without touching the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            ReadmeError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ReadmeError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// `<config_dir>/readmesmith/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("readmesmith").join("config.toml"))
    }

    /// Overrides file values with any non-empty environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = get_env_value(env_manager::GEMINI_API_KEY_VAR) {
            self.api_keys.gemini_api_key = Some(key);
        }
        if let Some(model) = get_env_value(env_manager::GEMINI_MODEL_VAR) {
            self.gemini.model = model;
        }
        if let Some(base_url) = get_env_value(env_manager::GEMINI_BASE_URL_VAR) {
            self.gemini.base_url = base_url;
        }
        if let Some(bind) = get_env_value(env_manager::BIND_ADDR_VAR) {
            self.server.bind_addr = bind;
        }
        if let Some(dir) = get_env_value(env_manager::TEMP_DIR_VAR) {
            self.clone.temp_root = Some(PathBuf::from(dir));
        }
    }

    /// Checks that limits are usable and the bind address parses
    pub fn validate(&self) -> Result<()> {
        let limits = &self.extraction;
        if limits.max_listed_files == 0 || limits.max_context_chars == 0 {
            return Err(ReadmeError::Config(
                "extraction limits must be greater than zero".into(),
            ));
        }
        if limits.max_context_chars < NO_KEY_FILES_NOTE.len() {
            return Err(ReadmeError::Config(format!(
                "max_context_chars must be at least {}",
                NO_KEY_FILES_NOTE.len()
            )));
        }
        if limits.max_scanned_entries < limits.max_listed_files {
            return Err(ReadmeError::Config(
                "max_scanned_entries must be at least max_listed_files".into(),
            ));
        }
        if self.clone.timeout_secs == 0 || self.gemini.timeout_secs == 0 {
            return Err(ReadmeError::Config("timeouts must be greater than zero".into()));
        }
        self.bind_addr()?;
        Ok(())
    }

    /// Parsed server bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind_addr.parse().map_err(|e| {
            ReadmeError::Config(format!("Invalid bind address '{}': {}", self.server.bind_addr, e))
        })
    }

    /// Retrieves the Gemini API key from the configuration
    pub fn gemini_api_key(&self) -> Result<&str> {
        self.api_keys
            .gemini_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ReadmeError::Config(format!(
                    "{} is not set; README generation is unavailable",
                    env_manager::GEMINI_API_KEY_VAR
                ))
            })
    }

    /// Parent directory for per-request working directories
    pub fn temp_root(&self) -> PathBuf {
        self.clone
            .temp_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Clone timeout as a `Duration`
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone.timeout_secs)
    }

    /// Generation timeout as a `Duration`
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_secs)
    }
}
