//! Configuration system for agent-matcher
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (AGENT_MATCHER_* prefix, plus OPENAI_API_KEY)
//! 3. Configuration file (TOML)
//! 4. Default values
//!
//! The loaded configuration is immutable; components receive the section they need.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::history::HistoryFormat;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerSettings,

    /// Upstream chat-completions API settings
    pub openai: OpenAiSettings,

    /// Interaction history settings
    pub history: HistorySettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub bind: String,

    /// Listen port
    pub port: u16,

    /// Tokio worker threads (0 = auto)
    pub worker_threads: u32,
}

/// OpenAI-compatible API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// API base URL (e.g., "https://api.openai.com/v1", "http://localhost:11434/v1")
    pub base_url: String,

    /// API key (empty string for local servers like Ollama)
    pub api_key: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
}

/// Interaction history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// History file path
    pub path: String,

    /// On-disk format: "json" (single array) or "jsonl" (one record per line)
    pub format: HistoryFormat,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB; below 10 switches to hourly rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            worker_threads: 0,
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            path: "interactions.json".to_string(),
            format: HistoryFormat::Json,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::config_not_found(path))
            };
        }

        let search_paths = [
            PathBuf::from("agent-matcher.toml"),
            dirs::config_dir()
                .map(|p| p.join("agent-matcher").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/agent-matcher/config.toml"),
        ];

        for path in &search_paths {
            if path.is_file() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server settings
        if let Ok(val) = std::env::var("AGENT_MATCHER_BIND") {
            self.server.bind = val;
        }
        if let Some(n) = env_parse("AGENT_MATCHER_PORT") {
            self.server.port = n;
        }
        if let Some(n) = env_parse("AGENT_MATCHER_WORKER_THREADS") {
            self.server.worker_threads = n;
        }

        // OpenAI settings; the conventional OPENAI_API_KEY is honored as a fallback
        if let Ok(val) = std::env::var("AGENT_MATCHER_OPENAI_BASE_URL") {
            self.openai.base_url = val;
        }
        if let Ok(val) = std::env::var("AGENT_MATCHER_OPENAI_API_KEY") {
            self.openai.api_key = val;
        } else if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            if self.openai.api_key.is_empty() {
                self.openai.api_key = val;
            }
        }
        if let Ok(val) = std::env::var("AGENT_MATCHER_OPENAI_MODEL") {
            self.openai.model = val;
        }
        if let Some(n) = env_parse("AGENT_MATCHER_OPENAI_TIMEOUT_SECS") {
            self.openai.timeout_secs = n;
        }

        // History settings
        if let Ok(val) = std::env::var("AGENT_MATCHER_HISTORY_PATH") {
            self.history.path = val;
        }
        if let Some(format) = env_parse("AGENT_MATCHER_HISTORY_FORMAT") {
            self.history.format = format;
        }

        // Logging settings
        if let Ok(val) = std::env::var("AGENT_MATCHER_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("AGENT_MATCHER_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("AGENT_MATCHER_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.history.path = expand_path(&self.history.path);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = url::Url::parse(&self.openai.base_url).map_err(|e| {
            Error::config_field_invalid(
                "openai.base_url",
                format!("'{}' is not a valid URL: {}", self.openai.base_url, e),
            )
        })?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(Error::config_field_invalid(
                "openai.base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if self.openai.model.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "openai.model",
                "Model identifier cannot be empty",
            ));
        }

        if self.server.bind.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "server.bind",
                "Bind address cannot be empty",
            ));
        }

        if self.history.path.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "history.path",
                "History path cannot be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Socket address string for the HTTP server
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    /// History file as a PathBuf
    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.history.path)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse().ok())
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("agent-matcher")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }
    }

    fs::write(&config_path, generate_default_config())
        .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# agent-matcher configuration

[server]
# Bind address (use 0.0.0.0 to listen on all interfaces)
bind = "127.0.0.1"

# Listen port
port = 8000

# Tokio worker threads (0 = auto-detect)
worker_threads = 0

[openai]
# API base URL (OpenAI, Ollama, vLLM, LM Studio, etc.)
base_url = "https://api.openai.com/v1"

# API key; prefer AGENT_MATCHER_OPENAI_API_KEY or OPENAI_API_KEY over writing it here
api_key = ""

# Model identifier
model = "gpt-4o-mini"

# Request timeout in seconds (0 = no timeout)
timeout_secs = 120

[history]
# Where interaction records are persisted
path = "interactions.json"

# "json" keeps one pretty-printed array, "jsonl" appends one record per line
format = "json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.local/state/agent-matcher/agent-matcher.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
