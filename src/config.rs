//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `SYMPTOM_LENS_*` environment overrides.

use crate::analysis::{AnalysisOptions, DayPolicy, Factor};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub narrative: NarrativeConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analysis defaults
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Days analyzed when no explicit range is given
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    #[serde(default)]
    pub day_policy: DayPolicy,

    /// Tags carried into narrative prompts
    #[serde(default = "default_top_tags")]
    pub top_tags: usize,

    #[serde(default = "Factor::defaults")]
    pub factors: Vec<Factor>,
}

fn default_window_days() -> i64 {
    30
}

fn default_top_tags() -> usize {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            day_policy: DayPolicy::default(),
            top_tags: default_top_tags(),
            factors: Factor::defaults(),
        }
    }
}

impl AnalysisConfig {
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            day_policy: self.day_policy,
            factors: self.factors.clone(),
        }
    }
}

/// External narrative generator
#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_narrative_endpoint")]
    pub endpoint: String,

    pub api_key: Option<String>,

    #[serde(default = "default_narrative_timeout")]
    pub timeout_ms: u64,

    /// Extra attempts after the first one fails transiently
    #[serde(default = "default_narrative_retries")]
    pub max_retries: u32,
}

fn default_narrative_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent".to_string()
}

fn default_narrative_timeout() -> u64 {
    10_000
}

fn default_narrative_retries() -> u32 {
    2
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_narrative_endpoint(),
            api_key: None,
            timeout_ms: default_narrative_timeout(),
            max_retries: default_narrative_retries(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in default_config_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply `SYMPTOM_LENS_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparseable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Analysis overrides
        if let Some(days) = lookup("SYMPTOM_LENS_WINDOW_DAYS").and_then(|v| v.parse().ok()) {
            self.analysis.window_days = days;
        }
        if let Some(policy) = lookup("SYMPTOM_LENS_DAY_POLICY").and_then(|v| v.parse().ok()) {
            self.analysis.day_policy = policy;
        }

        // Narrative overrides
        if let Some(enabled) =
            lookup("SYMPTOM_LENS_NARRATIVE_ENABLED").and_then(|v| parse_bool(&v))
        {
            self.narrative.enabled = enabled;
        }
        if let Some(endpoint) = lookup("SYMPTOM_LENS_NARRATIVE_ENDPOINT") {
            self.narrative.endpoint = endpoint;
        }
        if let Some(key) = lookup("SYMPTOM_LENS_NARRATIVE_API_KEY") {
            self.narrative.api_key = Some(key);
        }

        // API overrides
        if let Some(host) = lookup("SYMPTOM_LENS_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("SYMPTOM_LENS_API_PORT").and_then(|v| v.parse().ok()) {
            self.api.port = port;
        }

        // Logging overrides
        if let Some(level) = lookup("SYMPTOM_LENS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SYMPTOM_LENS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join("symptom-lens").join("config.toml")),
        Some(PathBuf::from("/etc/symptom-lens/config.toml")),
        Some(PathBuf::from("./symptom-lens.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Symptom Lens Configuration
#
# Environment variables override these settings:
# - SYMPTOM_LENS_WINDOW_DAYS
# - SYMPTOM_LENS_DAY_POLICY
# - SYMPTOM_LENS_NARRATIVE_ENABLED
# - SYMPTOM_LENS_NARRATIVE_ENDPOINT
# - SYMPTOM_LENS_NARRATIVE_API_KEY
# - SYMPTOM_LENS_API_HOST
# - SYMPTOM_LENS_API_PORT
# - SYMPTOM_LENS_LOG_LEVEL
# - SYMPTOM_LENS_LOG_FORMAT

[analysis]
# Days analyzed when no explicit range is given
window_days = 30

# Same-day entries: "symptom_dominates" (a day with any matching entry is a
# symptom day) or "per_entry" (each entry classified on its own)
day_policy = "symptom_dominates"

# Tags included in narrative prompts
top_tags = 5

# Factors compared between symptom and symptom-free days
factors = ["sleep_duration", "activity", "resting_heart_rate", "active_calories", "mood", "energy"]

[narrative]
# Call an external text generator for narratives
enabled = false

# generateContent-style endpoint
endpoint = "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"

# API key, sent as the `key` query parameter
# api_key = ""

# Request timeout (ms)
timeout_ms = 10000

# Retries after a transient failure (0 sends the request once)
max_retries = 2

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.analysis.window_days, 30);
        assert_eq!(config.analysis.day_policy, DayPolicy::SymptomDominates);
        assert_eq!(config.analysis.top_tags, 5);
        assert!(!config.narrative.enabled);
        assert_eq!(config.api.bind_address(), "0.0.0.0:8090");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.analysis.window_days, defaults.analysis.window_days);
        assert_eq!(config.analysis.factors, defaults.analysis.factors);
        assert_eq!(config.narrative.endpoint, defaults.narrative.endpoint);
        assert_eq!(config.narrative.api_key, None);
        assert_eq!(config.api.port, defaults.api.port);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[analysis]\nday_policy = \"per_entry\"\nfactors = [\"sleep_duration\", \"mood\"]\n\n[api]\nport = 9000\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.analysis.day_policy, DayPolicy::PerEntry);
        assert_eq!(config.analysis.window_days, 30);
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");

        let options = config.analysis.options();
        assert_eq!(options.factors, vec![Factor::SleepDuration, Factor::Mood]);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();

        let missing = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[api\nport = 1").unwrap();
        let broken = Config::load(&path).unwrap_err();
        assert!(matches!(broken, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SYMPTOM_LENS_WINDOW_DAYS", "14"),
            ("SYMPTOM_LENS_DAY_POLICY", "per_entry"),
            ("SYMPTOM_LENS_NARRATIVE_ENABLED", "yes"),
            ("SYMPTOM_LENS_NARRATIVE_API_KEY", "abc"),
            ("SYMPTOM_LENS_API_PORT", "not-a-port"),
            ("SYMPTOM_LENS_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.analysis.window_days, 14);
        assert_eq!(config.analysis.day_policy, DayPolicy::PerEntry);
        assert!(config.narrative.enabled);
        assert_eq!(config.narrative.api_key.as_deref(), Some("abc"));
        // Unparseable values leave the default in place
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.logging.format, "json");
    }
}
