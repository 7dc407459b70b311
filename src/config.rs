//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `DOSEWISE_*` environment variable overrides.

use crate::analytics::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Store access configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Per-stream fetch timeout in milliseconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,

    /// strftime format for CSV timestamps that are not RFC 3339
    #[serde(default = "default_csv_timestamp_format")]
    pub csv_timestamp_format: String,
}

fn default_fetch_timeout() -> u64 {
    2000
}

fn default_csv_timestamp_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout(),
            csv_timestamp_format: default_csv_timestamp_format(),
        }
    }
}

impl StoreConfig {
    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

impl LoggingConfig {
    /// Filter directive for `EnvFilter`, scoped to this crate
    pub fn filter_directive(&self) -> String {
        format!("dosewise={}", self.level)
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
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

        config.validate(path)?;
        Ok(config)
    }

    /// Check the analysis settings, naming `path` in the error
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        self.analysis.validate().map_err(|error| ConfigError::Invalid {
            path: path.to_path_buf(),
            error,
        })
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
        config.validate(path)?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in Self::default_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!(path = ?path, "Loaded config");
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = ?path, error = %e, "Failed to load config");
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Candidate config files, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("dosewise").join("config.toml")),
            Some(PathBuf::from("/etc/dosewise/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("DOSEWISE_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("DOSEWISE_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Store overrides
        if let Some(ms) = lookup("DOSEWISE_FETCH_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.store.fetch_timeout_ms = ms;
        }

        // Analysis overrides
        if let Some(days) = lookup("DOSEWISE_DEFAULT_WINDOW_DAYS").and_then(|v| v.parse().ok()) {
            self.analysis.window.default_days = days;
        }
        if let Some(floor) = lookup("DOSEWISE_NOISE_FLOOR")
            .and_then(|v| v.parse().ok())
            .filter(|f: &f64| (0.0..=1.0).contains(f))
        {
            self.analysis.weighting.noise_floor = floor;
        }

        // Logging overrides
        if let Some(level) = lookup("DOSEWISE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("DOSEWISE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid config file {path:?}: {error}")]
    Invalid { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Dosewise Configuration
#
# Environment variables override these settings:
# - DOSEWISE_API_HOST
# - DOSEWISE_API_PORT
# - DOSEWISE_FETCH_TIMEOUT_MS
# - DOSEWISE_DEFAULT_WINDOW_DAYS
# - DOSEWISE_NOISE_FLOOR
# - DOSEWISE_LOG_LEVEL
# - DOSEWISE_LOG_FORMAT

[analysis.window]
# Window (days) when no injection is logged
default_days = 60

# Recent injections compared when looking for a dose change
dose_change_lookback = 4

# Injections needed before a user counts as established
established_min_injections = 4

# Window lengths (days) per cadence and situation
daily_dose_change_days = 21
daily_new_user_days = 45
daily_stable_days = 35
weekly_dose_change_days = 35
weekly_new_user_days = 75
weekly_stable_days = 60

# Bounds applied to every window
min_days = 14
max_days = 75

[analysis.weighting]
# Recency decay constant (days)
recency_decay_days = 21.0

# Longest gap (days) between an injection and a symptom it explains
relevance_lookback_days = 7

medication_mismatch_factor = 0.3
min_dose_similarity = 0.2
no_injection_factor = 0.5

# Severity bonus thresholds and factors
severe_threshold = 7
moderate_threshold = 5
severe_bonus = 1.2
moderate_bonus = 1.0
mild_bonus = 0.8

# Logs weighted below this are ignored
noise_floor = 0.1

[analysis.patterns]
min_logs = 2
resample_factor = 5.0
recency_score_scale = 25.0
variance_penalty = 20.0
min_confidence = 25
high_tier_min_occurrences = 4
medium_tier_min_occurrences = 3
moderate_severity = 5.0
severe_severity = 7.0
consistent_frequency = 0.7
frequent_frequency = 0.4

[analysis.correlations]
min_injections = 2
min_symptoms = 3
data_point_score = 2
high_pattern_score = 15
peak_planning_max_start = 2
peak_min_count = 2
provider_min_severity = 6.0
max_provider_recommendations = 2
site_rotation_threshold = 2
max_dose_symptoms = 3

[analysis.insights]
min_symptoms = 3
min_injections = 2
max_insights = 5
base_validity_days = 14.0
placeholder_validity_days = 7
high_actionability = 70
medium_actionability = 40
high_confidence_multiplier = 2.0
medium_confidence_multiplier = 1.5
low_confidence_multiplier = 1.0
fresh_recency_score = 80.0
fresh_recency_multiplier = 0.8

[analysis.meal]
max_warnings = 3
max_tips = 2
peak_caution_min_confidence = 40
reinforcement_min_confidence = 60
risk_min_confidence = 30
high_warning_severity = 7.0

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

[store]
# Per-stream fetch timeout (ms)
fetch_timeout_ms = 2000

# Timestamp format for CSV imports (RFC 3339 is always accepted)
csv_timestamp_format = "%Y-%m-%d %H:%M"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
