use anyhow::Result;
use grokipedia_cache::FileCache;
use grokipedia_client::{ClientConfig, RateLimitPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::Args;

const ENV_PREFIX: &str = "GROKIPEDIA_";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct GrokipediaConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
}

/// Remote service settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; the client default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    grokipedia_client::DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

/// Response cache settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Enable cache
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Cache directory; `~/.grokipedia_cache` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    grokipedia_cache::DEFAULT_TTL.as_secs()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            directory: None,
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(FileCache::default_dir)
    }

    /// Open the cache store, or `None` when caching is disabled
    pub fn open(&self) -> Result<Option<FileCache>> {
        if !self.enabled {
            return Ok(None);
        }
        let cache = FileCache::new(self.resolved_directory(), Duration::from_secs(self.ttl_secs))?;
        Ok(Some(cache))
    }
}

/// Retry and rate-limit settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// "surface", "retry" or "wait_once"
    #[serde(default = "default_rate_limit")]
    pub rate_limit: String,

    /// Wait before the extra attempt of the "wait_once" strategy
    #[serde(default = "default_rate_limit_wait_secs")]
    pub rate_limit_wait_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_rate_limit() -> String {
    "surface".to_string()
}

fn default_rate_limit_wait_secs() -> u64 {
    RateLimitPolicy::DEFAULT_WAIT.as_secs()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            rate_limit: default_rate_limit(),
            rate_limit_wait_secs: default_rate_limit_wait_secs(),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(self.max_attempts)
            .with_backoff(
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
    }

    pub fn to_rate_limit_policy(&self) -> Result<RateLimitPolicy, ConfigError> {
        match self.rate_limit.as_str() {
            "surface" => Ok(RateLimitPolicy::Surface),
            "retry" => Ok(RateLimitPolicy::Retry),
            "wait_once" => Ok(RateLimitPolicy::WaitAndRetryOnce(Duration::from_secs(
                self.rate_limit_wait_secs,
            ))),
            other => Err(ConfigError::InvalidValue {
                field: "retry.rate_limit".to_string(),
                value: other.to_string(),
                expected: "surface, retry or wait_once".to_string(),
            }),
        }
    }
}

/// Fan-out settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConcurrencyConfig {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_max_in_flight() -> usize {
    grokipedia_client::DEFAULT_MAX_IN_FLIGHT
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// One configuration file as written: only the keys it sets are `Some`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    #[serde(default)]
    pub api: ApiLayer,

    #[serde(default)]
    pub cache: CacheLayer,

    #[serde(default)]
    pub retry: RetryLayer,

    #[serde(default)]
    pub concurrency: ConcurrencyLayer,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ApiLayer {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CacheLayer {
    pub enabled: Option<bool>,
    pub directory: Option<PathBuf>,
    pub ttl_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RetryLayer {
    pub max_attempts: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
    pub rate_limit: Option<String>,
    pub rate_limit_wait_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConcurrencyLayer {
    pub max_in_flight: Option<usize>,
}

impl ConfigLayer {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let layer: ConfigLayer = toml::from_str(&content)?;
        Ok(layer)
    }
}

impl GrokipediaConfig {
    /// Merge a config layer into this one; every key the layer sets wins,
    /// including keys set back to their default value
    pub fn merge(&mut self, layer: &ConfigLayer) {
        if let Some(ref base_url) = layer.api.base_url {
            self.api.base_url = base_url.clone();
        }
        if layer.api.timeout_secs.is_some() {
            self.api.timeout_secs = layer.api.timeout_secs;
        }
        if layer.api.user_agent.is_some() {
            self.api.user_agent = layer.api.user_agent.clone();
        }

        if let Some(enabled) = layer.cache.enabled {
            self.cache.enabled = enabled;
        }
        if layer.cache.directory.is_some() {
            self.cache.directory = layer.cache.directory.clone();
        }
        if let Some(ttl_secs) = layer.cache.ttl_secs {
            self.cache.ttl_secs = ttl_secs;
        }

        if let Some(max_attempts) = layer.retry.max_attempts {
            self.retry.max_attempts = max_attempts;
        }
        if let Some(initial_backoff_ms) = layer.retry.initial_backoff_ms {
            self.retry.initial_backoff_ms = initial_backoff_ms;
        }
        if let Some(max_backoff_ms) = layer.retry.max_backoff_ms {
            self.retry.max_backoff_ms = max_backoff_ms;
        }
        if let Some(ref rate_limit) = layer.retry.rate_limit {
            self.retry.rate_limit = rate_limit.to_lowercase();
        }
        if let Some(wait_secs) = layer.retry.rate_limit_wait_secs {
            self.retry.rate_limit_wait_secs = wait_secs;
        }

        if let Some(max_in_flight) = layer.concurrency.max_in_flight {
            self.concurrency.max_in_flight = max_in_flight;
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value in {field}: {value} (expected {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Invalid range in {field}: {value} (valid range: {valid_range})")]
    InvalidRange {
        field: String,
        value: u64,
        valid_range: String,
    },

    #[error("Invalid environment variable {key}={value}")]
    InvalidEnvVar { key: String, value: String },

    #[error("Failed to load config file {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GrokipediaConfig {
    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_else(|_| {
            r#"# Grokipedia Configuration File

[api]
base_url = "https://grokipedia.com"
# timeout_secs = 60
# user_agent = "grokipedia/0.1.0"

[cache]
enabled = true
# directory = "~/.grokipedia_cache"
ttl_secs = 604800

[retry]
max_attempts = 3
initial_backoff_ms = 1000
max_backoff_ms = 10000
# "surface", "retry" or "wait_once"
rate_limit = "surface"
rate_limit_wait_secs = 5

[concurrency]
max_in_flight = 10
"#
            .to_string()
        })
    }

    /// Load one file on top of the defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge(&ConfigLayer::load_from_file(path)?);
        Ok(config)
    }

    /// Get the user config file path (~/.config/grokipedia/config.toml)
    pub fn get_user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/grokipedia/config.toml"))
    }

    /// Get the current directory config file path (./grokipedia.toml)
    pub fn get_current_config_path() -> PathBuf {
        PathBuf::from("./grokipedia.toml")
    }

    /// Load and merge configs from the user file, then the current directory.
    /// Unreadable files are logged and skipped.
    pub fn load_with_merged_configs() -> Self {
        let mut config = Self::default();

        if let Some(user_path) = Self::get_user_config_path() {
            config.merge_file_if_present(&user_path);
        }
        config.merge_file_if_present(&Self::get_current_config_path());

        config
    }

    fn merge_file_if_present(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match ConfigLayer::load_from_file(path) {
            Ok(layer) => {
                self.merge(&layer);
                tracing::debug!("Loaded config from: {}", path.display());
            }
            Err(e) => tracing::warn!("Ignoring config file {}: {}", path.display(), e),
        }
    }

    pub fn apply_env_vars(&mut self, env_vars: &HashMap<String, String>) -> Result<(), ConfigError> {
        for (key, value) in env_vars {
            let Some(config_key) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let invalid = || ConfigError::InvalidEnvVar {
                key: key.clone(),
                value: value.clone(),
            };

            match config_key {
                "API_BASE_URL" => self.api.base_url = value.clone(),
                "API_TIMEOUT_SECS" => {
                    self.api.timeout_secs = Some(value.parse().map_err(|_| invalid())?);
                }
                "API_USER_AGENT" => self.api.user_agent = Some(value.clone()),
                "CACHE_ENABLED" => {
                    self.cache.enabled = value.parse().map_err(|_| invalid())?;
                }
                "CACHE_DIRECTORY" => self.cache.directory = Some(PathBuf::from(value)),
                "CACHE_TTL_SECS" => {
                    self.cache.ttl_secs = value.parse().map_err(|_| invalid())?;
                }
                "RETRY_MAX_ATTEMPTS" => {
                    self.retry.max_attempts = value.parse().map_err(|_| invalid())?;
                }
                "RETRY_INITIAL_BACKOFF_MS" => {
                    self.retry.initial_backoff_ms = value.parse().map_err(|_| invalid())?;
                }
                "RETRY_MAX_BACKOFF_MS" => {
                    self.retry.max_backoff_ms = value.parse().map_err(|_| invalid())?;
                }
                "RETRY_RATE_LIMIT" => self.retry.rate_limit = value.to_lowercase(),
                "RETRY_RATE_LIMIT_WAIT_SECS" => {
                    self.retry.rate_limit_wait_secs = value.parse().map_err(|_| invalid())?;
                }
                "CONCURRENCY_MAX_IN_FLIGHT" => {
                    self.concurrency.max_in_flight = value.parse().map_err(|_| invalid())?;
                }
                _ => {} // Ignore unknown environment variables
            }
        }
        Ok(())
    }

    /// Apply global CLI flags (highest priority)
    pub fn apply_cli_args(&mut self, args: &Args) {
        if let Some(ref base_url) = args.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(ref cache_dir) = args.cache_dir {
            self.cache.directory = Some(cache_dir.clone());
        }
        if args.no_cache {
            self.cache.enabled = false;
        }
    }

    /// Load configuration with full precedence chain:
    /// 1. Default values (lowest)
    /// 2. User config (~/.config/grokipedia/config.toml)
    /// 3. Current directory (./grokipedia.toml)
    /// 4. Explicit `--config` file
    /// 5. Environment variables (GROKIPEDIA_*)
    /// 6. CLI arguments (highest)
    pub fn load_with_precedence(
        config_path: Option<&Path>,
        cli_args: &Args,
        env_vars: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_with_merged_configs();

        if let Some(path) = config_path {
            let explicit_layer =
                ConfigLayer::load_from_file(path).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })?;
            config.merge(&explicit_layer);
        }

        config.apply_env_vars(env_vars)?;
        config.apply_cli_args(cli_args);
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.as_str();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                value: base_url.to_string(),
                expected: "an http:// or https:// URL".to_string(),
            });
        }

        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidRange {
                field: "api.timeout_secs".to_string(),
                value: 0,
                valid_range: ">= 1".to_string(),
            });
        }

        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidRange {
                field: "cache.ttl_secs".to_string(),
                value: 0,
                valid_range: ">= 1".to_string(),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidRange {
                field: "retry.max_attempts".to_string(),
                value: 0,
                valid_range: ">= 1".to_string(),
            });
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::InvalidRange {
                field: "retry.initial_backoff_ms".to_string(),
                value: self.retry.initial_backoff_ms,
                valid_range: format!("<= retry.max_backoff_ms ({})", self.retry.max_backoff_ms),
            });
        }

        self.retry.to_rate_limit_policy()?;

        if self.concurrency.max_in_flight == 0 || self.concurrency.max_in_flight > 50 {
            return Err(ConfigError::InvalidRange {
                field: "concurrency.max_in_flight".to_string(),
                value: self.concurrency.max_in_flight as u64,
                valid_range: "1-50".to_string(),
            });
        }

        Ok(())
    }

    /// Settings for the async client
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        let mut client = ClientConfig::for_async()
            .with_base_url(self.api.base_url.as_str())
            .with_retry(self.retry.to_policy())
            .with_rate_limit(self.retry.to_rate_limit_policy()?)
            .with_max_in_flight(self.concurrency.max_in_flight);

        if let Some(secs) = self.api.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        if let Some(ref user_agent) = self.api.user_agent {
            client = client.with_user_agent(user_agent.as_str());
        }

        Ok(client)
    }
}
