//! Configuration management for paysec
//!
//! This module handles loading, validation, and management of
//! paysec configuration from YAML files and the process environment.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deployment environment, controls HTTPS enforcement
    #[serde(default)]
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Token and credential settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Argon2 memory cost in KiB
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2 iteration count
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
        }
    }
}

/// Upper bound on `auth.token_ttl_secs` (one year)
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

fn default_token_ttl() -> u64 {
    3600
}

fn default_hash_memory() -> u32 {
    19 * 1024
}

fn default_hash_iterations() -> u32 {
    2
}

/// Request rate limiting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests allowed per window and client
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    15 * 60
}

/// What to do when the reference data source cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePolicy {
    /// Abort startup
    Fail,
    /// Serve the compiled-in reference set
    Builtin,
}

impl Default for LoadFailurePolicy {
    fn default() -> Self {
        LoadFailurePolicy::Builtin
    }
}

impl std::str::FromStr for LoadFailurePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(LoadFailurePolicy::Fail),
            "builtin" => Ok(LoadFailurePolicy::Builtin),
            _ => Err(format!("Invalid load failure policy: {}", s)),
        }
    }
}

/// Reference data (currencies and payment providers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// YAML file mapping currency code to display name
    #[serde(default)]
    pub currencies_file: Option<PathBuf>,
    /// Accepted payment providers
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    #[serde(default)]
    pub on_load_failure: LoadFailurePolicy,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            currencies_file: None,
            providers: default_providers(),
            on_load_failure: LoadFailurePolicy::default(),
        }
    }
}

fn default_providers() -> Vec<String> {
    vec![
        "SWIFT".to_string(),
        "PayPal".to_string(),
        "Bank Transfer".to_string(),
    ]
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Token and credential settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Reference data sources
    #[serde(default)]
    pub reference: ReferenceConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file, apply environment overrides and validate
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| {
            log::debug!("yaml parse failure: {}", e);
            ConfigError::InvalidYaml
        })
    }

    /// Overlay values from the environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a closure.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("PAYSEC_JWT_SECRET").or_else(|| lookup("JWT_SECRET")) {
            self.auth.jwt_secret = secret;
        }

        if let Some(port) = lookup("PAYSEC_PORT").or_else(|| lookup("PORT")) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: format!("'{}' is not a valid port", port),
            })?;
        }

        if let Some(env) = lookup("PAYSEC_ENVIRONMENT").or_else(|| lookup("NODE_ENV")) {
            self.server.environment = env
                .parse()
                .map_err(|reason| ConfigError::InvalidValue {
                    field: "server.environment".to_string(),
                    reason,
                })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "auth.jwt_secret".to_string(),
            });
        }

        if self.auth.token_ttl_secs == 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "auth.token_ttl_secs".to_string(),
                reason: format!("Token lifetime must be between 1 and {} seconds", MAX_TOKEN_TTL_SECS),
            });
        }

        if self.auth.hash_iterations == 0 || self.auth.hash_memory_kib < 8 {
            return Err(ConfigError::InvalidValue {
                field: "auth.hash_memory_kib".to_string(),
                reason: "Argon2 needs at least 8 KiB and one iteration".to_string(),
            });
        }

        if self.rate_limit.enabled && (self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0) {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit".to_string(),
                reason: "max_requests and window_secs must be greater than 0".to_string(),
            });
        }

        if self.reference.providers.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                message: "reference.providers contains an empty name".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether plaintext requests must be redirected to HTTPS
    pub fn enforce_https(&self) -> bool {
        self.server.environment == Environment::Production
    }
}
