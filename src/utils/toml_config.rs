//! TOML-based configuration for Aurum
//!
//! Settings live in `aurum.toml`. Every section and field has a default, so an
//! empty (or missing) file yields a working development setup. Secrets are never
//! written to the file itself; the file names the environment variables that
//! hold them.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! log_format = "json"
//!
//! [auth]
//! jwt_secret_env = "JWT_SIGNING_KEY"
//! secure_cookies = true
//!
//! [database]
//! url = "./data/aurum.db"
//!
//! [market]
//! assets_dir = "./assets"
//! instruments = ["gold", "silver"]
//! ```

use crate::auth::jwt::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};
use crate::db::DatabaseProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Secrets shorter than this are accepted but flagged.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Root configuration structure loaded from aurum.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AurumConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub market: MarketConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Default tracing filter; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            cors_origins: Vec::new(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the token signing secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Session token lifetime, also used as the cookie max-age
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Mark the session cookie `Secure` (HTTPS only)
    #[serde(default)]
    pub secure_cookies: bool,

    /// Argon2 memory cost in KiB
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,

    /// Argon2 iteration count
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
}

fn default_jwt_secret_env() -> String {
    "JWT_SIGNING_KEY".to_string()
}

fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL_SECS.unsigned_abs()
}

fn default_hash_memory_kib() -> u32 {
    19_456
}

fn default_hash_iterations() -> u32 {
    2
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_secs: default_token_ttl_secs(),
            secure_cookies: false,
            hash_memory_kib: default_hash_memory_kib(),
            hash_iterations: default_hash_iterations(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/aurum.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

// ============= Market Data Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Directory holding the `chart_<name>.csv` files
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    #[serde(default = "default_instruments")]
    pub instruments: Vec<String>,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("./assets")
}

fn default_instruments() -> Vec<String> {
    vec!["gold".to_string(), "silver".to_string()]
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            instruments: default_instruments(),
        }
    }
}

// ============= Errors and Warnings =============

/// Non-fatal configuration findings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarningKind {
    ShortSecret,
    InsecureCookies,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl AurumConfig {
    /// Load configuration from a TOML file. The result is not validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Like [`AurumConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::FileNotFound(path)) => {
                warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host must not be empty".to_string(),
            ));
        }
        let ttl = self.auth.token_ttl_secs;
        if ttl == 0 || ttl > MAX_TOKEN_TTL_SECS.unsigned_abs() {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_secs must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            )));
        }
        if self.market.instruments.is_empty() {
            return Err(ConfigError::ValidationError(
                "market.instruments must name at least one instrument".to_string(),
            ));
        }
        if self.database.turso_url_env.is_some() != self.database.turso_token_env.is_some() {
            return Err(ConfigError::ValidationError(
                "database.turso_url_env and database.turso_token_env must be set together"
                    .to_string(),
            ));
        }

        self.jwt_secret()?;
        Ok(())
    }

    /// Validate, then collect findings that do not stop the server
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();

        if self.jwt_secret()?.len() < RECOMMENDED_SECRET_LEN {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::ShortSecret,
                message: format!(
                    "Secret in '{}' is shorter than {} bytes",
                    self.auth.jwt_secret_env, RECOMMENDED_SECRET_LEN
                ),
            });
        }

        if !self.auth.secure_cookies {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::InsecureCookies,
                message: "auth.secure_cookies is off; session cookies will be sent over plain HTTP"
                    .to_string(),
            });
        }

        Ok(warnings)
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the token signing secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// Token lifetime, capped at [`MAX_TOKEN_TTL_SECS`] for configs that skipped validation
    pub fn token_ttl(&self) -> chrono::Duration {
        let secs = i64::try_from(self.auth.token_ttl_secs)
            .unwrap_or(MAX_TOKEN_TTL_SECS)
            .min(MAX_TOKEN_TTL_SECS);
        chrono::Duration::seconds(secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Pick the user store backend.
    ///
    /// Remote Turso is used when the `turso` feature is enabled and both
    /// referenced env vars are set; otherwise `database.url` decides.
    pub fn database_provider(&self) -> Result<DatabaseProvider, ConfigError> {
        match self.turso_provider()? {
            Some(provider) => Ok(provider),
            None => Ok(DatabaseProvider::from_url(&self.database.url)),
        }
    }

    #[cfg(feature = "turso")]
    fn turso_provider(&self) -> Result<Option<DatabaseProvider>, ConfigError> {
        let (Some(url_env), Some(token_env)) =
            (&self.database.turso_url_env, &self.database.turso_token_env)
        else {
            return Ok(None);
        };

        let url = self
            .resolve_env(url_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(url_env.clone()))?;
        let auth_token = self
            .resolve_env(token_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(token_env.clone()))?;
        Ok(Some(DatabaseProvider::Turso { url, auth_token }))
    }

    #[cfg(not(feature = "turso"))]
    fn turso_provider(&self) -> Result<Option<DatabaseProvider>, ConfigError> {
        if self.database.turso_url_env.is_some() {
            warn!("database.turso_url_env is set but the `turso` feature is disabled");
        }
        Ok(None)
    }
}
