//! Configuration resolution for `LetsMeet`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Settings file (JSON, optional)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ident::{DEFAULT_SEED, MAX_WORD_COUNT};

/// Upper bound for either token lifetime (ten years).
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Complete `LetsMeet` configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub identifiers: IdentifierConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Token and password hashing configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Signing secret for access tokens.
    pub access_token_secret: Option<String>,
    /// Signing secret for refresh tokens. Must differ from the access secret.
    pub refresh_token_secret: Option<String>,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    /// Argon2 time cost (iterations).
    pub hash_cost: u32,
    pub hash_memory_kib: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: None,
            refresh_token_secret: None,
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60, // 7 days
            hash_cost: 12,
            hash_memory_kib: 19 * 1024,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &Option<String>| s.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthConfig")
            .field("access_token_secret", &redact(&self.access_token_secret))
            .field("refresh_token_secret", &redact(&self.refresh_token_secret))
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("hash_cost", &self.hash_cost)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .finish()
    }
}

/// Public identifier generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    /// Words in a freshly generated identifier.
    pub word_count: u32,
    /// Generation attempts before event creation gives up.
    pub max_attempts: u32,
    pub seed: u64,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            word_count: 3,
            max_attempts: 5,
            seed: DEFAULT_SEED,
        }
    }
}

/// Process-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Check invariants that defaults alone cannot guarantee.
    pub fn validate(&self) -> Result<()> {
        let access = self.auth.access_token_secret.as_deref().unwrap_or_default();
        let refresh = self.auth.refresh_token_secret.as_deref().unwrap_or_default();
        if access.is_empty() || refresh.is_empty() {
            return Err(Error::Config(
                "access and refresh token secrets must both be set".into(),
            ));
        }
        if access == refresh {
            return Err(Error::Config(
                "access and refresh token secrets must differ".into(),
            ));
        }
        for ttl in [self.auth.access_token_ttl_secs, self.auth.refresh_token_ttl_secs] {
            if !(1..=MAX_TOKEN_TTL_SECS).contains(&ttl) {
                return Err(Error::Config(format!(
                    "token lifetimes must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"
                )));
            }
        }
        if self.auth.hash_cost == 0 {
            return Err(Error::Config("hash cost must be at least 1".into()));
        }
        if self.identifiers.word_count == 0 || self.identifiers.max_attempts == 0 {
            return Err(Error::Config(
                "identifier word count and attempts must be at least 1".into(),
            ));
        }
        // The last retry asks for `word_count + max_attempts - 1` words.
        let longest = self
            .identifiers
            .word_count
            .saturating_add(self.identifiers.max_attempts - 1);
        if longest > MAX_WORD_COUNT {
            return Err(Error::Config(format!(
                "identifier word count plus retries must not exceed {MAX_WORD_COUNT} words"
            )));
        }
        Ok(())
    }

    /// Database path, falling back to the per-user default location.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.server.database_path.clone().or_else(default_database_path)
    }
}

/// Load configuration with hierarchical resolution from the process
/// environment.
pub fn load_config(settings_path: Option<&Path>) -> Result<Config> {
    load_config_with(settings_path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], reading environment variables through `env`.
pub fn load_config_with<F>(settings_path: Option<&Path>, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match settings_path {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config, env)?;
    Ok(config)
}

/// Default database location (`<config dir>/letsmeet/letsmeet.db`).
pub fn default_database_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("letsmeet").join("letsmeet.db"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{key} has invalid value {value:?}")))
}

fn apply_env_overrides<F>(config: &mut Config, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = env("LETSMEET_ACCESS_TOKEN_SECRET") {
        config.auth.access_token_secret = Some(val);
    }
    if let Some(val) = env("LETSMEET_REFRESH_TOKEN_SECRET") {
        config.auth.refresh_token_secret = Some(val);
    }
    if let Some(val) = env("LETSMEET_ACCESS_TOKEN_TTL") {
        config.auth.access_token_ttl_secs = parse_var("LETSMEET_ACCESS_TOKEN_TTL", &val)?;
    }
    if let Some(val) = env("LETSMEET_REFRESH_TOKEN_TTL") {
        config.auth.refresh_token_ttl_secs = parse_var("LETSMEET_REFRESH_TOKEN_TTL", &val)?;
    }
    if let Some(val) = env("LETSMEET_HASH_COST") {
        config.auth.hash_cost = parse_var("LETSMEET_HASH_COST", &val)?;
    }
    if let Some(val) = env("LETSMEET_WORD_COUNT") {
        config.identifiers.word_count = parse_var("LETSMEET_WORD_COUNT", &val)?;
    }
    if let Some(val) = env("LETSMEET_MAX_ID_ATTEMPTS") {
        config.identifiers.max_attempts = parse_var("LETSMEET_MAX_ID_ATTEMPTS", &val)?;
    }
    if let Some(val) = env("LETSMEET_DB_PATH") {
        config.server.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = env("LETSMEET_LOG_LEVEL") {
        config.server.log_level = val;
    }
    Ok(())
}
