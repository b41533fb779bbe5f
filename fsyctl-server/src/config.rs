//! Configuration loading
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. TOML file (`--config PATH`, else `~/.fsyctl/config.toml` when present)
//! 3. Environment variables (`DATABASE_URL`, `JWT_SECRET`, `SEMAPHORE_API_KEY`, ...)
//!
//! CLI flags are applied on top by the binary.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::http::ServerConfig;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Full application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub sms: SmsConfig,
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: crate::db::pool::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC key for session tokens
    pub session_secret: Option<String>,
    /// Session token lifetime
    pub session_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: None,
            session_ttl_secs: 3600,
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub api_key: Option<String>,
    pub sender_name: Option<String>,
    pub base_url: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sender_name: None,
            base_url: crate::sms::SEMAPHORE_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("sender_name", &self.sender_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Units with fewer registrations than this are flagged
    pub low_registration_threshold: i64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            low_registration_threshold: 10,
        }
    }
}

impl AppConfig {
    /// Default config file location: ~/.fsyctl/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".fsyctl").join("config.toml"))
    }

    /// Load from file (explicit or default location) and the process environment.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("FSY_BIND") {
            self.server.bind_addr = v
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidValue { key: "FSY_BIND", value: v })?;
        }
        if let Some(v) = lookup("JWT_SECRET") {
            self.auth.session_secret = Some(v);
        }
        if let Some(v) = lookup("SESSION_TTL_SECS") {
            self.auth.session_ttl_secs = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SESSION_TTL_SECS",
                value: v,
            })?;
        }
        if let Some(v) = lookup("SEMAPHORE_API_KEY") {
            self.sms.api_key = Some(v);
        }
        if let Some(v) = lookup("SEMAPHORE_SENDER_NAME") {
            self.sms.sender_name = Some(v);
        }
        if let Some(v) = lookup("SEMAPHORE_BASE_URL") {
            self.sms.base_url = v;
        }
        if let Some(v) = lookup("LOW_REGISTRATION_THRESHOLD") {
            self.reports.low_registration_threshold =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "LOW_REGISTRATION_THRESHOLD",
                    value: v,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr.port(), 3030);
        assert_eq!(config.auth.session_ttl_secs, 3600);
        assert_eq!(config.reports.low_registration_threshold, 10);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            bind_addr = "0.0.0.0:8080"

            [reports]
            low_registration_threshold = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr.port(), 8080);
        assert!(!config.server.cors_permissive);
        assert_eq!(config.reports.low_registration_threshold, 3);
        assert_eq!(config.auth.session_ttl_secs, 3600);
    }

    #[test]
    fn env_overrides_file() {
        let mut config = AppConfig::from_toml("[database]\nurl = \"postgres://file/db\"").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://env/db"),
            ("JWT_SECRET", "0123456789abcdef0123"),
            ("LOW_REGISTRATION_THRESHOLD", "7"),
        ]);

        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database.url.as_deref(), Some("postgres://env/db"));
        assert_eq!(config.auth.session_secret.as_deref(), Some("0123456789abcdef0123"));
        assert_eq!(config.reports.low_registration_threshold, 7);
    }

    #[test]
    fn invalid_env_value_is_reported() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|k| (k == "SESSION_TTL_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "SESSION_TTL_SECS", .. }));
    }

    #[test]
    fn reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sms]\nsender_name = \"FSY2025\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sms.sender_name.as_deref(), Some("FSY2025"));
        assert_eq!(config.sms.base_url, crate::sms::SEMAPHORE_BASE_URL);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.auth.session_secret = Some("super-secret-value".into());
        config.sms.api_key = Some("semaphore-key".into());

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-value"));
        assert!(!rendered.contains("semaphore-key"));
    }
}
