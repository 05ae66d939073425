//! Configuration management for the finance tracker.
//!
//! Configuration is loaded with figment from defaults, an optional TOML file
//! and environment variables.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name, looked up in the working directory.
const CONFIG_FILE_NAME: &str = "finance-tracker.toml";

/// Prefix for environment overrides, e.g. `FINANCE_TRACKER_SERVER__PORT`.
const ENV_PREFIX: &str = "FINANCE_TRACKER_";

/// Secret used when nothing else is configured. Fine for local development only.
const DEFAULT_JWT_SECRET: &str = "change-this-development-secret";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. `DATABASE_URL` and `SECRET_KEY`
/// 2. Environment variables prefixed with `FINANCE_TRACKER_`
/// 3. TOML config file
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    pub url: String,
    pub max_connections: u32,
}

/// Token configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: String,
    /// Lifetime of an access token in seconds.
    pub token_ttl_seconds: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://instance/tracker.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_seconds: 3600,
        }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "database.url".into()),
            )
            .merge(
                Env::raw()
                    .only(&["SECRET_KEY"])
                    .map(|_| "auth.jwt_secret".into()),
            );

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port must be greater than 0"));
        }

        if self.server.cors_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(invalid("server.cors_origins must not contain empty entries"));
        }

        if !self.database.url.starts_with("sqlite:") {
            return Err(invalid(format!(
                "database.url must be a sqlite URL, got '{}'",
                self.database.url
            )));
        }

        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections must be greater than 0"));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(invalid("auth.jwt_secret must not be empty"));
        }

        if self.auth.token_ttl_seconds == 0 {
            return Err(invalid("auth.token_ttl_seconds must be greater than 0"));
        }

        Ok(())
    }

    /// The `host:port` pair the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether the built-in development secret is still in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.auth.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.database.url, "sqlite://instance/tracker.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.token_ttl_seconds, 3600);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.port"));
    }

    #[test]
    fn test_validate_non_sqlite_url() {
        let mut config = Config::default();
        config.database.url = "postgres://localhost/finance".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("sqlite"));
    }

    #[test]
    fn test_validate_zero_connections() {
        let mut config = Config::default();
        config.database.max_connections = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_connections"));
    }

    #[test]
    fn test_validate_empty_secret() {
        let mut config = Config::default();
        config.auth.jwt_secret = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("jwt_secret"));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut config = Config::default();
        config.auth.token_ttl_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_cors_origin() {
        let mut config = Config::default();
        config.server.cors_origins.push("  ".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("cors_origins"));
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_auth_config_debug_hides_secret() {
        let auth = AuthConfig {
            jwt_secret: "super-secret".to_string(),
            token_ttl_seconds: 60,
        };
        let debug = format!("{auth:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [server]
                port = 8081

                [auth]
                token_ttl_seconds = 120
                "#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("custom.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 8081);
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.auth.token_ttl_seconds, 120);
            Ok(())
        });
    }

    #[test]
    fn test_load_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "[server]\nport = 8081\n")?;
            jail.set_env("FINANCE_TRACKER_SERVER__PORT", "9000");
            jail.set_env("DATABASE_URL", "sqlite://other.db");
            jail.set_env("SECRET_KEY", "from-env");

            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 9000);
            assert_eq!(config.database.url, "sqlite://other.db");
            assert_eq!(config.auth.jwt_secret, "from-env");
            assert!(!config.uses_default_secret());
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.set_env("FINANCE_TRACKER_DATABASE__MAX_CONNECTIONS", "0");

            let result = Config::load();
            assert!(result.is_err());
            Ok(())
        });
    }
}
