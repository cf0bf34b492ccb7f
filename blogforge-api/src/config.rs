/// Configuration management for the API server
///
/// Sources are layered, later ones overriding earlier ones:
///
/// 1. Built-in defaults
/// 2. `config/default.{toml,yaml,json}` (optional)
/// 3. `config/local.{toml,yaml,json}` (optional)
/// 4. Environment variables prefixed `BLOGFORGE__`, with `__` between
///    section and key, e.g. `BLOGFORGE__DATABASE__URL`
///
/// A `.env` file in the working directory is loaded into the environment
/// first.
///
/// # Example
///
/// ```no_run
/// use blogforge_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use blogforge_shared::{
    auth::jwt::JwtConfig, db::pool::DatabaseConfig, redis::RedisConfig, upload::UploadConfig,
};
use serde::Deserialize;

/// Minimum JWT secret length in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtSettings,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Base of the public URLs handed out for uploaded files
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Token signing settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub access_ttl_hours: i64,
    pub refresh_ttl_hours: i64,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_ttl_hours: 24,
            refresh_ttl_hours: 168,
        }
    }
}

impl JwtSettings {
    pub fn token_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.secret.clone(),
            access_ttl: chrono::Duration::hours(self.access_ttl_hours),
            refresh_ttl: chrono::Duration::hours(self.refresh_ttl_hours),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human-readable format
    pub json: bool,
}

impl Config {
    /// Loads and validates configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if a source can't be parsed or the result fails
    /// [`Config::validate`].
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let config: Config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("BLOGFORGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("upload.allowed_exts"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values that have no usable default
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("database.url is required (BLOGFORGE__DATABASE__URL)");
        }

        if self.jwt.secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "jwt.secret must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            );
        }

        if self.jwt.access_ttl_hours <= 0 || self.jwt.refresh_ttl_hours <= 0 {
            anyhow::bail!("jwt token lifetimes must be positive");
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.database.url = "postgresql://localhost/test".to_string();
        config.jwt.secret = "test-secret-key-at-least-32-bytes-long".to_string();
        config
    }

    #[test]
    fn test_bind_address() {
        let mut config = valid();
        config.server.host = "127.0.0.1".to_string();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.jwt.access_ttl_hours, 24);
        assert_eq!(config.jwt.refresh_ttl_hours, 168);
        assert_eq!(config.upload.max_size_mb, 10);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let mut short_secret = valid();
        short_secret.jwt.secret = "too-short".to_string();
        assert!(short_secret.validate().is_err());

        let mut no_db = valid();
        no_db.database.url.clear();
        assert!(no_db.validate().is_err());
    }

    #[test]
    fn test_token_config() {
        let mut config = valid();
        config.jwt.access_ttl_hours = 2;

        let tokens = config.jwt.token_config();
        assert_eq!(tokens.access_ttl, chrono::Duration::hours(2));
        assert_eq!(tokens.refresh_ttl, chrono::Duration::hours(168));
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "server": { "port": 9000 },
            "jwt": { "secret": "x" }
        }))
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.jwt.access_ttl_hours, 24);
    }
}
