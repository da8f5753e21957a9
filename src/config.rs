use std::path::Path;

use serde::Deserialize;

use crate::api::middleware::input_sanitization::{
    SanitizationConfig, MAX_CANVAS_BYTES, MAX_FIELD_BYTES,
};

const DEV_JWT_SECRET: &str = "roomielab-development-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub environment: Environment,
    /// `None` selects the in-memory document store
    pub database_url: Option<String>,
    // Database connection pool settings
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_idle_timeout_secs: u64,
    pub db_max_lifetime_secs: u64,
    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,
    pub password_reset_url: String,
    pub password_reset_ttl_secs: i64,
    /// Only consulted in production; development allows any origin
    pub allowed_origins: Vec<String>,
    pub max_field_bytes: usize,
    pub max_canvas_bytes: usize,
    pub max_body_bytes: usize,
    pub log_format: LogFormat,
}

/// Optional TOML overlay; every key mirrors a `Config` field
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub listen_addr: Option<String>,
    pub environment: Option<Environment>,
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_min_connections: Option<u32>,
    pub db_acquire_timeout_secs: Option<u64>,
    pub db_idle_timeout_secs: Option<u64>,
    pub db_max_lifetime_secs: Option<u64>,
    pub jwt_secret: Option<String>,
    pub jwt_ttl_secs: Option<i64>,
    pub password_reset_url: Option<String>,
    pub password_reset_ttl_secs: Option<i64>,
    pub allowed_origins: Option<Vec<String>>,
    pub max_field_bytes: Option<usize>,
    pub max_canvas_bytes: Option<usize>,
    pub max_body_bytes: Option<usize>,
    pub log_format: Option<LogFormat>,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            environment: Environment::Development,
            database_url: None,
            db_max_connections: 20,
            db_min_connections: 5,
            db_acquire_timeout_secs: 30,
            db_idle_timeout_secs: 600,
            db_max_lifetime_secs: 1800,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_secs: 3600,
            password_reset_url: "http://localhost:3000/reset-password".to_string(),
            password_reset_ttl_secs: 3600,
            allowed_origins: Vec::new(),
            max_field_bytes: MAX_FIELD_BYTES,
            max_canvas_bytes: MAX_CANVAS_BYTES,
            max_body_bytes: 1024 * 1024,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            environment: std::env::var("ENVIRONMENT")
                .ok()
                .and_then(|s| Environment::parse(&s))
                .unwrap_or(defaults.environment),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            db_min_connections: env_parse("DB_MIN_CONNECTIONS", defaults.db_min_connections),
            db_acquire_timeout_secs: env_parse(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.db_acquire_timeout_secs,
            ),
            db_idle_timeout_secs: env_parse("DB_IDLE_TIMEOUT_SECS", defaults.db_idle_timeout_secs),
            db_max_lifetime_secs: env_parse("DB_MAX_LIFETIME_SECS", defaults.db_max_lifetime_secs),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_ttl_secs: env_parse("JWT_TTL_SECS", defaults.jwt_ttl_secs),
            password_reset_url: std::env::var("PASSWORD_RESET_URL")
                .unwrap_or(defaults.password_reset_url),
            password_reset_ttl_secs: env_parse(
                "PASSWORD_RESET_TTL_SECS",
                defaults.password_reset_ttl_secs,
            ),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            max_field_bytes: env_parse("MAX_FIELD_BYTES", defaults.max_field_bytes),
            max_canvas_bytes: env_parse("MAX_CANVAS_BYTES", defaults.max_canvas_bytes),
            max_body_bytes: env_parse("MAX_BODY_BYTES", defaults.max_body_bytes),
            log_format: match std::env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => defaults.log_format,
            },
        }
    }

    /// Read a TOML file and apply it on top of `self`
    pub fn with_file(self, path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config file {}: {}", path.display(), e))?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|e| format!("Invalid config file {}: {}", path.display(), e))?;
        Ok(self.merge(file))
    }

    pub fn merge(mut self, file: ConfigFile) -> Self {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = file.$field { self.$field = value; })*
            };
        }
        overlay!(
            listen_addr,
            environment,
            db_max_connections,
            db_min_connections,
            db_acquire_timeout_secs,
            db_idle_timeout_secs,
            db_max_lifetime_secs,
            jwt_secret,
            jwt_ttl_secs,
            password_reset_url,
            password_reset_ttl_secs,
            allowed_origins,
            max_field_bytes,
            max_canvas_bytes,
            max_body_bytes,
            log_format,
        );
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        self
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    pub fn sanitization(&self) -> SanitizationConfig {
        SanitizationConfig::default()
            .with_production(self.is_production())
            .with_max_field_bytes(self.max_field_bytes)
            .with_max_canvas_bytes(self.max_canvas_bytes)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(
                    "DATABASE_URL must start with postgres:// or postgresql://".to_string(),
                );
            }
        }

        if self.listen_addr.is_empty() {
            return Err("LISTEN_ADDR cannot be empty".to_string());
        }

        if self.is_production() {
            if self.jwt_secret == DEV_JWT_SECRET {
                return Err("JWT_SECRET must be set in production".to_string());
            }
            if self.allowed_origins.is_empty() {
                return Err("ALLOWED_ORIGINS must list at least one origin in production".to_string());
            }
        }
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters".to_string());
        }

        if self.jwt_ttl_secs <= 0 || self.password_reset_ttl_secs <= 0 {
            return Err("Token lifetimes must be positive".to_string());
        }

        if self.max_field_bytes == 0 || self.max_canvas_bytes < self.max_field_bytes {
            return Err("MAX_CANVAS_BYTES must be at least MAX_FIELD_BYTES".to_string());
        }

        if self.max_body_bytes < self.max_canvas_bytes {
            return Err("MAX_BODY_BYTES must be at least MAX_CANVAS_BYTES".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret_and_origins() {
        let mut config = Config {
            environment: Environment::Production,
            ..Config::default()
        };
        assert!(config.validate().unwrap_err().contains("JWT_SECRET"));

        config.jwt_secret = "a".repeat(48);
        assert!(config.validate().unwrap_err().contains("ALLOWED_ORIGINS"));

        config.allowed_origins = vec!["https://app.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let config = Config {
            database_url: Some("mysql://localhost/db".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_canvas_cap_must_cover_field_cap() {
        let config = Config {
            max_canvas_bytes: 1024,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_overlay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
listen_addr = "127.0.0.1:9000"
environment = "production"
allowed_origins = ["https://app.example.com"]
max_canvas_bytes = 256000
"#
        )
        .unwrap();

        let config = Config::default().with_file(file.path()).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert!(config.is_production());
        assert_eq!(config.allowed_origins.len(), 1);
        assert_eq!(config.max_canvas_bytes, 256000);
        assert_eq!(config.max_field_bytes, MAX_FIELD_BYTES);
    }

    #[test]
    fn test_unknown_toml_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gc_interval_secs = 10").unwrap();
        assert!(Config::default().with_file(file.path()).is_err());
    }

    #[test]
    fn test_sanitization_follows_environment() {
        let config = Config {
            environment: Environment::Production,
            max_canvas_bytes: 600 * 1024,
            ..Config::default()
        };
        let sanitization = config.sanitization();
        assert!(sanitization.production);
        assert_eq!(sanitization.max_canvas_bytes, 600 * 1024);
    }
}
