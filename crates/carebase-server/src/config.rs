use carebase_auth::AuthConfig;
use carebase_db_postgres::PostgresConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Storage validation
        if self.storage.backend == StorageBackend::Postgres {
            let pg = &self.storage.postgres;
            if pg.url.is_none() && pg.host.is_empty() {
                return Err("storage.postgres requires either 'url' or 'host' to be set".into());
            }
            if pg.url.is_none() && pg.database.is_empty() {
                return Err("storage.postgres.database must not be empty".into());
            }
            if pg.pool_size == 0 {
                return Err("storage.postgres.pool_size must be > 0".into());
            }
        }
        // Auth validation
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024
}

/// Which storage backend serves the hospital, staff and patient directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local maps. Data is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub postgres: PostgresStorageConfig,
}

/// PostgreSQL connection settings.
///
/// Either `url` or the individual `host`/`port`/`user`/`password`/`database`
/// options may be given; `url` wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresStorageConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_postgres_host")]
    pub host: String,
    #[serde(default = "default_postgres_port")]
    pub port: u16,
    #[serde(default = "default_postgres_user")]
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_postgres_database")]
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub idle_timeout_ms: Option<u64>,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl PostgresStorageConfig {
    pub fn connection_url(&self) -> String {
        if let Some(ref url) = self.url {
            return url.clone();
        }

        let password_part = self
            .password
            .as_ref()
            .map(|p| format!(":{p}"))
            .unwrap_or_default();

        format!(
            "postgres://{}{}@{}:{}/{}",
            self.user, password_part, self.host, self.port, self.database
        )
    }

    /// Converts to the storage crate's pool configuration.
    pub fn to_postgres_config(&self) -> PostgresConfig {
        PostgresConfig {
            url: self.connection_url(),
            pool_size: self.pool_size,
            connect_timeout_ms: self.connect_timeout_ms,
            idle_timeout_ms: self.idle_timeout_ms,
            run_migrations: self.run_migrations,
            ..PostgresConfig::default()
        }
    }
}

impl Default for PostgresStorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_postgres_host(),
            port: default_postgres_port(),
            user: default_postgres_user(),
            password: None,
            database: default_postgres_database(),
            pool_size: default_pool_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            idle_timeout_ms: None,
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_user() -> String {
    "postgres".to_string()
}

fn default_postgres_database() -> String {
    "carebase".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_run_migrations() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
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

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file, looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "carebase.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., CAREBASE__AUTH__JWT_SECRET=...
        builder = builder.add_source(
            Environment::with_prefix("CAREBASE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn valid() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "0123456789abcdef0123456789abcdef".into();
        cfg
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.backend, StorageBackend::Postgres);
        assert_eq!(cfg.auth.token_lifetime, Duration::from_secs(24 * 60 * 60));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_default_requires_secret() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(err.contains("jwt_secret"), "{err}");
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = valid();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = valid();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().is_err());

        let mut cfg = valid();
        cfg.storage.postgres.pool_size = 0;
        assert!(cfg.validate().is_err());

        cfg.storage.backend = StorageBackend::Memory;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_connection_url() {
        let mut pg = PostgresStorageConfig {
            user: "care".into(),
            password: Some("secret".into()),
            host: "db".into(),
            port: 6543,
            database: "records".into(),
            ..Default::default()
        };
        assert_eq!(pg.connection_url(), "postgres://care:secret@db:6543/records");

        pg.url = Some("postgres://elsewhere/x".into());
        assert_eq!(pg.to_postgres_config().url, "postgres://elsewhere/x");
    }

    #[test]
    fn test_addr_falls_back_to_any() {
        let mut cfg = valid();
        cfg.server.host = "not-an-ip".into();
        cfg.server.port = 9000;
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:9000");
    }
}
