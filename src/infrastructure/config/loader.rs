use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid server port: {0}")]
    InvalidPort(u16),

    #[error("Invalid request_timeout_secs: {0}. Must be at least 1")]
    InvalidRequestTimeout(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .tally/config.yaml (project config, created by init)
    /// 3. .tally/local.yaml (local overrides, optional)
    /// 4. Environment variables (TALLY_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("TALLY_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".tally/config.yaml"))
            .merge(Yaml::file(".tally/local.yaml"))
            .merge(Env::prefixed("TALLY_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort(config.server.port));
        }

        if config.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("server host cannot be empty".to_string()));
        }

        if config.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidRequestTimeout(config.server.request_timeout_secs));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{DatabaseConfig, LoggingConfig, ServerConfig};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, ".tally/tally.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 9200);
        assert!(!config.reports.allow_ungrouped);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
database:
  path: /custom/path.db
  max_connections: 5
logging:
  level: debug
  format: json
  retention_days: 7
server:
  port: 8080
  request_timeout_secs: 10
reports:
  allow_ungrouped: true
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.retention_days, 7);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.request_timeout_secs, 10);
        assert!(config.reports.allow_ungrouped);
        assert!(!config.reports.expose_error_details);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = Config {
            logging: LoggingConfig { level: "loud".to_string(), ..LoggingConfig::default() },
            ..Default::default()
        };
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidLogLevel(l)) if l == "loud"));
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let config = Config {
            logging: LoggingConfig { format: "xml".to_string(), ..LoggingConfig::default() },
            ..Default::default()
        };
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidLogFormat(_))));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let config = Config {
            database: DatabaseConfig { path: String::new(), max_connections: 10 },
            ..Default::default()
        };
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::EmptyDatabasePath)));
    }

    #[test]
    fn test_validate_zero_max_connections() {
        let config = Config {
            database: DatabaseConfig { max_connections: 0, ..DatabaseConfig::default() },
            ..Default::default()
        };
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidMaxConnections(0))));
    }

    #[test]
    fn test_validate_server_settings() {
        let config = Config {
            server: ServerConfig { port: 0, ..ServerConfig::default() },
            ..Default::default()
        };
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidPort(0))));

        let config = Config {
            server: ServerConfig { request_timeout_secs: 0, ..ServerConfig::default() },
            ..Default::default()
        };
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidRequestTimeout(0))));
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(base_file, "server:\n  port: 9300\nlogging:\n  level: info\n  format: json").unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "server:\n  port: 9400\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.server.port, 9400, "Override should win");
        assert_eq!(config.logging.level, "debug", "Override should win for nested fields");
        assert_eq!(config.logging.format, "json", "Base value should persist when not overridden");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  request_timeout_secs: 0").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
    }
}
