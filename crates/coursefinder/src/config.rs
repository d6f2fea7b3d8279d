/// Server configuration, from an optional JSON file and environment overrides
use crate::error::{CourseFinderError, Result};
use crate::search::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// SQLite database file
    pub db_path: String,
    pub address: String,
    pub port: u16,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    /// Results per page
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: "coursefinder.sqlite3".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Loads a JSON config file; missing keys keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reads the process environment. See [`ServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup.
    ///
    /// `COURSEFINDER_CONFIG` names a JSON file to start from; then
    /// `COURSEFINDER_DB_PATH`, `COURSEFINDER_ADDRESS`, `COURSEFINDER_PORT`,
    /// `COURSEFINDER_LOG_LEVEL` and `COURSEFINDER_PAGE_SIZE` override single values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("COURSEFINDER_CONFIG") {
            Some(path) => Self::load_from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(db_path) = lookup("COURSEFINDER_DB_PATH") {
            config.db_path = db_path;
        }
        if let Some(address) = lookup("COURSEFINDER_ADDRESS") {
            config.address = address;
        }
        if let Some(port) = lookup("COURSEFINDER_PORT") {
            config.port = port.trim().parse().map_err(|_| {
                CourseFinderError::config(format!("COURSEFINDER_PORT is not a port: {port}"))
            })?;
        }
        if let Some(level) = lookup("COURSEFINDER_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(size) = lookup("COURSEFINDER_PAGE_SIZE") {
            config.page_size = size.trim().parse().map_err(|_| {
                CourseFinderError::config(format!("COURSEFINDER_PAGE_SIZE is not a number: {size}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.db_path.trim().is_empty() {
            return Err(CourseFinderError::config("Database path is empty"));
        }
        if self.page_size == 0 {
            return Err(CourseFinderError::config("Page size must be at least 1"));
        }
        self.level()?;
        self.socket_addr()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level.trim().parse().map_err(|_| {
            CourseFinderError::config(format!("Unknown log level: {}", self.log_level))
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.address.trim(), self.port)
            .parse()
            .map_err(|_| {
                CourseFinderError::config(format!("Invalid listen address: {}", self.address))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.level().unwrap(), Level::INFO);
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("COURSEFINDER_DB_PATH", "/tmp/courses.db"),
            ("COURSEFINDER_ADDRESS", "0.0.0.0"),
            ("COURSEFINDER_PORT", "9000"),
            ("COURSEFINDER_LOG_LEVEL", "debug"),
            ("COURSEFINDER_PAGE_SIZE", "25"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, "/tmp/courses.db");
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:9000");
        assert_eq!(config.level().unwrap(), Level::DEBUG);
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_invalid_values() {
        for vars in [
            [("COURSEFINDER_PORT", "eighty")],
            [("COURSEFINDER_LOG_LEVEL", "loud")],
            [("COURSEFINDER_PAGE_SIZE", "0")],
            [("COURSEFINDER_ADDRESS", "not an address")],
        ] {
            let err = ServerConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, CourseFinderError::Config { .. }), "{vars:?}: {err}");
        }
    }

    #[test]
    fn test_config_file_with_env_override() {
        let path = std::env::temp_dir().join(format!(
            "coursefinder-config-{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{"port": 7000, "page_size": 10}"#).unwrap();

        let config = ServerConfig::from_lookup(lookup(&[
            ("COURSEFINDER_CONFIG", path.to_str().unwrap()),
            ("COURSEFINDER_PORT", "7001"),
        ]))
        .unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.page_size, 10);
        assert_eq!(config.port, 7001);
        assert_eq!(config.db_path, "coursefinder.sqlite3");
    }

    #[test]
    fn test_missing_config_file() {
        let err = ServerConfig::from_lookup(lookup(&[(
            "COURSEFINDER_CONFIG",
            "/nonexistent/coursefinder.json",
        )]))
        .unwrap_err();
        assert!(matches!(err, CourseFinderError::Io(_)));
    }
}
