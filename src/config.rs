use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub search: SearchConfig,

    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/atelier.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Session inactivity timeout in minutes (default: 60)
    pub session_timeout_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 4080,
            cors_allowed_origins: vec![
                "http://localhost:4080".to_string(),
                "http://127.0.0.1:4080".to_string(),
            ],
            secure_cookies: true,
            session_timeout_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How long a cached response may be served (default: 300 = 5 min)
    pub cache_ttl_seconds: u64,

    /// Maximum number of cached responses (default: 100)
    pub cache_capacity: usize,

    /// Results per collection when the request gives no limit (default: 5)
    pub default_limit: u64,

    /// Upper bound for a requested limit (default: 20)
    pub max_limit: u64,

    /// Shorter queries return an empty result without searching (default: 2)
    pub min_query_length: usize,

    /// Longer queries are cut to this many characters (default: 200)
    pub max_query_length: usize,

    /// Per-collection fetch deadline in milliseconds; 0 disables it (default: 3000)
    pub fetch_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 5 * 60,
            cache_capacity: 100,
            default_limit: 5,
            max_limit: 20,
            min_query_length: 2,
            max_query_length: 200,
            fetch_timeout_ms: 3000,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    #[must_use]
    pub const fn fetch_timeout(&self) -> Option<Duration> {
        if self.fetch_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.fetch_timeout_ms))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "atelier".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("atelier").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".atelier").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let search = &self.search;

        if search.cache_capacity == 0 {
            anyhow::bail!("search.cache_capacity must be > 0");
        }

        if search.cache_ttl_seconds == 0 {
            anyhow::bail!("search.cache_ttl_seconds must be > 0");
        }

        if search.default_limit == 0 || search.default_limit > search.max_limit {
            anyhow::bail!(
                "search.default_limit must be between 1 and search.max_limit ({})",
                search.max_limit
            );
        }

        if search.min_query_length > search.max_query_length {
            anyhow::bail!("search.min_query_length cannot exceed search.max_query_length");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed general.max_db_connections");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.cache_ttl_seconds, 300);
        assert_eq!(config.search.cache_capacity, 100);
        assert_eq!(config.search.default_limit, 5);
        assert_eq!(
            config.search.fetch_timeout(),
            Some(Duration::from_millis(3000))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[server]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [search]
            cache_capacity = 10
            fetch_timeout_ms = 0
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.search.cache_capacity, 10);
        assert_eq!(config.search.fetch_timeout(), None);

        assert_eq!(config.search.default_limit, 5);
        assert_eq!(config.server.port, 4080);
    }

    #[test]
    fn test_validate_rejects_bad_search_settings() {
        let mut config = Config::default();
        config.search.cache_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.default_limit = 50;
        assert!(config.validate().is_err());
    }
}
