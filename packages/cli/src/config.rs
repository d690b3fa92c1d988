use anyhow::Context;
use quire_client::HttpStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3030";

/// Quire configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the resource server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Per-request timeout; the HTTP client's default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn path(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_CONFIG_NAME)
    }

    /// Store for the configured server, or `server` when given
    pub fn store(&self, server: Option<&str>) -> anyhow::Result<HttpStore> {
        let url = server.unwrap_or(&self.server_url);
        let store = match self.timeout_secs {
            Some(secs) => HttpStore::with_timeout(url, Duration::from_secs(secs))?,
            None => HttpStore::new(url)?,
        };
        tracing::debug!(url, "using server");
        Ok(store)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "serverUrl": "http://docs.internal:8080",
            "timeoutSecs": 5
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.server_url, "http://docs.internal:8080");
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_server_flag_overrides_config() {
        let store = Config::default()
            .store(Some("http://example.com:9000"))
            .unwrap();
        assert_eq!(store.base_url().as_str(), "http://example.com:9000/");
    }
}
