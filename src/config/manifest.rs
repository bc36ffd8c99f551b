use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "sealpost.toml";

/// Configuration from `sealpost.toml`. Every field is optional; CLI flags win.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub directory: DirectoryConfig,
    pub session: SessionConfig,
    pub server: ServerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub person_id: Option<String>,
    pub session_id: Option<String>,
    /// The author's email address.
    pub author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
    /// Path to the directory registry TOML.
    pub registry: Option<String>,
}

impl Config {
    /// Load the given config file, or `sealpost.toml` in the current directory.
    /// Returns the default config if the file doesn't exist.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = std::path::PathBuf::from(config_path.unwrap_or(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            if config_path.is_some() {
                anyhow::bail!("config file '{}' not found", path.display());
            }
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn directory_timeout(&self) -> Duration {
        self.directory
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(crate::directory::http::DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_explicit_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sealpost.toml");
        let config = Config::load(Some(path.to_str().unwrap()));
        assert!(config.is_err());
    }

    #[test]
    fn parses_all_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sealpost.toml");
        std::fs::write(
            &path,
            r#"
[directory]
url = "https://keys.example.com"
timeout_secs = 5

[session]
person_id = "p-1"
session_id = "s-1"
author = "me@example.com"

[server]
port = 8080
registry = "registry.toml"
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(
            config.directory.url.as_deref(),
            Some("https://keys.example.com")
        );
        assert_eq!(config.directory_timeout(), Duration::from_secs(5));
        assert_eq!(config.session.author.as_deref(), Some("me@example.com"));
        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.server.bind, None);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sealpost.toml");
        std::fs::write(&path, "[session]\nauthor = \"me@example.com\"\n").unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert!(config.directory.url.is_none());
        assert_eq!(
            config.directory_timeout(),
            crate::directory::http::DEFAULT_TIMEOUT
        );
    }
}
