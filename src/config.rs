//! Configuration file handling for carteira.
//!
//! The configuration file is stored at `$CARTEIRA_HOME/config.json` and
//! holds the coordinates of the hosted backend: its URL and the API key the
//! app authenticates with. The backend implementation receives the loaded
//! `Config` at construction time; nothing reads the environment after
//! startup.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "carteira";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$CARTEIRA_HOME` and from there
/// it loads and validates `$CARTEIRA_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and an initial `config.json` holding the
    /// given backend coordinates.
    ///
    /// # Errors
    /// - Returns an error if the coordinates are invalid or any file
    ///   operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        backend_url: &str,
        api_key: &str,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the carteira home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backend_url: backend_url.to_string(),
            api_key: api_key.to_string(),
        };
        config_file.validate()?;
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the carteira home and the config file exist
    /// - load the config file
    /// - validate the backend coordinates, failing startup when a required
    ///   field is missing or malformed
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Carteira home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'carteira init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backend_url(&self) -> &str {
        &self.config_file.backend_url
    }

    pub fn api_key(&self) -> &str {
        &self.config_file.api_key
    }
}

/// Represents the serialization and deserialization format of the
/// configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "carteira",
///   "config_version": 1,
///   "backend_url": "https://abcdefghijkl.supabase.co",
///   "api_key": "service-key-here"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "carteira"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the hosted backend service
    backend_url: String,

    /// API key used to authenticate every backend request
    api_key: String,
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if a
    /// required field is missing or malformed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Checks the required fields. Failing here is fatal at startup: the
    /// backend cannot be constructed from incomplete coordinates.
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            self.app_name
        );
        Url::parse(&self.backend_url)
            .with_context(|| format!("Invalid backend_url '{}'", self.backend_url))?;
        anyhow::ensure!(
            !self.api_key.trim().is_empty(),
            "The api_key in the config file is empty"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://abcdefghijkl.supabase.co";

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("carteira_home");

        let created = Config::create(&home, URL, "anon-key-123").await.unwrap();
        assert_eq!(created.backend_url(), URL);
        assert_eq!(created.api_key(), "anon-key-123");
        assert!(created.config_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.backend_url(), URL);
        assert_eq!(loaded.api_key(), "anon-key-123");
        assert_eq!(loaded.root(), created.root());
    }

    #[tokio::test]
    async fn test_load_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path()).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("The config file is missing"));
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nowhere")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_url() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path().join("home"), "not a url", "key").await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid backend_url"));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_api_key() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path().join("home"), URL, "   ").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("api_key"));
    }

    #[tokio::test]
    async fn test_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        tokio::fs::create_dir_all(&home).await.unwrap();
        let json = format!(
            r#"{{
                "app_name": "wrong_app",
                "config_version": 1,
                "backend_url": "{URL}",
                "api_key": "key"
            }}"#
        );
        tokio::fs::write(home.join("config.json"), json).await.unwrap();

        let result = Config::load(&home).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }
}
