//! Configuration file handling.
//!
//! The configuration file is stored at `$EARNINGS_HOME/config.json` and holds the backend URL,
//! snapshot retention, the default page size and the location of the API token.

use crate::snapshot::SnapshotStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "earnings";
const CONFIG_VERSION: u8 = 1;
const SNAPSHOT_COPIES: u32 = 5;
const PAGE_SIZE: usize = 25;
const SECRETS: &str = ".secrets";
const SNAPSHOTS: &str = ".snapshots";
const TOKEN_TXT: &str = "token.txt";
const CONFIG_JSON: &str = "config.json";

/// The configuration of the app. You instantiate it by providing the path to `$EARNINGS_HOME` and
/// from there it loads `$EARNINGS_HOME/config.json`. It provides paths to other items that are
/// either configurable or are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    snapshots: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json` pointing at
    /// `api_url`.
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not a valid URL or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Result<Self> {
        let api_url = parse_api_url(api_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the earnings home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let snapshots = root.join(SNAPSHOTS);
        utils::make_dir(&snapshots).await?;
        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            api_url: api_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            snapshots,
            secrets,
            config_path,
            config_file,
            api_url,
        })
    }

    /// Validates that the home directory and its config file exist, loads the config file and
    /// validates that the snapshots and secrets directories exist.
    pub async fn load(earnings_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = earnings_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The earnings home directory is missing, run `earnings init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)?;

        let config = Self {
            root: root.clone(),
            snapshots: root.join(SNAPSHOTS),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
            api_url,
        };
        if !config.snapshots.is_dir() {
            bail!(
                "The snapshots directory is missing '{}'",
                config.snapshots.display()
            )
        }
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn snapshots(&self) -> &Path {
        &self.snapshots
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn snapshot_copies(&self) -> u32 {
        self.config_file.snapshot_copies
    }

    pub fn page_size(&self) -> usize {
        self.config_file.page_size
    }

    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(self)
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves it against the home
    /// directory.
    pub fn token_path(&self) -> PathBuf {
        let p = self.config_file.token_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

fn parse_api_url(s: &str) -> Result<Url> {
    let url = Url::parse(s).with_context(|| format!("Invalid API URL '{s}'"))?;
    if url.cannot_be_a_base() {
        bail!("The API URL '{s}' must be an http(s) URL");
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "earnings",
///   "config_version": 1,
///   "api_url": "https://api.localsites.example/v1",
///   "snapshot_copies": 5,
///   "page_size": 25,
///   "token_path": ".secrets/token.txt"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "earnings"
    app_name: String,

    config_version: u8,

    /// Base URL of the backend REST API
    api_url: String,

    /// Number of snapshot files to keep
    #[serde(default = "default_snapshot_copies")]
    snapshot_copies: u32,

    /// Rows per page when a command is not given `--page-size`
    #[serde(default = "default_page_size")]
    page_size: usize,

    /// Path to the API token file (optional, relative to the home directory or absolute)
    /// Defaults to $EARNINGS_HOME/.secrets/token.txt if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_snapshot_copies() -> u32 {
    SNAPSHOT_COPIES
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: String::new(),
            snapshot_copies: SNAPSHOT_COPIES,
            page_size: PAGE_SIZE,
            token_path: None,
        }
    }
}

impl ConfigFile {
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path.as_ref()).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.snapshot_copies >= 1,
            "Invalid snapshot_copies in config file: must be at least 1, got {}",
            config.snapshot_copies
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_TXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://api.localsites.example/v1";

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("earnings_home");
        let created = Config::create(&home, URL).await.unwrap();
        assert!(created.snapshots().is_dir());
        assert!(created.secrets().is_dir());
        assert!(created.config_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.api_url().as_str(), URL);
        assert_eq!(loaded.snapshot_copies(), 5);
        assert_eq!(loaded.page_size(), 25);
        assert_eq!(
            loaded.token_path(),
            loaded.root().join(".secrets").join("token.txt")
        );
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let err = Config::create(dir.path(), "not a url").await.unwrap_err();
        assert!(err.to_string().contains("Invalid API URL"));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_snapshots_dir() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), URL).await.unwrap();
        tokio::fs::remove_dir(config.snapshots()).await.unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("snapshots directory is missing"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "earnings",
            "config_version": 1,
            "api_url": "http://localhost:8080"
        }"#;
        utils::write(&path, json).await.unwrap();

        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config.snapshot_copies, SNAPSHOT_COPIES);
        assert_eq!(config.page_size, PAGE_SIZE);
        assert_eq!(config.token_path(), PathBuf::from(SECRETS).join(TOKEN_TXT));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{"app_name": "ledger", "config_version": 1, "api_url": "http://x"}"#;
        utils::write(&path, json).await.unwrap();

        let err = ConfigFile::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_zero_snapshot_copies() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "earnings",
            "config_version": 1,
            "api_url": "http://localhost:8080",
            "snapshot_copies": 0
        }"#;
        utils::write(&path, json).await.unwrap();

        let err = ConfigFile::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("snapshot_copies"));
    }

    #[tokio::test]
    async fn test_absolute_token_path_is_kept() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), URL).await.unwrap();
        let mut file = config.config_file.clone();
        file.token_path = Some(PathBuf::from("/etc/earnings/token"));
        file.save(config.config_path()).await.unwrap();

        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.token_path(), PathBuf::from("/etc/earnings/token"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("token_path"));
    }
}
