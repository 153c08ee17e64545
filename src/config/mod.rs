use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://photoslibrary.googleapis.com/v1/mediaItems";

/// Largest page the mediaItems endpoint will return
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    pub cache_file: PathBuf,
    pub download_dir: PathBuf,
    pub credentials_file: PathBuf,
    pub token_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_file: PathBuf::from("output/data_masterFiles.json"),
            download_dir: PathBuf::from("downloads"),
            credentials_file: PathBuf::from("credentials.json"),
            token_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AccountsConfig {
    pub master: String,
    pub cleanup: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            master: "master".to_string(),
            cleanup: "cleanup".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub api: ApiConfig,
    pub accounts: AccountsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            anyhow::bail!(
                "api.page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                self.api.page_size
            );
        }
        Url::parse(&self.api.base_url)
            .with_context(|| format!("api.base_url is not a valid URL: {}", self.api.base_url))?;
        Ok(())
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }

    pub fn sync_config(&self) -> Result<SyncConfig> {
        Ok(SyncConfig {
            cache_file: self.paths.cache_file.clone(),
            download_dir: self.paths.download_dir.clone(),
            api_base: Url::parse(&self.api.base_url)
                .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?,
            page_size: self.api.page_size,
            master_account: self.accounts.master.clone(),
            cleanup_account: self.accounts.cleanup.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub cache_file: PathBuf,
    pub download_dir: PathBuf,
    pub api_base: Url,
    pub page_size: u32,
    pub master_account: String,
    pub cleanup_account: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
        assert_eq!(config.accounts.master, "master");
        assert_eq!(config.accounts.cleanup, "cleanup");
        assert_eq!(config.get_logging_format(), "pretty");
        assert_eq!(
            config.paths.cache_file,
            PathBuf::from("output/data_masterFiles.json")
        );
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = Config::from_toml(
            r#"
            [paths]
            download_dir = "/srv/photos"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.download_dir, PathBuf::from("/srv/photos"));
        assert_eq!(config.paths.credentials_file, PathBuf::from("credentials.json"));
        assert_eq!(config.get_logging_format(), "json");

        let sync = config.sync_config().unwrap();
        assert_eq!(sync.download_dir, PathBuf::from("/srv/photos"));
        assert_eq!(sync.page_size, 100);
        assert_eq!(sync.api_base.as_str(), DEFAULT_API_BASE);
    }

    #[test]
    fn test_page_size_out_of_range() {
        assert!(Config::from_toml("[api]\npage_size = 0").is_err());
        assert!(Config::from_toml("[api]\npage_size = 101").is_err());
        assert!(Config::from_toml("[api]\npage_size = 25").is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(Config::from_toml("[api]\nbase_url = \"not a url\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[accounts]\nmaster = \"main\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.accounts.master, "main");
        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }
}
