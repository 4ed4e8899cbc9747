use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{DirectoryError, Result};

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub search_debounce_ms: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| DirectoryError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        Self::parse(&contents).map_err(|e| DirectoryError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "userdir")
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(DirectoryError::NoConfigDir)
    }

    /// Get API base URL with env var taking precedence over config file
    pub fn api_url(&self) -> String {
        std::env::var("USERDIR_API_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Directory holding the local storage file
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os("USERDIR_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }

        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(DirectoryError::NoDataDir)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }
}
