//! Server configuration: a TOML file, overridable from the command line

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tranzit_core::Time;
use tranzit_core::loading::DEFAULT_MAX_TRANSFER_TIME;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Missing required setting '{0}'")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub osm_path: Option<PathBuf>,
    pub gtfs_dirs: Vec<PathBuf>,
    pub date: Option<NaiveDate>,
    pub max_transfer_time: Time,
    /// Seconds before a request is answered with 408
    pub request_timeout_secs: u64,
    /// Requests processed at the same time, and queries allowed on the
    /// blocking pool; others wait
    pub concurrency_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            osm_path: None,
            gtfs_dirs: Vec::new(),
            date: None,
            max_transfer_time: DEFAULT_MAX_TRANSFER_TIME,
            request_timeout_secs: 60,
            concurrency_limit: 64,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Model inputs, once both the OSM extract and a GTFS feed are known
    pub fn model_config(&self) -> Result<tranzit_core::TransitModelConfig, ConfigError> {
        let osm_path = self.osm_path.clone().ok_or(ConfigError::Missing("osm_path"))?;
        if self.gtfs_dirs.is_empty() {
            return Err(ConfigError::Missing("gtfs_dirs"));
        }

        Ok(
            tranzit_core::TransitModelConfig::new(osm_path, self.gtfs_dirs.clone())
                .with_date(self.date)
                .with_max_transfer_time(self.max_transfer_time),
        )
    }
}
