//! Portal Configuration
//!
//! JSON settings file with defaults for every field. `XWORK_DATA_DIR` in the
//! environment overrides the data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::GridConfig;

/// Environment override for `data_dir`
pub const DATA_DIR_ENV: &str = "XWORK_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Root of every local file
    pub data_dir: PathBuf,
    /// Key-value store file, relative to `data_dir`
    pub store_file: String,
    /// Local relational database file, relative to `data_dir`
    pub remote_db_file: String,
    /// Log directory; relative paths resolve under `data_dir`
    pub log_dir: PathBuf,
    /// Log file stem
    pub app_name: String,
    pub grid: GridConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("xwork-data"),
            store_file: "store.db".to_string(),
            remote_db_file: "portal.db".to_string(),
            log_dir: PathBuf::from("logs"),
            app_name: "XWorkPortal".to_string(),
            grid: GridConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Read `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_file.trim().is_empty() {
            return Err(ConfigError::Invalid("store_file is empty".to_string()));
        }
        if self.remote_db_file.trim().is_empty() {
            return Err(ConfigError::Invalid("remote_db_file is empty".to_string()));
        }
        if self.store_file == self.remote_db_file {
            return Err(ConfigError::Invalid(
                "store_file and remote_db_file must differ".to_string(),
            ));
        }
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Invalid("app_name is empty".to_string()));
        }
        if self.grid.columns == 0 || self.grid.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have at least one column and row, got {}x{}",
                self.grid.columns, self.grid.rows
            )));
        }
        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }

    pub fn remote_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.remote_db_file)
    }

    pub fn log_path(&self) -> PathBuf {
        if self.log_dir.is_absolute() {
            self.log_dir.clone()
        } else {
            self.data_dir.join(&self.log_dir)
        }
    }
}
