// src/core/config_loader.rs

//! # Config Loader
//!
//! Reads `shroute.toml`. Shape errors (for example an `sh` that is neither a string nor a
//! list of strings) are reported here, before any command runs.

use crate::models::ProjectConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from [`load_project_config`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Could not read config file '{path}': {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid task file.
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// TOML or shape error.
        #[source]
        source: toml::de::Error,
    },
}

/// Loads and parses the project config at `path`.
pub fn load_project_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_project_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(
        "Loaded {} task(s) from '{}'.",
        config.tasks.len(),
        path.display()
    );
    Ok(config)
}

/// Parses task file text.
pub fn parse_project_config(content: &str) -> Result<ProjectConfig, toml::de::Error> {
    toml::from_str(content)
}
