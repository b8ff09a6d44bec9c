// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{AppConfig, ConfigError, default_config_yaml};
use crate::runtime_paths::{CONFIG_FILE_NAME, RuntimePaths};
use std::error::Error;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Empty YAML map; the seed content for fresh data files.
const EMPTY_DATA_FILE: &str = "{}\n";

#[derive(Debug)]
pub struct BootstrapResult {
    pub config: AppConfig,
    pub runtime_paths: RuntimePaths,
    pub created_config: bool,
}

#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Io(io::Error),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(err) => write!(f, "{}", err),
            BootstrapError::Io(err) => write!(f, "Bootstrap I/O error: {}", err),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BootstrapError::Config(err) => Some(err),
            BootstrapError::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<io::Error> for BootstrapError {
    fn from(err: io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

/// Prepare the runtime root for startup: create it when missing, write a
/// default config on first run, load and validate the config, then make
/// sure the data files and the document storage directory exist.
pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, BootstrapError> {
    let root_path = normalize_root(root)?;

    let created_config = ensure_config(&root_path)?;

    let config = AppConfig::load(&root_path.join(CONFIG_FILE_NAME))?;
    let runtime_paths = RuntimePaths::resolve(&root_path, &config);

    ensure_data_file(&runtime_paths.principals_file)?;
    ensure_data_file(&runtime_paths.customers_file)?;
    ensure_storage_root(&runtime_paths.storage_root)?;

    Ok(BootstrapResult {
        config,
        runtime_paths,
        created_config,
    })
}

fn normalize_root(root: &Path) -> Result<PathBuf, BootstrapError> {
    let root_path = if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root.to_path_buf()
    };

    if root_path.exists() {
        if !root_path.is_dir() {
            return Err(BootstrapError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Runtime root is not a directory: {}", root_path.display()),
            )));
        }
        return Ok(root_path);
    }

    fs::create_dir_all(&root_path)?;
    log_action(format!(
        "created runtime root directory {}",
        root_path.display()
    ));
    Ok(root_path)
}

fn ensure_config(root: &Path) -> Result<bool, BootstrapError> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        return Ok(false);
    }

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(default_config_yaml().as_bytes())?;
    file.sync_all()?;

    log_action(format!("created {} with defaults", CONFIG_FILE_NAME));
    Ok(true)
}

fn ensure_data_file(path: &Path) -> Result<(), BootstrapError> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(()),
        Err(err) => return Err(BootstrapError::Io(err)),
    };
    file.write_all(EMPTY_DATA_FILE.as_bytes())?;
    file.sync_all()?;

    log_action(format!("created empty data file {}", path.display()));
    Ok(())
}

fn ensure_storage_root(path: &Path) -> Result<(), BootstrapError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(BootstrapError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Document storage path is not a directory: {}", path.display()),
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(path)?;
    log_action(format!(
        "created document storage directory {}",
        path.display()
    ));
    Ok(())
}

fn log_action(message: impl AsRef<str>) {
    eprintln!("[bootstrap] {}", message.as_ref());
}
