// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default = "default_remember_me_ttl_seconds")]
    pub remember_me_ttl_seconds: u64,
}

fn default_session_ttl_seconds() -> u64 {
    3600
}

fn default_remember_me_ttl_seconds() -> u64 {
    60 * 60 * 24
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl_seconds(),
            remember_me_ttl_seconds: default_remember_me_ttl_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Argon2Params {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

fn default_max_file_size_mb() -> u64 {
    10
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_storage_root")]
    pub storage_root: String,
    #[serde(default = "default_principals_file")]
    pub principals_file: String,
    #[serde(default = "default_customers_file")]
    pub customers_file: String,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub password: Argon2Params,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7080
}

fn default_workers() -> usize {
    4
}

fn default_storage_root() -> String {
    "documents".to_string()
}

fn default_principals_file() -> String {
    "principals.yaml".to_string()
}

fn default_customers_file() -> String {
    "customers.yaml".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            workers: default_workers(),
            storage_root: default_storage_root(),
            principals_file: default_principals_file(),
            customers_file: default_customers_file(),
            session: SessionConfig::default(),
            password: Argon2Params::default(),
            upload: UploadConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), err))
        })?;
        let config: AppConfig = serde_yaml::from_str(&contents).map_err(|err| {
            ConfigError::LoadError(format!("Failed to parse {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidationError(
                "port must be non-zero".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(ConfigError::ValidationError(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage_root must not be empty".to_string(),
            ));
        }
        if self.principals_file.trim().is_empty() || self.customers_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "principals_file and customers_file must not be empty".to_string(),
            ));
        }
        if self.session.ttl_seconds == 0 || self.session.remember_me_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "session TTLs must be non-zero".to_string(),
            ));
        }
        if self.password.iterations == 0 || self.password.parallelism == 0 {
            return Err(ConfigError::ValidationError(
                "argon2 iterations and parallelism must be non-zero".to_string(),
            ));
        }
        if self.password.memory_kib < 8 * self.password.parallelism {
            return Err(ConfigError::ValidationError(
                "argon2 memory_kib is too small for the configured parallelism".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_config_yaml() -> String {
    "\
# Custodesk configuration.
# All values shown are the defaults; uncomment to change them.

#bind_address: \"127.0.0.1\"
#port: 7080
#workers: 4

# Where uploaded customer documents are stored, relative to the runtime root.
#storage_root: \"documents\"

# Data files, relative to the runtime root.
#principals_file: \"principals.yaml\"
#customers_file: \"customers.yaml\"

#session:
#  ttl_seconds: 3600
#  remember_me_ttl_seconds: 86400

#password:
#  memory_kib: 19456
#  iterations: 2
#  parallelism: 1

#upload:
#  max_file_size_mb: 10

#log_level: \"info\"
"
    .to_string()
}
