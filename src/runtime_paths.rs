// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::AppConfig;
use std::path::{Path, PathBuf};

/// Filesystem locations derived from the runtime root and the loaded
/// configuration. Relative config entries are resolved against the root;
/// absolute entries are taken as-is.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub principals_file: PathBuf,
    pub customers_file: PathBuf,
    pub storage_root: PathBuf,
}

pub const CONFIG_FILE_NAME: &str = "config.yaml";

impl RuntimePaths {
    pub fn resolve(root: &Path, config: &AppConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config_file: root.join(CONFIG_FILE_NAME),
            principals_file: resolve_entry(root, &config.principals_file),
            customers_file: resolve_entry(root, &config.customers_file),
            storage_root: resolve_entry(root, &config.storage_root),
        }
    }
}

fn resolve_entry(root: &Path, entry: &str) -> PathBuf {
    let path = Path::new(entry);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_entries_resolve_under_root() {
        let config = AppConfig::default();
        let paths = RuntimePaths::resolve(Path::new("/srv/custodesk"), &config);
        assert_eq!(paths.principals_file, Path::new("/srv/custodesk/principals.yaml"));
        assert_eq!(paths.storage_root, Path::new("/srv/custodesk/documents"));
    }

    #[test]
    fn absolute_entries_are_kept() {
        let mut config = AppConfig::default();
        config.storage_root = "/var/lib/custodesk/documents".to_string();
        let paths = RuntimePaths::resolve(Path::new("/srv/custodesk"), &config);
        assert_eq!(
            paths.storage_root,
            Path::new("/var/lib/custodesk/documents")
        );
    }
}
