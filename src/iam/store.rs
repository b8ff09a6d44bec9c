// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{IamError, PrincipalsData, YamlPrincipal, YamlPrincipalsData};
use crate::util::write_atomic;
use std::path::PathBuf;

#[cfg(test)]
use std::sync::{Arc, RwLock};

pub trait PrincipalStore: Send + Sync {
    fn load(&self) -> Result<PrincipalsData, IamError>;
    fn save(&self, principals: &PrincipalsData) -> Result<(), IamError>;
}

pub struct FilePrincipalStore {
    principals_file: PathBuf,
}

impl FilePrincipalStore {
    pub fn new(principals_file: PathBuf) -> Result<Self, IamError> {
        if principals_file.as_os_str().is_empty() {
            return Err(IamError::ConfigurationError(
                "Principals file path is empty".to_string(),
            ));
        }
        Ok(Self { principals_file })
    }

    fn parse_principals(content: &str) -> Result<PrincipalsData, IamError> {
        let yaml_principals: YamlPrincipalsData = serde_yaml::from_str(content)
            .map_err(|e| IamError::ParseError(format!("Failed to parse principals file: {}", e)))?;

        let mut principals = PrincipalsData::new();
        for (username, yaml_principal) in yaml_principals {
            principals.insert(username.clone(), yaml_principal.into_principal(username));
        }
        Ok(principals)
    }

    fn serialize_principals(principals: &PrincipalsData) -> Result<String, IamError> {
        let yaml_principals: YamlPrincipalsData = principals
            .iter()
            .map(|(username, principal)| {
                (username.clone(), YamlPrincipal::from_principal(principal))
            })
            .collect();

        serde_yaml::to_string(&yaml_principals)
            .map_err(|e| IamError::ParseError(format!("Failed to serialize principals: {}", e)))
    }
}

impl PrincipalStore for FilePrincipalStore {
    fn load(&self) -> Result<PrincipalsData, IamError> {
        let content = std::fs::read_to_string(&self.principals_file)
            .map_err(|e| IamError::FileError(format!("Failed to read principals file: {}", e)))?;
        Self::parse_principals(&content)
    }

    fn save(&self, principals: &PrincipalsData) -> Result<(), IamError> {
        let content = Self::serialize_principals(principals)?;
        write_atomic(&self.principals_file, &content)
            .map_err(|e| IamError::FileError(format!("Failed to write principals file: {}", e)))
    }
}

#[cfg(test)]
pub struct MemoryPrincipalStore {
    principals: Arc<RwLock<PrincipalsData>>,
}

#[cfg(test)]
impl MemoryPrincipalStore {
    pub fn new(initial: PrincipalsData) -> Self {
        Self {
            principals: Arc::new(RwLock::new(initial)),
        }
    }
}

#[cfg(test)]
impl PrincipalStore for MemoryPrincipalStore {
    fn load(&self) -> Result<PrincipalsData, IamError> {
        match self.principals.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => Ok(poisoned.into_inner().clone()),
        }
    }

    fn save(&self, principals: &PrincipalsData) -> Result<(), IamError> {
        match self.principals.write() {
            Ok(mut guard) => {
                *guard = principals.clone();
                Ok(())
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                *guard = principals.clone();
                Ok(())
            }
        }
    }
}
