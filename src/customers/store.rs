// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{CustomerError, CustomersData};
use crate::util::write_atomic;
use std::path::PathBuf;

#[cfg(test)]
use std::sync::{Arc, RwLock};

pub trait CustomerStore: Send + Sync {
    fn load(&self) -> Result<CustomersData, CustomerError>;
    fn save(&self, customers: &CustomersData) -> Result<(), CustomerError>;
}

pub struct FileCustomerStore {
    customers_file: PathBuf,
}

impl FileCustomerStore {
    pub fn new(customers_file: PathBuf) -> Result<Self, CustomerError> {
        if customers_file.as_os_str().is_empty() {
            return Err(CustomerError::ConfigurationError(
                "Customers file path is empty".to_string(),
            ));
        }
        Ok(Self { customers_file })
    }
}

impl CustomerStore for FileCustomerStore {
    fn load(&self) -> Result<CustomersData, CustomerError> {
        let content = std::fs::read_to_string(&self.customers_file)
            .map_err(|e| CustomerError::FileError(format!("Failed to read customers file: {}", e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| CustomerError::ParseError(format!("Failed to parse customers file: {}", e)))
    }

    fn save(&self, customers: &CustomersData) -> Result<(), CustomerError> {
        let content = serde_yaml::to_string(customers).map_err(|e| {
            CustomerError::ParseError(format!("Failed to serialize customers: {}", e))
        })?;
        write_atomic(&self.customers_file, &content)
            .map_err(|e| CustomerError::FileError(format!("Failed to write customers file: {}", e)))
    }
}

#[cfg(test)]
pub struct MemoryCustomerStore {
    customers: Arc<RwLock<CustomersData>>,
}

#[cfg(test)]
impl MemoryCustomerStore {
    pub fn new(initial: CustomersData) -> Self {
        Self {
            customers: Arc::new(RwLock::new(initial)),
        }
    }
}

#[cfg(test)]
impl CustomerStore for MemoryCustomerStore {
    fn load(&self) -> Result<CustomersData, CustomerError> {
        match self.customers.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => Ok(poisoned.into_inner().clone()),
        }
    }

    fn save(&self, customers: &CustomersData) -> Result<(), CustomerError> {
        match self.customers.write() {
            Ok(mut guard) => {
                *guard = customers.clone();
                Ok(())
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                *guard = customers.clone();
                Ok(())
            }
        }
    }
}
