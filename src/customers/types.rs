// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The only document media type accepted for customer uploads.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerRecord {
    pub passport_series: String,
    pub passport_number: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub age: String,
    pub phone_number: String,
    /// Generated document file name under the storage root; set only after
    /// the document has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl CustomerRecord {
    /// Natural key for lookups and the customers.yaml map.
    pub fn passport_key_of(series: &str, number: &str) -> String {
        format!("{}-{}", series, number)
    }

    pub fn passport_key(&self) -> String {
        Self::passport_key_of(&self.passport_series, &self.passport_number)
    }
}

/// An uploaded document as handed over by the web layer: the declared
/// content type is checked against `PDF_MEDIA_TYPE`, nothing is sniffed.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum CustomerError {
    ConfigurationError(String),
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for CustomerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomerError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CustomerError::FileError(msg) => write!(f, "File error: {}", msg),
            CustomerError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for CustomerError {}

/// Business-rule rejections of the combined create path. These are expected
/// outcomes rendered back to the form, not faults.
#[derive(Debug)]
pub enum CreateError {
    DuplicatePassport,
    InvalidDocumentType,
    PersistenceFailure(String),
}

impl std::fmt::Display for CreateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateError::DuplicatePassport => {
                write!(f, "A customer with these passport details already exists")
            }
            CreateError::InvalidDocumentType => {
                write!(f, "The uploaded file must be a PDF document")
            }
            CreateError::PersistenceFailure(msg) => write!(f, "Could not save customer: {}", msg),
        }
    }
}

impl std::error::Error for CreateError {}

// The customers.yaml file structure: "series-number" -> customer record
pub type CustomersData = HashMap<String, CustomerRecord>;
