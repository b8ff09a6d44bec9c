// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The only role ever assigned at registration.
pub const DEFAULT_ROLE: &str = "USER";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Principal {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

// Structure matching the principals.yaml file format: the username is the
// map key and is not repeated inside the record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YamlPrincipal {
    pub password_hash: String,
    pub role: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

impl YamlPrincipal {
    pub fn into_principal(self, username: String) -> Principal {
        Principal {
            username,
            password_hash: self.password_hash,
            role: self.role,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            age: self.age,
        }
    }

    pub fn from_principal(principal: &Principal) -> Self {
        Self {
            password_hash: principal.password_hash.clone(),
            role: principal.role.clone(),
            first_name: principal.first_name.clone(),
            last_name: principal.last_name.clone(),
            gender: principal.gender.clone(),
            age: principal.age.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IamError {
    PrincipalNotFound(String),
    ConfigurationError(String),
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for IamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IamError::PrincipalNotFound(username) => {
                write!(f, "Principal not found: {}", username)
            }
            IamError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            IamError::FileError(msg) => write!(f, "File error: {}", msg),
            IamError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for IamError {}

/// A rejected registration is an expected outcome, not a fault; only the
/// `Persistence` variant carries an underlying error.
#[derive(Debug)]
pub enum RegisterError {
    UsernameTaken,
    Persistence(IamError),
}

impl std::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterError::UsernameTaken => write!(f, "Username is already taken"),
            RegisterError::Persistence(err) => write!(f, "Registration failed: {}", err),
        }
    }
}

impl std::error::Error for RegisterError {}

/// Candidate data for registration. The password confirmation is compared
/// in the web layer before this is built and is never carried further.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
}

// The principals.yaml file structure: username -> yaml principal data
pub type YamlPrincipalsData = HashMap<String, YamlPrincipal>;
pub type PrincipalsData = HashMap<String, Principal>;
