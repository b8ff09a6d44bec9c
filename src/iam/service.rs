// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::password::{hash_password, verify_password};
use super::store::PrincipalStore;
use super::types::{
    DEFAULT_ROLE, IamError, Principal, PrincipalsData, RegisterError, RegisterRequest,
};
use crate::config::Argon2Params;
use std::sync::{Arc, RwLock};

/// Authentication service over the credential store. Reads go through an
/// in-memory snapshot; every mutation checks, updates and persists under a
/// single write lock, so duplicate-username races cannot slip between the
/// check and the insert.
#[derive(Clone)]
pub struct AuthService {
    principals: Arc<RwLock<PrincipalsData>>,
    store: Arc<dyn PrincipalStore>,
    password_params: Argon2Params,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn PrincipalStore>,
        password_params: Argon2Params,
    ) -> Result<Self, IamError> {
        let principals = store.load()?;
        Ok(Self {
            principals: Arc::new(RwLock::new(principals)),
            store,
            password_params,
        })
    }

    /// Exact-match lookup by username.
    pub fn find_principal(&self, username: &str) -> Result<Option<Principal>, IamError> {
        self.with_principals_read(|principals| Ok(principals.get(username).cloned()))
    }

    /// Register a new principal. Field-level validation is the caller's
    /// responsibility; this enforces the business rules: unique username,
    /// hashed password, fixed default role.
    pub fn register(&self, request: RegisterRequest) -> Result<Principal, RegisterError> {
        let password_hash = hash_password(&request.password, &self.password_params)
            .map_err(|err| RegisterError::Persistence(IamError::ConfigurationError(err.to_string())))?;

        let mut guard = self.write_guard().map_err(RegisterError::Persistence)?;

        if guard.contains_key(&request.username) {
            return Err(RegisterError::UsernameTaken);
        }

        let principal = Principal {
            username: request.username.clone(),
            password_hash,
            role: DEFAULT_ROLE.to_string(),
            first_name: request.first_name,
            last_name: request.last_name,
            gender: request.gender,
            age: request.age,
        };

        let mut updated = guard.clone();
        updated.insert(request.username, principal.clone());

        self.store
            .save(&updated)
            .map_err(RegisterError::Persistence)?;
        *guard = updated;

        log::info!("Principal registered: {}", principal.username);
        Ok(principal)
    }

    /// Verify submitted credentials. An unknown username and a wrong
    /// password are indistinguishable to the caller.
    pub fn verify_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, IamError> {
        let principal = match self.find_principal(username)? {
            Some(principal) => principal,
            None => return Ok(None),
        };

        match verify_password(password, &principal.password_hash) {
            Ok(true) => Ok(Some(principal)),
            Ok(false) => Ok(None),
            Err(err) => {
                log::error!("Password verification failed for {}: {}", username, err);
                Ok(None)
            }
        }
    }

    fn with_principals_read<T>(
        &self,
        f: impl FnOnce(&PrincipalsData) -> Result<T, IamError>,
    ) -> Result<T, IamError> {
        match self.principals.read() {
            Ok(guard) => f(&guard),
            Err(_) => {
                log::error!("Principals lock poisoned on read; reloading from store");
                self.reload_from_store()?;
                let guard = self.principals.read().map_err(|_| {
                    IamError::ConfigurationError(
                        "Principals lock poisoned after recovery attempt".to_string(),
                    )
                })?;
                f(&guard)
            }
        }
    }

    fn write_guard(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, PrincipalsData>, IamError> {
        match self.principals.write() {
            Ok(guard) => Ok(guard),
            Err(poisoned) => {
                log::error!("Principals lock poisoned on write; reloading from store");
                let mut guard = poisoned.into_inner();
                *guard = self.store.load()?;
                self.principals.clear_poison();
                Ok(guard)
            }
        }
    }

    fn reload_from_store(&self) -> Result<(), IamError> {
        let principals = self.store.load()?;
        match self.principals.write() {
            Ok(mut guard) => {
                *guard = principals;
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                *guard = principals;
            }
        }
        self.principals.clear_poison();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::store::MemoryPrincipalStore;
    use std::collections::HashMap;

    fn test_params() -> Argon2Params {
        Argon2Params {
            memory_kib: 8192,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn test_service() -> AuthService {
        let store = Arc::new(MemoryPrincipalStore::new(HashMap::new()));
        AuthService::new(store, test_params()).expect("service")
    }

    fn test_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "Testing123".to_string(),
            first_name: "Terry".to_string(),
            last_name: None,
            gender: None,
            age: None,
        }
    }

    #[test]
    fn register_then_find_principal() {
        let service = test_service();
        service.register(test_request("Test")).expect("register");

        let principal = service
            .find_principal("Test")
            .expect("lookup")
            .expect("present");
        assert_eq!(principal.role, DEFAULT_ROLE);
        assert_ne!(principal.password_hash, "Testing123");
    }

    #[test]
    fn duplicate_username_is_rejected_without_a_write() {
        let service = test_service();
        service.register(test_request("Test")).expect("register");

        let mut second = test_request("Test");
        second.first_name = "Other".to_string();
        match service.register(second) {
            Err(RegisterError::UsernameTaken) => {}
            other => panic!("expected UsernameTaken, got {:?}", other.map(|p| p.username)),
        }

        let principal = service
            .find_principal("Test")
            .expect("lookup")
            .expect("present");
        assert_eq!(principal.first_name, "Terry");
    }

    #[test]
    fn verify_login_accepts_correct_password() {
        let service = test_service();
        service.register(test_request("Test")).expect("register");

        let principal = service
            .verify_login("Test", "Testing123")
            .expect("verify")
            .expect("accepted");
        assert_eq!(principal.username, "Test");
    }

    #[test]
    fn verify_login_rejects_wrong_password_and_unknown_user_alike() {
        let service = test_service();
        service.register(test_request("Test")).expect("register");

        assert!(service
            .verify_login("Test", "WrongPassword")
            .expect("verify")
            .is_none());
        assert!(service
            .verify_login("Nobody", "Testing123")
            .expect("verify")
            .is_none());
    }

    #[test]
    fn find_principal_returns_none_for_unknown_username() {
        let service = test_service();
        assert!(service.find_principal("Missing").expect("lookup").is_none());
    }
}
