// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::store::CustomerStore;
use super::types::{
    CreateError, CustomerError, CustomerRecord, CustomersData, DocumentUpload, PDF_MEDIA_TYPE,
};
use crate::documents::DocumentStorage;
use std::sync::{Arc, RwLock};

/// Customer record service: passport-key lookups over an in-memory
/// snapshot, and the combined document-write + record-insert path.
#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<RwLock<CustomersData>>,
    store: Arc<dyn CustomerStore>,
    documents: DocumentStorage,
}

impl CustomerService {
    pub fn new(
        store: Arc<dyn CustomerStore>,
        documents: DocumentStorage,
    ) -> Result<Self, CustomerError> {
        let customers = store.load()?;
        Ok(Self {
            customers: Arc::new(RwLock::new(customers)),
            store,
            documents,
        })
    }

    pub fn documents(&self) -> &DocumentStorage {
        &self.documents
    }

    /// Exact-match lookup on the passport natural key.
    pub fn find_by_passport(
        &self,
        series: &str,
        number: &str,
    ) -> Result<Option<CustomerRecord>, CustomerError> {
        let key = CustomerRecord::passport_key_of(series, number);
        self.with_customers_read(|customers| Ok(customers.get(&key).cloned()))
    }

    /// Combined write path: duplicate check, document type check, document
    /// write, record insert. The two side effects are not transactional; a
    /// record insert failure leaves the already written document behind.
    pub fn create_customer(
        &self,
        mut candidate: CustomerRecord,
        upload: Option<DocumentUpload>,
    ) -> Result<CustomerRecord, CreateError> {
        let key = candidate.passport_key();

        let duplicate = self
            .with_customers_read(|customers| Ok(customers.contains_key(&key)))
            .map_err(|err| CreateError::PersistenceFailure(err.to_string()))?;
        if duplicate {
            return Err(CreateError::DuplicatePassport);
        }

        let upload = match upload {
            Some(upload) if upload.content_type == PDF_MEDIA_TYPE => upload,
            _ => return Err(CreateError::InvalidDocumentType),
        };

        let document_name = self
            .documents
            .store(&upload.file_name, &upload.bytes)
            .map_err(|err| CreateError::PersistenceFailure(err.to_string()))?;
        candidate.document = Some(document_name.clone());

        let mut guard = match self.customers.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Customers lock poisoned on write; recovering");
                poisoned.into_inner()
            }
        };

        // Re-check under the write lock: a racing create for the same
        // passport pair must lose here, not duplicate the record.
        if guard.contains_key(&key) {
            log::warn!(
                "Duplicate passport {} detected after document write; document {} is orphaned",
                key,
                document_name
            );
            return Err(CreateError::DuplicatePassport);
        }

        let mut updated = guard.clone();
        updated.insert(key.clone(), candidate.clone());

        if let Err(err) = self.store.save(&updated) {
            log::warn!(
                "Customer insert failed for {}; document {} is orphaned: {}",
                key,
                document_name,
                err
            );
            return Err(CreateError::PersistenceFailure(err.to_string()));
        }
        *guard = updated;

        log::info!("Customer saved: {}", key);
        Ok(candidate)
    }

    fn with_customers_read<T>(
        &self,
        f: impl FnOnce(&CustomersData) -> Result<T, CustomerError>,
    ) -> Result<T, CustomerError> {
        match self.customers.read() {
            Ok(guard) => f(&guard),
            Err(_) => {
                log::error!("Customers lock poisoned on read; reloading from store");
                self.reload_from_store()?;
                let guard = self.customers.read().map_err(|_| {
                    CustomerError::ConfigurationError(
                        "Customers lock poisoned after recovery attempt".to_string(),
                    )
                })?;
                f(&guard)
            }
        }
    }

    fn reload_from_store(&self) -> Result<(), CustomerError> {
        let customers = self.store.load()?;
        match self.customers.write() {
            Ok(mut guard) => {
                *guard = customers;
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                *guard = customers;
            }
        }
        self.customers.clear_poison();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customers::store::MemoryCustomerStore;
    use std::collections::HashMap;

    fn test_service(temp: &tempfile::TempDir) -> CustomerService {
        let store = Arc::new(MemoryCustomerStore::new(HashMap::new()));
        let documents = DocumentStorage::new(temp.path().join("documents"));
        CustomerService::new(store, documents).expect("service")
    }

    fn sample_candidate() -> CustomerRecord {
        CustomerRecord {
            passport_series: "1234".to_string(),
            passport_number: "567890".to_string(),
            first_name: "Clara".to_string(),
            last_name: "Voss".to_string(),
            gender: "female".to_string(),
            age: "34".to_string(),
            phone_number: "5550001234".to_string(),
            document: None,
        }
    }

    fn pdf_upload() -> DocumentUpload {
        DocumentUpload {
            file_name: "record.pdf".to_string(),
            content_type: PDF_MEDIA_TYPE.to_string(),
            bytes: b"%PDF-1.4 payload".to_vec(),
        }
    }

    #[test]
    fn create_then_find_round_trips_record_and_bytes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let service = test_service(&temp);

        let created = service
            .create_customer(sample_candidate(), Some(pdf_upload()))
            .expect("create");
        let document = created.document.clone().expect("document name");

        let found = service
            .find_by_passport("1234", "567890")
            .expect("lookup")
            .expect("present");
        assert_eq!(found.document.as_deref(), Some(document.as_str()));

        let path = service.documents().resolve(&document).expect("resolve");
        let bytes = std::fs::read(path).expect("read");
        assert_eq!(bytes, b"%PDF-1.4 payload");
    }

    #[test]
    fn duplicate_passport_is_rejected_before_any_write() {
        let temp = tempfile::tempdir().expect("tempdir");
        let service = test_service(&temp);

        service
            .create_customer(sample_candidate(), Some(pdf_upload()))
            .expect("first create");

        let stored_before: Vec<_> = std::fs::read_dir(service.documents().root())
            .expect("read dir")
            .collect();

        match service.create_customer(sample_candidate(), Some(pdf_upload())) {
            Err(CreateError::DuplicatePassport) => {}
            other => panic!("expected DuplicatePassport, got {:?}", other.map(|r| r.passport_key())),
        }

        let stored_after: Vec<_> = std::fs::read_dir(service.documents().root())
            .expect("read dir")
            .collect();
        assert_eq!(stored_before.len(), stored_after.len());
    }

    #[test]
    fn non_pdf_upload_is_rejected_with_no_side_effects() {
        let temp = tempfile::tempdir().expect("tempdir");
        let service = test_service(&temp);

        let mut upload = pdf_upload();
        upload.content_type = "application/ogg".to_string();

        match service.create_customer(sample_candidate(), Some(upload)) {
            Err(CreateError::InvalidDocumentType) => {}
            other => panic!("expected InvalidDocumentType, got {:?}", other.map(|r| r.passport_key())),
        }

        assert!(service
            .find_by_passport("1234", "567890")
            .expect("lookup")
            .is_none());
        assert!(!service.documents().root().exists());
    }

    #[test]
    fn missing_upload_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let service = test_service(&temp);

        match service.create_customer(sample_candidate(), None) {
            Err(CreateError::InvalidDocumentType) => {}
            other => panic!("expected InvalidDocumentType, got {:?}", other.map(|r| r.passport_key())),
        }
    }

    #[test]
    fn find_by_passport_is_idempotent_and_none_for_unknown() {
        let temp = tempfile::tempdir().expect("tempdir");
        let service = test_service(&temp);

        assert!(service
            .find_by_passport("9999", "000001")
            .expect("lookup")
            .is_none());

        service
            .create_customer(sample_candidate(), Some(pdf_upload()))
            .expect("create");

        let first = service
            .find_by_passport("1234", "567890")
            .expect("lookup")
            .expect("present");
        let second = service
            .find_by_passport("1234", "567890")
            .expect("lookup")
            .expect("present");
        assert_eq!(first.passport_key(), second.passport_key());
        assert_eq!(first.document, second.document);
    }

    struct FailingStore;

    impl CustomerStore for FailingStore {
        fn load(&self) -> Result<CustomersData, CustomerError> {
            Ok(CustomersData::new())
        }

        fn save(&self, _customers: &CustomersData) -> Result<(), CustomerError> {
            Err(CustomerError::FileError("store unavailable".to_string()))
        }
    }

    #[test]
    fn store_failure_is_a_persistence_failure_and_leaves_the_document() {
        let temp = tempfile::tempdir().expect("tempdir");
        let documents = DocumentStorage::new(temp.path().join("documents"));
        let service =
            CustomerService::new(Arc::new(FailingStore), documents).expect("service");

        match service.create_customer(sample_candidate(), Some(pdf_upload())) {
            Err(CreateError::PersistenceFailure(_)) => {}
            other => panic!("expected PersistenceFailure, got {:?}", other.map(|r| r.passport_key())),
        }

        // The document write happened before the failed insert and is not
        // rolled back.
        let orphaned: Vec<_> = std::fs::read_dir(service.documents().root())
            .expect("read dir")
            .collect();
        assert_eq!(orphaned.len(), 1);
        assert!(service
            .find_by_passport("1234", "567890")
            .expect("lookup")
            .is_none());
    }
}
