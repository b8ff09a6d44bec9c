// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod service;
pub mod store;
pub mod types;

pub use service::CustomerService;
pub use store::{CustomerStore, FileCustomerStore};
pub use types::{CreateError, CustomerError, CustomerRecord, DocumentUpload, PDF_MEDIA_TYPE};

#[cfg(test)]
pub use store::MemoryCustomerStore;
