// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug)]
pub enum DocumentError {
    Io(String),
    NotFound(String),
    InvalidName(String),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Io(msg) => write!(f, "Document I/O error: {}", msg),
            DocumentError::NotFound(name) => write!(f, "Document not found: {}", name),
            DocumentError::InvalidName(name) => write!(f, "Invalid document name: {}", name),
        }
    }
}

impl std::error::Error for DocumentError {}

/// Flat document storage under a single configured root. Files are named
/// `<uuid>.<original-filename>`, so unrelated uploads sharing an original
/// name never collide. Retrieval accepts generated names only, never paths.
#[derive(Clone)]
pub struct DocumentStorage {
    root: PathBuf,
}

impl DocumentStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` verbatim under a freshly generated name and return
    /// that name. The storage root is created on demand (single level).
    pub fn store(&self, original_filename: &str, bytes: &[u8]) -> Result<String, DocumentError> {
        self.ensure_root()?;

        // Strip any directory components a hostile client put in the
        // original filename; only the final component survives.
        let base = Path::new(original_filename)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let name = format!("{}.{}", Uuid::new_v4(), base);
        let path = self.root.join(&name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| DocumentError::Io(format!("Failed to create {}: {}", name, err)))?;
        file.write_all(bytes)
            .map_err(|err| DocumentError::Io(format!("Failed to write {}: {}", name, err)))?;
        file.sync_all()
            .map_err(|err| DocumentError::Io(format!("Failed to sync {}: {}", name, err)))?;

        log::info!("Document stored: {}", name);
        Ok(name)
    }

    /// Resolve a generated document name to its on-disk path. Rejects
    /// anything that is not a plain file name, then canonicalizes and
    /// verifies containment under the storage root, so a crafted name can
    /// never reach outside it.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, DocumentError> {
        validate_document_name(name)?;

        let candidate = self.root.join(name);
        let canonical_file = candidate
            .canonicalize()
            .map_err(|_| DocumentError::NotFound(name.to_string()))?;
        let canonical_root = self
            .root
            .canonicalize()
            .map_err(|err| DocumentError::Io(format!("Storage root unavailable: {}", err)))?;

        if canonical_file.strip_prefix(&canonical_root).is_err() {
            log::warn!("Document name escaped the storage root: {}", name);
            return Err(DocumentError::NotFound(name.to_string()));
        }
        if !canonical_file.is_file() {
            return Err(DocumentError::NotFound(name.to_string()));
        }

        Ok(canonical_file)
    }

    fn ensure_root(&self) -> Result<(), DocumentError> {
        match std::fs::create_dir(&self.root) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(err) => Err(DocumentError::Io(format!(
                "Failed to create storage root {}: {}",
                self.root.display(),
                err
            ))),
        }
    }
}

fn validate_document_name(name: &str) -> Result<(), DocumentError> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || Path::new(name).is_absolute()
    {
        return Err(DocumentError::InvalidName(name.to_string()));
    }
    Ok(())
}
