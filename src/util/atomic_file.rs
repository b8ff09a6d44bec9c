// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

/// Replace the file at `path` with `content` without ever exposing a
/// partially written file: write to a fresh temp file in the same directory,
/// sync it, then rename over the target.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path has no parent directory: {}", path.display()),
        )
    })?;
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path has no file name: {}", path.display()),
        )
    })?;

    let (mut file, temp_path) = create_temp_file(parent, &file_name.to_string_lossy())?;

    if let Ok(metadata) = std::fs::metadata(path) {
        #[cfg(unix)]
        {
            if let Err(err) = std::fs::set_permissions(&temp_path, metadata.permissions()) {
                let _ = std::fs::remove_file(&temp_path);
                return Err(err);
            }
        }
        #[cfg(not(unix))]
        let _ = metadata;
    }

    if let Err(err) = file.write_all(content.as_bytes()) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(err);
    }
    if let Err(err) = file.sync_all() {
        let _ = std::fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(err) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(err);
    }

    #[cfg(unix)]
    {
        if let Err(err) = sync_parent_dir(parent) {
            log::warn!("Directory sync failed for {}: {}", parent.display(), err);
        }
    }

    Ok(())
}

fn create_temp_file(dir: &Path, base: &str) -> io::Result<(std::fs::File, PathBuf)> {
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::other(
        "Failed to create temp file after repeated attempts",
    ))
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> io::Result<()> {
    std::fs::File::open(parent)?.sync_all()
}
