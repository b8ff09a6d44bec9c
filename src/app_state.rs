// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::sessions::SessionStore;
use crate::templates::{MiniJinjaEngine, TemplateEngine};

pub struct AppState {
    pub templates: Arc<dyn TemplateEngine>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            templates: Arc::new(MiniJinjaEngine::new()),
            sessions: SessionStore::new(),
        }
    }
}
