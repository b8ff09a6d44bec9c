// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod customers;
pub mod documents;
pub mod iam;
pub mod runtime_paths;
pub mod sessions;
pub mod templates;
pub mod util;
pub mod validation;
pub mod web;
