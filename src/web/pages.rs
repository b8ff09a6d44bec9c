// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::render_page;
use crate::app_state::AppState;
use crate::iam::middleware::AuthRequest;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::context;

/// The home page is public; it only changes its navigation depending on
/// whether a principal is attached to the request.
pub async fn home(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse> {
    let principal = req.principal();
    render_page(
        app_state.as_ref(),
        "home.html",
        context! {
            authenticated => principal.is_some(),
            first_name => principal.map(|p| p.first_name),
        },
    )
}
