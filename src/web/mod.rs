// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod auth;
pub mod customers;
pub mod pages;

use crate::app_state::AppState;
use actix_web::{HttpResponse, Result, web};
use minijinja::Value;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::home))
        .route("/login", web::get().to(auth::login_page))
        .route("/login", web::post().to(auth::login_submit))
        .route("/logout", web::post().to(auth::logout))
        .route("/registration", web::get().to(auth::registration_page))
        .route("/registration", web::post().to(auth::registration_submit))
        .route("/customers", web::get().to(customers::customers_page))
        .route("/customers", web::post().to(customers::customers_search))
        .route(
            "/createCustomer",
            web::get().to(customers::create_customer_page),
        )
        .route(
            "/createCustomer",
            web::post().to(customers::create_customer_submit),
        )
        .route("/fileView", web::get().to(customers::file_view));
}

pub(crate) fn render_page(
    app_state: &AppState,
    template_name: &str,
    context: Value,
) -> Result<HttpResponse> {
    let html = app_state
        .templates
        .render(template_name, context)
        .map_err(|err| {
            log::error!("Failed to render template {}: {}", template_name, err);
            actix_web::error::ErrorInternalServerError("Template rendering failed")
        })?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

pub(crate) fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", location.to_string()))
        .finish()
}
