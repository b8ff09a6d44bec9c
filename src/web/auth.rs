// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{redirect_to, render_page};
use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::iam::middleware::AuthRequest;
use crate::iam::service::AuthService;
use crate::iam::types::{RegisterError, RegisterRequest};
use crate::sessions::SESSION_COOKIE_NAME;
use crate::validation::{RegistrationForm, validate_registration};
use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::{Value, context};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    // Checkbox: present with any value when ticked, absent otherwise.
    pub remember_me: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationFormData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_verify: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: String,
}

pub async fn login_page(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse> {
    if req.is_authenticated() {
        return Ok(redirect_to("/"));
    }
    render_page(
        app_state.as_ref(),
        "login.html",
        context! { authenticated => false },
    )
}

pub async fn login_submit(
    form: web::Form<LoginFormData>,
    app_state: web::Data<AppState>,
    auth_service: web::Data<AuthService>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse> {
    let form = form.into_inner();

    let principal = match auth_service.verify_login(&form.username, &form.password) {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            // One message for both unknown username and wrong password.
            return render_page(
                app_state.as_ref(),
                "login.html",
                context! {
                    authenticated => false,
                    error => "Invalid username or password",
                    username => form.username,
                },
            );
        }
        Err(err) => {
            log::error!("Login verification failed: {}", err);
            return Err(actix_web::error::ErrorInternalServerError("Login failed"));
        }
    };

    let issue = app_state
        .sessions
        .issue(
            &principal.username,
            form.remember_me.is_some(),
            &config.session,
        )
        .await
        .ok_or_else(|| {
            log::error!("Session store unavailable during login");
            actix_web::error::ErrorInternalServerError("Login failed")
        })?;

    let cookie = session_cookie(issue.session_id, issue.expires_in_seconds);
    log::info!("Login succeeded: {}", principal.username);
    Ok(HttpResponse::Found()
        .append_header(("Location", "/"))
        .cookie(cookie)
        .finish())
}

pub async fn logout(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE_NAME) {
        app_state.sessions.invalidate(cookie.value());
    }
    Ok(HttpResponse::Found()
        .append_header(("Location", "/"))
        .cookie(logout_cookie())
        .finish())
}

pub async fn registration_page(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.is_authenticated() {
        return Ok(redirect_to("/"));
    }
    render_page(
        app_state.as_ref(),
        "registration.html",
        context! { authenticated => false },
    )
}

pub async fn registration_submit(
    form: web::Form<RegistrationFormData>,
    app_state: web::Data<AppState>,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let form = form.into_inner();

    let field_errors = validate_registration(&RegistrationForm {
        username: &form.username,
        password: &form.password,
        password_verify: &form.password_verify,
        first_name: &form.first_name,
        age: &form.age,
    });
    if !field_errors.is_empty() {
        return render_registration_errors(app_state.as_ref(), &form, &field_errors, None);
    }

    let request = RegisterRequest {
        username: form.username.clone(),
        password: form.password.clone(),
        first_name: form.first_name.clone(),
        last_name: optional(&form.last_name),
        gender: optional(&form.gender),
        age: optional(&form.age),
    };

    match auth_service.register(request) {
        Ok(_) => Ok(redirect_to("/login")),
        Err(RegisterError::UsernameTaken) => render_registration_errors(
            app_state.as_ref(),
            &form,
            &[],
            Some("This username is already taken"),
        ),
        // A failed save stays on the form with a generic message; the
        // underlying error goes to the log only.
        Err(RegisterError::Persistence(err)) => {
            log::error!("Registration failed: {}", err);
            render_registration_errors(
                app_state.as_ref(),
                &form,
                &[],
                Some("Could not save the registration, please try again"),
            )
        }
    }
}

// Entered values flow back into the form on errors; passwords never do.
fn render_registration_errors(
    app_state: &AppState,
    form: &RegistrationFormData,
    field_errors: &[crate::validation::FieldError],
    error: Option<&str>,
) -> Result<HttpResponse> {
    render_page(
        app_state,
        "registration.html",
        context! {
            authenticated => false,
            field_errors => Value::from_serialize(field_errors),
            error => error,
            username => form.username,
            first_name => form.first_name,
            last_name => form.last_name,
            gender => form.gender,
            age => form.age,
        },
    )
}

fn session_cookie<'a>(session_id: String, expires_in_seconds: u64) -> Cookie<'a> {
    Cookie::build(SESSION_COOKIE_NAME, session_id)
        .path("/")
        .secure(false)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(expires_in_seconds as i64))
        .finish()
}

fn logout_cookie<'a>() -> Cookie<'a> {
    Cookie::build(SESSION_COOKIE_NAME, "")
        .path("/")
        .secure(false)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(0))
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish()
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
