// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{redirect_to, render_page};
use crate::app_state::AppState;
use crate::customers::{
    CreateError, CustomerRecord, CustomerService, DocumentUpload, PDF_MEDIA_TYPE,
};
use crate::iam::middleware::AuthRequest;
use crate::validation::{CustomerForm, validate_customer_form, validate_passport_query};
use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_web::body::SizedStream;
use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::{Value, context};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

/// Post-redirect-get marker set after a successful create and cleared on
/// the next page view.
const FLASH_COOKIE_NAME: &str = "custodesk_flash";
const FLASH_CUSTOMER_SAVED: &str = "customer_saved";

const COULD_NOT_SAVE_MESSAGE: &str = "Could not save the customer, please try again";

#[derive(Debug, Deserialize)]
pub struct PassportQueryForm {
    #[serde(default)]
    pub passport_series: String,
    #[serde(default)]
    pub passport_number: String,
}

#[derive(Debug, MultipartForm)]
pub struct CreateCustomerForm {
    pub passport_series: Text<String>,
    pub passport_number: Text<String>,
    pub first_name: Text<String>,
    pub last_name: Text<String>,
    pub gender: Text<String>,
    pub age: Text<String>,
    pub phone_number: Text<String>,
    pub document: Option<TempFile>,
}

#[derive(Debug, Deserialize)]
pub struct FileViewQuery {
    pub name: String,
}

pub async fn customers_page(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !req.is_authenticated() {
        return Ok(redirect_to("/login"));
    }
    render_page(
        app_state.as_ref(),
        "customers.html",
        context! { authenticated => true },
    )
}

pub async fn customers_search(
    req: HttpRequest,
    form: web::Form<PassportQueryForm>,
    app_state: web::Data<AppState>,
    customers: web::Data<CustomerService>,
) -> Result<HttpResponse> {
    if !req.is_authenticated() {
        return Ok(redirect_to("/login"));
    }
    let form = form.into_inner();

    // Malformed input is a validation outcome, never a lookup.
    let field_errors = validate_passport_query(&form.passport_series, &form.passport_number);
    if !field_errors.is_empty() {
        return render_page(
            app_state.as_ref(),
            "customers.html",
            context! {
                authenticated => true,
                field_errors => Value::from_serialize(&field_errors),
                passport_series => form.passport_series,
                passport_number => form.passport_number,
            },
        );
    }

    let found = customers
        .find_by_passport(&form.passport_series, &form.passport_number)
        .map_err(|err| {
            log::error!("Customer lookup failed: {}", err);
            actix_web::error::ErrorInternalServerError("Customer lookup failed")
        })?;

    match found {
        Some(customer) => render_page(
            app_state.as_ref(),
            "customers.html",
            context! {
                authenticated => true,
                customer => Value::from_serialize(&customer),
                passport_series => form.passport_series,
                passport_number => form.passport_number,
            },
        ),
        None => render_page(
            app_state.as_ref(),
            "customers.html",
            context! {
                authenticated => true,
                not_found => true,
                passport_series => form.passport_series,
                passport_number => form.passport_number,
            },
        ),
    }
}

pub async fn create_customer_page(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !req.is_authenticated() {
        return Ok(redirect_to("/login"));
    }

    let saved = req
        .cookie(FLASH_COOKIE_NAME)
        .map(|cookie| cookie.value() == FLASH_CUSTOMER_SAVED)
        .unwrap_or(false);

    let mut response = render_page(
        app_state.as_ref(),
        "create_customer.html",
        context! {
            authenticated => true,
            saved => saved,
        },
    )?;
    if saved {
        response.add_cookie(&clear_flash_cookie()).map_err(|err| {
            log::error!("Failed to clear flash cookie: {}", err);
            actix_web::error::ErrorInternalServerError("Response build failed")
        })?;
    }
    Ok(response)
}

pub async fn create_customer_submit(
    req: HttpRequest,
    MultipartForm(form): MultipartForm<CreateCustomerForm>,
    app_state: web::Data<AppState>,
    customers: web::Data<CustomerService>,
) -> Result<HttpResponse> {
    if !req.is_authenticated() {
        return Ok(redirect_to("/login"));
    }

    let field_errors = validate_customer_form(&CustomerForm {
        passport_series: &form.passport_series,
        passport_number: &form.passport_number,
        first_name: &form.first_name,
        last_name: &form.last_name,
        gender: &form.gender,
        age: &form.age,
        phone_number: &form.phone_number,
    });
    if !field_errors.is_empty() {
        return render_create_errors(
            app_state.as_ref(),
            &form,
            Some(Value::from_serialize(&field_errors)),
            None,
        );
    }

    let candidate = CustomerRecord {
        passport_series: form.passport_series.to_string(),
        passport_number: form.passport_number.to_string(),
        first_name: form.first_name.to_string(),
        last_name: form.last_name.to_string(),
        gender: form.gender.to_string(),
        age: form.age.to_string(),
        phone_number: form.phone_number.to_string(),
        document: None,
    };
    let upload = match &form.document {
        Some(file) => match document_upload_of(file) {
            Ok(upload) => upload,
            Err(err) => {
                log::error!("Failed to read uploaded temp file: {}", err);
                return render_create_errors(
                    app_state.as_ref(),
                    &form,
                    None,
                    Some(COULD_NOT_SAVE_MESSAGE),
                );
            }
        },
        None => None,
    };

    match customers.create_customer(candidate, upload) {
        Ok(customer) => {
            log::info!("Customer created via form: {}", customer.passport_key());
            Ok(HttpResponse::Found()
                .append_header(("Location", "/createCustomer"))
                .cookie(flash_cookie())
                .finish())
        }
        Err(err @ CreateError::DuplicatePassport)
        | Err(err @ CreateError::InvalidDocumentType) => {
            render_create_errors(app_state.as_ref(), &form, None, Some(&err.to_string()))
        }
        // A failed save is a rejection like any other: the user stays on
        // the form with a generic message, details go to the log only.
        Err(CreateError::PersistenceFailure(msg)) => {
            log::error!("Customer create failed: {}", msg);
            render_create_errors(app_state.as_ref(), &form, None, Some(COULD_NOT_SAVE_MESSAGE))
        }
    }
}

/// Stream a stored document back to the browser. Only generated document
/// names resolve; anything else is reported as not found.
pub async fn file_view(
    req: HttpRequest,
    query: web::Query<FileViewQuery>,
    customers: web::Data<CustomerService>,
) -> Result<HttpResponse> {
    if !req.is_authenticated() {
        return Ok(redirect_to("/login"));
    }

    let name = &query.name;
    let path = match customers.documents().resolve(name) {
        Ok(path) => path,
        Err(err) => {
            log::warn!("Document request rejected: {}", err);
            return Ok(HttpResponse::NotFound()
                .content_type("text/plain; charset=utf-8")
                .body("Document not found"));
        }
    };

    let file = tokio::fs::File::open(&path).await.map_err(|err| {
        log::error!("Failed to open document {}: {}", name, err);
        actix_web::error::ErrorInternalServerError("Document read failed")
    })?;
    let length = file
        .metadata()
        .await
        .map_err(|err| {
            log::error!("Failed to stat document {}: {}", name, err);
            actix_web::error::ErrorInternalServerError("Document read failed")
        })?
        .len();

    let stream = ReaderStream::new(file);
    Ok(HttpResponse::Ok()
        .content_type(PDF_MEDIA_TYPE)
        .insert_header((
            "Content-Disposition",
            format!("inline; filename=\"{}\"", name),
        ))
        .body(SizedStream::new(length, stream)))
}

fn render_create_errors(
    app_state: &AppState,
    form: &CreateCustomerForm,
    field_errors: Option<Value>,
    error: Option<&str>,
) -> Result<HttpResponse> {
    render_page(
        app_state,
        "create_customer.html",
        context! {
            authenticated => true,
            field_errors => field_errors,
            error => error,
            passport_series => form.passport_series.as_str(),
            passport_number => form.passport_number.as_str(),
            first_name => form.first_name.as_str(),
            last_name => form.last_name.as_str(),
            gender => form.gender.as_str(),
            age => form.age.as_str(),
            phone_number => form.phone_number.as_str(),
        },
    )
}

// Browsers submit an empty file part when no file was chosen; that counts
// as no upload. A read failure on the temp file is a server-side fault and
// is propagated, never folded into "no upload".
fn document_upload_of(file: &TempFile) -> Result<Option<DocumentUpload>, std::io::Error> {
    if file.size == 0 {
        return Ok(None);
    }
    let file_name = match file.file_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Ok(None),
    };
    let content_type = file
        .content_type
        .as_ref()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_default();
    let bytes = std::fs::read(file.file.path())?;
    Ok(Some(DocumentUpload {
        file_name,
        content_type,
        bytes,
    }))
}

fn flash_cookie<'a>() -> Cookie<'a> {
    Cookie::build(FLASH_COOKIE_NAME, FLASH_CUSTOMER_SAVED)
        .path("/createCustomer")
        .secure(false)
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn clear_flash_cookie<'a>() -> Cookie<'a> {
    Cookie::build(FLASH_COOKIE_NAME, "")
        .path("/createCustomer")
        .secure(false)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(0))
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish()
}
