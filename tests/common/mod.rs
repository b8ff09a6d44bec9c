// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_multipart::form::MultipartFormConfig;
use actix_web::App;
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::web;
use custodesk::app_state::AppState;
use custodesk::config::{AppConfig, Argon2Params};
use custodesk::customers::{CustomerService, FileCustomerStore};
use custodesk::documents::DocumentStorage;
use custodesk::iam::middleware::SessionAuthMiddlewareFactory;
use custodesk::iam::service::AuthService;
use custodesk::iam::store::FilePrincipalStore;
use custodesk::iam::types::RegisterRequest;
use custodesk::sessions::SESSION_COOKIE_NAME;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_USERNAME: &str = "Test";
pub const TEST_PASSWORD: &str = "Testing123";
pub const MULTIPART_BOUNDARY: &str = "----custodesk-test-boundary";

/// A complete application wired against a throwaway runtime directory.
/// Must be created inside an async test so the session store task can be
/// spawned onto the test runtime.
pub struct TestHarness {
    pub root: TempDir,
    pub config: AppConfig,
    pub app_state: web::Data<AppState>,
    pub auth: web::Data<AuthService>,
    pub customers: web::Data<CustomerService>,
}

impl TestHarness {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let principals_file = root.path().join("principals.yaml");
        let customers_file = root.path().join("customers.yaml");
        std::fs::write(&principals_file, "{}\n").expect("seed principals file");
        std::fs::write(&customers_file, "{}\n").expect("seed customers file");

        let mut config = AppConfig::default();
        // Cheap hashing keeps the suite fast.
        config.password = Argon2Params {
            memory_kib: 8192,
            iterations: 1,
            parallelism: 1,
        };
        // Small upload cap so the over-limit path is testable.
        config.upload.max_file_size_mb = 1;

        let principal_store = FilePrincipalStore::new(principals_file).expect("principal store");
        let auth =
            AuthService::new(Arc::new(principal_store), config.password.clone()).expect("auth");

        let customer_store = FileCustomerStore::new(customers_file).expect("customer store");
        let documents = DocumentStorage::new(root.path().join("documents"));
        let customers =
            CustomerService::new(Arc::new(customer_store), documents).expect("customers");

        Self {
            root,
            config: config.clone(),
            app_state: web::Data::new(AppState::new()),
            auth: web::Data::new(auth),
            customers: web::Data::new(customers),
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let upload_limit = self.config.upload.max_file_size_mb as usize * 1024 * 1024;
        App::new()
            .app_data(self.app_state.clone())
            .app_data(web::Data::new(self.config.clone()))
            .app_data(self.auth.clone())
            .app_data(self.customers.clone())
            .app_data(MultipartFormConfig::default().total_limit(upload_limit))
            .wrap(SessionAuthMiddlewareFactory)
            .configure(custodesk::web::configure)
    }

    /// Register the standard test principal directly through the service.
    pub fn register_test_user(&self) {
        self.auth
            .register(RegisterRequest {
                username: TEST_USERNAME.to_string(),
                password: TEST_PASSWORD.to_string(),
                first_name: "Test".to_string(),
                last_name: None,
                gender: None,
                age: None,
            })
            .expect("register test user");
    }
}

pub fn login_request(username: &str, password: &str) -> actix_web::test::TestRequest {
    actix_web::test::TestRequest::post()
        .uri("/login")
        .set_form([("username", username), ("password", password)])
}

pub fn session_cookie_from<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .expect("session cookie")
        .into_owned()
}

/// Standard valid field set for the create-customer form.
pub fn customer_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("passport_series", "1234"),
        ("passport_number", "567890"),
        ("first_name", "Clara"),
        ("last_name", "Voss"),
        ("gender", "female"),
        ("age", "34"),
        ("phone_number", "5550001234"),
    ]
}

/// Hand-rolled multipart/form-data payload: text fields plus an optional
/// file part named `document`.
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                MULTIPART_BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                MULTIPART_BOUNDARY, filename, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> actix_web::test::TestRequest {
    actix_web::test::TestRequest::post()
        .uri(uri)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        ))
        .set_payload(body)
}
