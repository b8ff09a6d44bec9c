// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{
    TEST_PASSWORD, TEST_USERNAME, TestHarness, login_request, session_cookie_from,
};
use custodesk::sessions::SESSION_COOKIE_NAME;

#[actix_web::test]
async fn login_sets_session_cookie_and_redirects_home() {
    let harness = TestHarness::new();
    harness.register_test_user();
    let service = test::init_service(harness.app()).await;

    let response =
        test::call_service(&service, login_request(TEST_USERNAME, TEST_PASSWORD).to_request())
            .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get("location").map(|v| v.to_str().unwrap()),
        Some("/")
    );
    let cookie = session_cookie_from(&response);
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
}

#[actix_web::test]
async fn wrong_password_and_unknown_user_get_the_same_message() {
    let harness = TestHarness::new();
    harness.register_test_user();
    let service = test::init_service(harness.app()).await;

    let mut bodies = Vec::new();
    for (username, password) in [(TEST_USERNAME, "WrongPass99"), ("Nobody", TEST_PASSWORD)] {
        let response =
            test::call_service(&service, login_request(username, password).to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .response()
                .cookies()
                .all(|cookie| cookie.name() != SESSION_COOKIE_NAME),
            "no session may be issued on a failed login"
        );
        let body = test::read_body(response).await;
        let html = String::from_utf8(body.to_vec()).expect("utf8 body");
        assert!(html.contains("Invalid username or password"));
        bodies.push(html);
    }
}

#[actix_web::test]
async fn protected_pages_redirect_anonymous_requests_to_login() {
    let harness = TestHarness::new();
    let service = test::init_service(harness.app()).await;

    for uri in ["/customers", "/createCustomer", "/fileView?name=x.pdf"] {
        let response =
            test::call_service(&service, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::FOUND, "uri {}", uri);
        assert_eq!(
            response.headers().get("location").map(|v| v.to_str().unwrap()),
            Some("/login"),
            "uri {}",
            uri
        );
    }
}

#[actix_web::test]
async fn session_cookie_grants_access_to_protected_pages() {
    let harness = TestHarness::new();
    harness.register_test_user();
    let service = test::init_service(harness.app()).await;

    let login = test::call_service(&service, login_request(TEST_USERNAME, TEST_PASSWORD).to_request())
        .await;
    let cookie = session_cookie_from(&login);

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri("/customers")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn logout_invalidates_the_session() {
    let harness = TestHarness::new();
    harness.register_test_user();
    let service = test::init_service(harness.app()).await;

    let login = test::call_service(&service, login_request(TEST_USERNAME, TEST_PASSWORD).to_request())
        .await;
    let cookie = session_cookie_from(&login);

    let logout = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::FOUND);

    // The old cookie no longer resolves; protected pages redirect again.
    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri("/customers")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get("location").map(|v| v.to_str().unwrap()),
        Some("/login")
    );
}

#[actix_web::test]
async fn garbage_session_cookie_is_treated_as_anonymous() {
    let harness = TestHarness::new();
    let service = test::init_service(harness.app()).await;

    let response = test::call_service(
        &service,
        test::TestRequest::get()
            .uri("/customers")
            .cookie(actix_web::cookie::Cookie::new(
                SESSION_COOKIE_NAME,
                "csn_not-a-real-session",
            ))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn home_page_is_public_in_both_states() {
    let harness = TestHarness::new();
    harness.register_test_user();
    let service = test::init_service(harness.app()).await;

    let anonymous =
        test::call_service(&service, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(anonymous.status(), StatusCode::OK);

    let login = test::call_service(&service, login_request(TEST_USERNAME, TEST_PASSWORD).to_request())
        .await;
    let cookie = session_cookie_from(&login);
    let authenticated = test::call_service(
        &service,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(authenticated.status(), StatusCode::OK);
    let body = test::read_body(authenticated).await;
    let html = String::from_utf8(body.to_vec()).expect("utf8 body");
    assert!(html.contains("Log out"));
}
