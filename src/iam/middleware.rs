// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::web::Data;
use actix_web::{HttpMessage, HttpRequest};
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use super::service::AuthService;
use super::types::Principal;
use crate::app_state::AppState;
use crate::sessions::SESSION_COOKIE_NAME;

/// Trait to add authentication methods to HttpRequest
pub trait AuthRequest {
    fn principal(&self) -> Option<Principal>;
    fn is_authenticated(&self) -> bool;
}

impl AuthRequest for HttpRequest {
    fn principal(&self) -> Option<Principal> {
        self.extensions().get::<Principal>().cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}

// Session authentication middleware: resolves the session cookie to a
// Principal and stores it in request extensions. Route gating itself is
// done by the handlers, which redirect to /login when no principal is set.
pub struct SessionAuthMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let app_state = req.app_data::<Data<AppState>>().cloned();
        let auth_service = req.app_data::<Data<AuthService>>().cloned();
        let session_cookie = req.cookie(SESSION_COOKIE_NAME);
        let service = self.service.clone();

        Box::pin(async move {
            if let (Some(app_state), Some(auth_service), Some(cookie)) =
                (app_state, auth_service, session_cookie)
            {
                if let Some(username) = app_state.sessions.resolve(cookie.value()).await {
                    // The session is only as good as the principal behind it:
                    // a principal removed from the store no longer resolves.
                    match auth_service.find_principal(&username) {
                        Ok(Some(principal)) => {
                            req.extensions_mut().insert(principal);
                        }
                        Ok(None) => {
                            log::warn!(
                                "Session for unknown principal {}; treating as unauthenticated",
                                username
                            );
                        }
                        Err(err) => {
                            log::error!("Principal lookup failed during session resolve: {}", err);
                        }
                    }
                }
            }

            service.call(req).await
        })
    }
}
