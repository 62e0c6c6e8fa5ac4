//! API token middleware for Actix Web.
//!
//! SePay does not sign its webhook payloads; the only authenticity signal it offers is a shared token sent
//! as `Authorization: Apikey <token>` on every delivery. This middleware checks that header before the
//! webhook handler runs.
//!
//! A shared constant is a much weaker guarantee than the HMAC signatures the other providers use — anyone
//! who learns the token can forge webhooks. The amount check and order lookup in the engine still gate every
//! transition, but treat the token as secret and rotate it if it leaks.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorForbidden,
    Error,
};
use futures::future::LocalBoxFuture;
use gateway_tools::{sepay::authorization_is_valid, SePayConfig};
use log::{trace, warn};

pub struct ApiTokenMiddlewareFactory {
    config: SePayConfig,
}

impl ApiTokenMiddlewareFactory {
    pub fn new(config: SePayConfig) -> Self {
        ApiTokenMiddlewareFactory { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiTokenMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = ApiTokenMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiTokenMiddlewareService { config: self.config.clone(), service: Rc::new(service) }))
    }
}

pub struct ApiTokenMiddlewareService<S> {
    config: SePayConfig,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiTokenMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = self.config.clone();
        Box::pin(async move {
            trace!("🔐️ Checking API token for request");
            let header = req.headers().get("Authorization").and_then(|v| v.to_str().ok());
            if authorization_is_valid(header, &config) {
                trace!("🔐️ API token check for request ✅️");
                service.call(req).await
            } else {
                warn!("🔐️ Missing or invalid API token in request. Denying access.");
                Err(ErrorForbidden("Missing or invalid API token."))
            }
        })
    }
}
