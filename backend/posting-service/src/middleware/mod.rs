/// HTTP middleware for posting-service
///
/// JWT bearer authentication with revocation checks, plus extractors for the
/// identity it places in request extensions.
use crate::auth::{JwtValidator, RevocationStore};
use crate::error::AppError;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, TimeZone, Utc};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

/// Authenticated session: who, which token, until when.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Actix middleware that validates a Bearer token and rejects revoked sessions.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    validator: Arc<JwtValidator>,
    revocations: Arc<dyn RevocationStore>,
}

impl JwtAuthMiddleware {
    pub fn new(validator: Arc<JwtValidator>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            validator,
            revocations,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            validator: self.validator.clone(),
            revocations: self.revocations.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    validator: Arc<JwtValidator>,
    revocations: Arc<dyn RevocationStore>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let validator = self.validator.clone();
        let revocations = self.revocations.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

            let claims = validator.validate(token)?;

            if revocations.is_revoked(&claims.jti).await? {
                return Err(AppError::Unauthorized("Session has been revoked".into()).into());
            }

            let user_id = Uuid::parse_str(&claims.sub)
                .map_err(|_| AppError::Unauthorized("Invalid user ID".into()))?;

            let expires_at = Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .ok_or_else(|| AppError::Unauthorized("Invalid token expiry".into()))?;

            req.extensions_mut().insert(UserId(user_id));
            req.extensions_mut().insert(AuthContext {
                user_id,
                jti: claims.jti,
                expires_at,
            });

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .copied()
                .ok_or_else(|| AppError::Unauthorized("User ID missing".into()).into()),
        )
    }
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthContext>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("Session missing".into()).into()),
        )
    }
}
