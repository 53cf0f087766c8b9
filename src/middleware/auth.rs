//! Authentication middleware and the role gate.
//!
//! The middleware extracts a `Bearer` token, verifies the signature and
//! expiry, resolves the user record and stores the resulting [`Identity`]
//! in the request extensions. It never rejects by itself: handlers that
//! need a caller use the `Identity` extractor (401 when absent/invalid)
//! and [`require_role`] (403 on a role mismatch). The two failures stay
//! distinct all the way to the response.

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use chrono::Utc;
use futures::future::{ok, ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::rc::Rc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Claims, Identity, Role};
use crate::repository::UserRepository;

/// Token lifetime: 7 days.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Sign a token for a user id.
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Exact role match. A missing identity is Unauthorized (no credential);
/// a present identity with the wrong role is Forbidden. Admin does not
/// implicitly satisfy a regular check.
pub fn require_role(identity: Option<&Identity>, role: Role) -> Result<(), AppError> {
    match identity {
        None => Err(AppError::Unauthorized("no token")),
        Some(id) if id.role == role => Ok(()),
        Some(_) => Err(AppError::Forbidden("insufficient role")),
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let has_header = req.headers().contains_key(header::AUTHORIZATION);
        let identity = req.extensions().get::<Identity>().cloned();
        ready(match identity {
            Some(id) => Ok(id),
            None if has_header => Err(AppError::Unauthorized("token invalid")),
            None => Err(AppError::Unauthorized("no token")),
        })
    }
}

/// Authentication middleware.
pub struct AuthMiddleware {
    secret: Rc<String>,
}

impl AuthMiddleware {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Rc::new(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            secret: Rc::clone(&self.secret),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = Rc::clone(&self.secret);

        Box::pin(async move {
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_owned);

            if let Some(token) = token {
                match verify_token(&token, &secret) {
                    Ok(claims) => {
                        let repo = req.app_data::<web::Data<UserRepository>>().cloned();
                        if let (Some(repo), Ok(user_id)) =
                            (repo, Uuid::parse_str(&claims.sub))
                        {
                            match repo.find_by_id(user_id).await {
                                Ok(user) => {
                                    req.extensions_mut().insert(Identity::from(user));
                                }
                                Err(e) => {
                                    tracing::debug!(error = %e, "token user not resolvable");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "token rejected");
                    }
                }
            }

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    const SECRET: &str = "test-secret";

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            name: "Test User".into(),
            email: "test@example.com".into(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), SECRET).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 10_000,
            exp: now - 7_200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(verify_token("not-a-jwt", SECRET).is_err());
    }

    #[test]
    fn role_gate_truth_table() {
        let admin = identity(Role::Admin);
        let regular = identity(Role::Regular);

        assert!(require_role(Some(&admin), Role::Admin).is_ok());
        assert!(matches!(
            require_role(Some(&regular), Role::Admin),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            require_role(None, Role::Admin),
            Err(AppError::Unauthorized(_))
        ));
        // No hierarchy: admin does not satisfy a regular check.
        assert!(matches!(
            require_role(Some(&admin), Role::Regular),
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn extractor_distinguishes_missing_from_invalid() {
        // No Authorization header at all.
        let req = TestRequest::default().to_http_request();
        let err = Identity::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized("no token")));

        // Header present but nothing resolved by the middleware.
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer bogus"))
            .to_http_request();
        let err = Identity::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized("token invalid")));

        // Identity placed in extensions is surfaced.
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer good"))
            .to_http_request();
        req.extensions_mut().insert(identity(Role::Regular));
        let id = Identity::extract(&req).await.unwrap();
        assert_eq!(id.email, "test@example.com");
    }
}
