//! User HTTP handlers: signup, login, current identity.

use actix_web::{get, post, web, HttpResponse};

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::middleware::auth::issue_token;
use crate::models::{AuthResponse, Identity, LoginRequest, SignupRequest};
use crate::repository::UserRepository;

/// Configure user routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .service(signup)
            .service(login)
            .service(me),
    );
}

/// Register a new account and return its identity plus a fresh token.
#[post("/signup")]
async fn signup(
    repo: web::Data<UserRepository>,
    config: web::Data<Config>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let new = body.into_inner().validate().map_err(AppError::Validation)?;
    let user = repo.create(&new).await?;
    let token = issue_token(user.id, &config.jwt_secret).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        AppError::Internal
    })?;

    Ok(HttpResponse::Created().json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        token,
    }))
}

/// Authenticate and return identity plus a fresh token.
#[post("/login")]
async fn login(
    repo: web::Data<UserRepository>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let user = repo
        .find_by_email(&body.email)
        .await?
        .filter(|u| u.verify_password(&body.password))
        .ok_or(AppError::Unauthorized("invalid email or password"))?;

    let token = issue_token(user.id, &config.jwt_secret).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        AppError::Internal
    })?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        token,
    }))
}

/// Current authenticated identity; 401 without a valid bearer token.
#[get("/me")]
async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(identity))
}
