// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Claims carried by admin tokens (issued at admin login).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminClaims {
    /// Subject - the admin's row id (as string).
    pub sub: String,
    /// The human-facing login identifier.
    pub admin_id: String,
    /// Organization the admin belongs to, if any.
    pub organization_id: Option<i64>,
    /// Team role: 'owner', 'admin' or 'member'.
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Claims carried by student tokens, bound to a single exam attempt.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StudentClaims {
    /// Subject - the student's row id (as string).
    pub sub: String,
    /// The exam this token grants access to.
    pub exam_id: i64,
    /// Issued-at timestamp; the submission deadline is derived from it.
    pub iat: usize,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

fn unix_now() -> Result<usize, AppError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize)
}

/// Signs a token for an authenticated admin.
pub fn sign_admin_token(
    id: i64,
    admin_id: &str,
    organization_id: Option<i64>,
    role: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let now = unix_now()?;
    let claims = AdminClaims {
        sub: id.to_string(),
        admin_id: admin_id.to_owned(),
        organization_id,
        role: role.to_owned(),
        exp: now + expiration_seconds as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Signs a token scoped to one student's attempt at one exam.
pub fn sign_student_token(
    id: i64,
    exam_id: i64,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let now = unix_now()?;
    let claims = StudentClaims {
        sub: id.to_string(),
        exam_id,
        iat: now,
        exp: now + expiration_seconds as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes an admin token.
///
/// A student token fails here: it lacks the admin claim fields.
pub fn verify_admin_token(token: &str, secret: &str) -> Result<AdminClaims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Verifies and decodes a student token.
pub fn verify_student_token(token: &str, secret: &str) -> Result<StudentClaims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

fn bearer_token(req: &Request<Body>) -> Result<&str, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match auth_header {
        Some(header) if header.starts_with("Bearer ") => Ok(&header[7..]),
        _ => Err(AppError::AuthError("Missing bearer token".to_string())),
    }
}

/// Axum Middleware: Admin Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header against the admin
/// claim shape and injects `AdminClaims` into the request extensions.
/// Invalid or missing tokens return 401 without touching the database.
pub async fn admin_auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)?;
    let claims = verify_admin_token(token, &config.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Axum Middleware: Student Authentication.
///
/// Same contract as `admin_auth_middleware`, for the student claim shape.
pub async fn student_auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)?;
    let claims = verify_student_token(token, &config.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
