// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::admin::{Admin, AdminLoginRequest},
    utils::{hash::verify_password, jwt::sign_admin_token},
};

/// Authenticates an admin and returns a JWT token.
///
/// Verifies the login identifier and password against the database.
/// Deactivated accounts are refused even with correct credentials.
pub async fn admin_login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let admin = sqlx::query_as::<_, Admin>(
        r#"
        SELECT id, admin_id, password, name, organization_id, role, invited_by, is_active, created_at
        FROM admins
        WHERE admin_id = ?
        "#,
    )
    .bind(&payload.admin_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Admin login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let admin = admin.ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    let is_valid = verify_password(&payload.password, &admin.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    if !admin.is_active {
        return Err(AppError::AuthError("Account is deactivated".to_string()));
    }

    let token = sign_admin_token(
        admin.id,
        &admin.admin_id,
        admin.organization_id,
        &admin.role,
        &config.jwt_secret,
        config.admin_token_secs,
    )?;

    Ok(Json(json!({
        "token": token,
        "admin": admin,
    })))
}
