// src/handlers/team.rs

use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        admin::{
            Admin, CreateTeamMemberRequest, ROLE_ADMIN, ROLE_MEMBER, ROLE_OWNER, TeamMemberRow,
            ToggleMemberRequest, can_manage_team,
        },
        organization::Organization,
    },
    utils::{hash::hash_password, jwt::AdminClaims},
};

/// Loads the acting admin's row. Role checks use the stored role, not the
/// token's, so a role change takes effect before the token expires.
async fn current_admin(pool: &SqlitePool, claims: &AdminClaims) -> Result<Admin, AppError> {
    let id = claims.sub.parse::<i64>().unwrap_or(0);

    sqlx::query_as::<_, Admin>(
        r#"
        SELECT id, admin_id, password, name, organization_id, role, invited_by, is_active, created_at
        FROM admins
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Lists the members of the actor's organization, oldest first, with the
/// inviter's display name resolved.
pub async fn get_team(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
) -> Result<impl IntoResponse, AppError> {
    let current = current_admin(&pool, &claims).await?;

    let members = sqlx::query_as::<_, TeamMemberRow>(
        r#"
        SELECT
            m.id, m.admin_id, m.name, m.role, m.is_active, m.created_at,
            i.name AS invited_by_name
        FROM admins m
        LEFT JOIN admins i ON i.id = m.invited_by
        WHERE m.organization_id IS ?
        ORDER BY m.created_at ASC, m.id ASC
        "#,
    )
    .bind(current.organization_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch team members: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let organization = match current.organization_id {
        Some(org_id) => {
            sqlx::query_as::<_, Organization>(
                "SELECT id, name, created_at FROM organizations WHERE id = ?",
            )
            .bind(org_id)
            .fetch_optional(&pool)
            .await?
        }
        None => None,
    };

    Ok(Json(json!({
        "members": members,
        "organization": organization,
        "currentUserRole": current.role,
    })))
}

/// Creates a team member in the actor's organization.
///
/// Owners and admins may add members; only an owner may grant the admin
/// role, and the owner role is never grantable here. The login identifier
/// is unique across all organizations.
pub async fn add_member(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
    Json(payload): Json<CreateTeamMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let current = current_admin(&pool, &claims).await?;

    if !can_manage_team(&current.role) {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    if payload.role == ROLE_OWNER {
        return Err(AppError::Forbidden(
            "Cannot create owner accounts".to_string(),
        ));
    }

    if payload.role == ROLE_ADMIN && current.role != ROLE_OWNER {
        return Err(AppError::Forbidden(
            "Only owners can create admin members".to_string(),
        ));
    }

    if payload.role != ROLE_ADMIN && payload.role != ROLE_MEMBER {
        return Err(AppError::BadRequest(format!(
            "Unknown role '{}'",
            payload.role
        )));
    }

    let hashed_password = hash_password(&payload.password)?;

    let member_id = sqlx::query(
        r#"
        INSERT INTO admins (admin_id, password, name, organization_id, role, invited_by, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(&payload.admin_id)
    .bind(&hashed_password)
    .bind(&payload.name)
    .bind(current.organization_id)
    .bind(&payload.role)
    .bind(current.id)
    .bind(Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Admin ID already exists".to_string())
        } else {
            tracing::error!("Failed to add team member: {:?}", e);
            AppError::from(e)
        }
    })?
    .last_insert_rowid();

    let member = sqlx::query_as::<_, Admin>(
        r#"
        SELECT id, admin_id, password, name, organization_id, role, invited_by, is_active, created_at
        FROM admins
        WHERE id = ?
        "#,
    )
    .bind(member_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "member": member }))))
}

/// Toggles a member's active flag.
///
/// The target must belong to the actor's organization; owners are never
/// deactivatable.
pub async fn toggle_member(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
    Json(payload): Json<ToggleMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let current = current_admin(&pool, &claims).await?;

    if !can_manage_team(&current.role) {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    let target = sqlx::query_as::<_, Admin>(
        r#"
        SELECT id, admin_id, password, name, organization_id, role, invited_by, is_active, created_at
        FROM admins
        WHERE id = ? AND organization_id IS ?
        "#,
    )
    .bind(payload.member_id)
    .bind(current.organization_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Member not found".to_string()))?;

    if target.role == ROLE_OWNER {
        return Err(AppError::Forbidden("Cannot deactivate owner".to_string()));
    }

    sqlx::query("UPDATE admins SET is_active = ? WHERE id = ?")
        .bind(payload.is_active)
        .bind(target.id)
        .execute(&pool)
        .await?;

    let member = sqlx::query_as::<_, Admin>(
        r#"
        SELECT id, admin_id, password, name, organization_id, role, invited_by, is_active, created_at
        FROM admins
        WHERE id = ?
        "#,
    )
    .bind(target.id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "member": member })))
}
