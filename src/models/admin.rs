// src/models/admin.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

/// True for roles allowed to manage team members.
pub fn can_manage_team(role: &str) -> bool {
    role == ROLE_OWNER || role == ROLE_ADMIN
}

/// Represents the 'admins' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,

    /// Unique login identifier (unique across all organizations).
    pub admin_id: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub name: String,

    pub organization_id: Option<i64>,

    /// Team role: 'owner', 'admin' or 'member'.
    pub role: String,

    /// The admin who created this account, if any.
    pub invited_by: Option<i64>,

    /// Deactivated members cannot log in. Owners are never deactivatable.
    pub is_active: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Team listing row: member joined with the inviter's display name.
#[derive(Debug, Serialize, FromRow)]
pub struct TeamMemberRow {
    pub id: i64,
    pub admin_id: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub invited_by_name: Option<String>,
}

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[serde(rename = "adminId")]
    #[validate(length(min = 1, max = 50))]
    pub admin_id: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for adding a team member.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamMemberRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(length(
        min = 3,
        max = 50,
        message = "Admin ID length must be between 3 and 50 characters."
    ))]
    pub admin_id: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    pub role: String,
}

/// DTO for toggling a member's active flag.
#[derive(Debug, Deserialize)]
pub struct ToggleMemberRequest {
    #[serde(rename = "memberId")]
    pub member_id: i64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}
