// src/models/organization.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'organizations' table in the database.
/// The tenant grouping for admin accounts.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
