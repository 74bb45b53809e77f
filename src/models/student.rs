// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'students' table in the database.
/// A per-exam credentialed identity; the identifier is unique within its
/// exam only, never globally.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,

    pub exam_id: i64,

    /// The identifier the student logs in with.
    pub student_id: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub name: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Registration response: the stored record plus the plaintext credential,
/// echoed exactly once so the admin can distribute it.
#[derive(Debug, Serialize)]
pub struct CreatedStudent {
    #[serde(flatten)]
    pub student: Student,
    pub password: String,
}

/// DTO for registering a student to an exam.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Student ID length must be between 1 and 50 characters."
    ))]
    pub student_id: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for student login.
#[derive(Debug, Deserialize, Validate)]
pub struct StudentLoginRequest {
    #[serde(rename = "studentId")]
    #[validate(length(min = 1, max = 50))]
    pub student_id: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
