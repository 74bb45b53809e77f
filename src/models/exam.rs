// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::CreateQuestionRequest;

/// Represents the 'exams' table in the database.
/// Created inactive; the activation toggle gates student logins.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i64,
    pub admin_id: i64,
    pub organization_id: Option<i64>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Exam listing row with the number of registered students.
#[derive(Debug, Serialize, FromRow)]
pub struct ExamWithCount {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i64,
    pub admin_id: i64,
    pub organization_id: Option<i64>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub student_count: i64,
}

/// DTO for creating an exam together with its ordered question list.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 characters."
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes."))]
    pub duration_minutes: i64,
    #[validate(length(min = 1, message = "An exam needs at least one question."), nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

/// DTO for the activation toggle.
#[derive(Debug, Deserialize)]
pub struct ToggleExamRequest {
    pub is_active: bool,
}
