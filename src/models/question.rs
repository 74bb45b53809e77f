// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'questions' table in the database.
/// Immutable after the authoring transaction.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub exam_id: i64,

    pub question_text: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// The correct option marker: 'A', 'B', 'C' or 'D'.
    pub correct_option: String,

    /// 1-based display position, dense per exam.
    pub order_number: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for sending a question to a student (excludes the correct option).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub exam_id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub order_number: i64,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            exam_id: q.exam_id,
            question_text: q.question_text,
            option_a: q.option_a,
            option_b: q.option_b,
            option_c: q.option_c,
            option_d: q.option_d,
            order_number: q.order_number,
        }
    }
}

/// DTO for one question inside an exam-creation request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Question text length must be between 1 and 1000 characters."
    ))]
    pub question_text: String,
    #[validate(length(min = 1, max = 500))]
    pub option_a: String,
    #[validate(length(min = 1, max = 500))]
    pub option_b: String,
    #[validate(length(min = 1, max = 500))]
    pub option_c: String,
    #[validate(length(min = 1, max = 500))]
    pub option_d: String,
    #[validate(custom(function = validate_correct_option))]
    pub correct_option: String,
}

fn validate_correct_option(marker: &str) -> Result<(), ValidationError> {
    match marker {
        "A" | "B" | "C" | "D" => Ok(()),
        _ => Err(ValidationError::new("correct_option_out_of_range")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(marker: &str) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question_text: "What is 2 + 2?".to_string(),
            option_a: "3".to_string(),
            option_b: "4".to_string(),
            option_c: "5".to_string(),
            option_d: "6".to_string(),
            correct_option: marker.to_string(),
        }
    }

    #[test]
    fn accepts_the_four_markers() {
        for marker in ["A", "B", "C", "D"] {
            assert!(request(marker).validate().is_ok());
        }
    }

    #[test]
    fn rejects_out_of_range_markers() {
        for marker in ["E", "a", "AB", ""] {
            assert!(request(marker).validate().is_err());
        }
    }
}
