// src/handlers/student.rs

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::{Extension, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::{
        exam::Exam,
        question::{PublicQuestion, Question},
        result::{SubmitExamRequest, SubmitExamResponse, minutes_taken, percentage},
        student::StudentLoginRequest,
    },
    utils::{
        hash::verify_password,
        jwt::{StudentClaims, sign_student_token},
    },
};

/// Submissions are accepted this long past the nominal exam duration, to
/// absorb client auto-submit and network latency.
const SUBMIT_GRACE_SECS: i64 = 60;

/// Row for resolving a student login: the student joined with its exam's
/// active flag and whether a result already exists.
#[derive(Debug, sqlx::FromRow)]
struct LoginCandidate {
    id: i64,
    exam_id: i64,
    student_id: String,
    password: String,
    name: String,
    exam_active: bool,
    has_result: bool,
}

/// Authenticates a student and issues a token bound to one exam attempt.
///
/// Student identifiers are unique per exam, not globally, so the lookup can
/// return several rows. Resolution order: only candidates on an active exam
/// are considered (none active fails as inactive, before any password
/// check); the password must then verify; among verified candidates one
/// without a recorded result wins, newest registration first.
pub async fn student_login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<StudentLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let candidates = sqlx::query_as::<_, LoginCandidate>(
        r#"
        SELECT
            s.id, s.exam_id, s.student_id, s.password, s.name,
            e.is_active AS exam_active,
            EXISTS(
                SELECT 1 FROM student_results r
                WHERE r.student_id = s.id AND r.exam_id = s.exam_id
            ) AS has_result
        FROM students s
        JOIN exams e ON e.id = s.exam_id
        WHERE s.student_id = ?
        ORDER BY s.created_at DESC, s.id DESC
        "#,
    )
    .bind(&payload.student_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Student login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if candidates.is_empty() {
        return Err(AppError::AuthError(
            "Invalid student ID or password".to_string(),
        ));
    }

    let active: Vec<&LoginCandidate> =
        candidates.iter().filter(|c| c.exam_active).collect();

    if active.is_empty() {
        return Err(AppError::Forbidden(
            "This exam is not currently active".to_string(),
        ));
    }

    let mut verified: Vec<&LoginCandidate> = Vec::new();
    for candidate in active {
        if verify_password(&payload.password, &candidate.password)? {
            verified.push(candidate);
        }
    }

    if verified.is_empty() {
        return Err(AppError::AuthError(
            "Invalid student ID or password".to_string(),
        ));
    }

    let chosen = verified
        .iter()
        .find(|c| !c.has_result)
        .copied()
        .unwrap_or(verified[0]);

    if chosen.has_result {
        return Err(AppError::Conflict(
            "You have already completed this exam".to_string(),
        ));
    }

    let token = sign_student_token(
        chosen.id,
        chosen.exam_id,
        &config.jwt_secret,
        config.student_token_secs,
    )?;

    Ok(Json(json!({
        "token": token,
        "examId": chosen.exam_id,
        "student": {
            "id": chosen.id,
            "student_id": chosen.student_id,
            "name": chosen.name,
        },
    })))
}

/// Exam delivery payload: metadata plus the redacted question list.
#[derive(Debug, Serialize)]
struct ExamForStudent {
    #[serde(flatten)]
    exam: Exam,
    questions: Vec<PublicQuestion>,
}

/// Returns the exam bound to the token, questions in display order with
/// the correct option stripped.
pub async fn get_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<StudentClaims>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, claims.exam_id).await?;

    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, exam_id, question_text, option_a, option_b, option_c, option_d,
               correct_option, order_number, created_at
        FROM questions
        WHERE exam_id = ?
        ORDER BY order_number ASC
        "#,
    )
    .bind(exam.id)
    .fetch_all(&pool)
    .await?;

    let questions: Vec<PublicQuestion> =
        questions.into_iter().map(PublicQuestion::from).collect();

    Ok(Json(json!({
        "exam": ExamForStudent { exam, questions },
    })))
}

/// Scores a submission and records the result.
///
/// One pass over the exam's questions; an answer counts only on an exact,
/// case-sensitive match with the stored marker. The UNIQUE(student, exam)
/// index on results is the authoritative double-submission guard: a
/// violation surfaces as 409 no matter how the request got here.
pub async fn submit_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<StudentClaims>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam(&pool, claims.exam_id).await?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as i64;

    if deadline_exceeded(claims.iat as i64, exam.duration_minutes, now) {
        return Err(AppError::Forbidden(
            "Exam time limit exceeded".to_string(),
        ));
    }

    let keys = sqlx::query_as::<_, AnswerKey>(
        r#"
        SELECT id, correct_option
        FROM questions
        WHERE exam_id = ?
        ORDER BY order_number ASC
        "#,
    )
    .bind(exam.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch answer keys: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let score = score_answers(&keys, &payload.answers);
    let total = keys.len() as i64;

    let student_id = claims.sub.parse::<i64>().unwrap_or(0);

    sqlx::query(
        r#"
        INSERT INTO student_results
        (student_id, exam_id, score, total_questions, time_taken_minutes, submitted_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(student_id)
    .bind(exam.id)
    .bind(score)
    .bind(total)
    .bind(minutes_taken(payload.time_taken))
    .bind(Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("You have already completed this exam".to_string())
        } else {
            tracing::error!("Failed to record result: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok(Json(SubmitExamResponse {
        score,
        total_questions: total,
        percentage: percentage(score, total),
    }))
}

async fn fetch_exam(pool: &SqlitePool, exam_id: i64) -> Result<Exam, AppError> {
    sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, title, description, duration_minutes, admin_id, organization_id, is_active, created_at
        FROM exams
        WHERE id = ?
        "#,
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Exam not found".to_string()))
}

/// Answer key row used for scoring.
#[derive(Debug, sqlx::FromRow)]
struct AnswerKey {
    id: i64,
    correct_option: String,
}

fn score_answers(keys: &[AnswerKey], answers: &HashMap<i64, String>) -> i64 {
    keys.iter()
        .filter(|key| {
            answers
                .get(&key.id)
                .is_some_and(|answer| answer == &key.correct_option)
        })
        .count() as i64
}

fn deadline_exceeded(issued_at: i64, duration_minutes: i64, now: i64) -> bool {
    now > issued_at + duration_minutes * 60 + SUBMIT_GRACE_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: i64, correct: &str) -> AnswerKey {
        AnswerKey {
            id,
            correct_option: correct.to_string(),
        }
    }

    #[test]
    fn scores_exact_matches_only() {
        let keys = vec![key(1, "A"), key(2, "B")];
        let mut answers = HashMap::new();
        answers.insert(1, "A".to_string());
        answers.insert(2, "C".to_string());

        assert_eq!(score_answers(&keys, &answers), 1);
        assert_eq!(percentage(1, 2), 50);
    }

    #[test]
    fn missing_and_unknown_answers_do_not_count() {
        let keys = vec![key(1, "A"), key(2, "B"), key(3, "C")];
        let mut answers = HashMap::new();
        answers.insert(1, "A".to_string());
        answers.insert(99, "B".to_string());

        assert_eq!(score_answers(&keys, &answers), 1);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let keys = vec![key(1, "A")];
        let mut answers = HashMap::new();
        answers.insert(1, "a".to_string());

        assert_eq!(score_answers(&keys, &answers), 0);
    }

    #[test]
    fn deadline_allows_duration_plus_grace() {
        let issued = 1_000;
        // 10-minute exam: 600s + 60s grace
        assert!(!deadline_exceeded(issued, 10, issued + 600));
        assert!(!deadline_exceeded(issued, 10, issued + 660));
        assert!(deadline_exceeded(issued, 10, issued + 661));
    }
}
