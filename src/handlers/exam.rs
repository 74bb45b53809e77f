// src/handlers/exam.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
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
        exam::{CreateExamRequest, Exam, ExamWithCount, ToggleExamRequest},
        result::{ExamStats, ResultEntry, ResultRow},
        student::{CreateStudentRequest, CreatedStudent, Student},
    },
    utils::{hash::hash_password, jwt::AdminClaims},
};

fn actor_id(claims: &AdminClaims) -> i64 {
    claims.sub.parse::<i64>().unwrap_or(0)
}

/// Fetches an exam and enforces ownership: the actor must have created it
/// or share its organization. Missing exam is 404, foreign exam is 403.
async fn fetch_owned_exam(
    pool: &SqlitePool,
    exam_id: i64,
    claims: &AdminClaims,
) -> Result<Exam, AppError> {
    let exam = sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, title, description, duration_minutes, admin_id, organization_id, is_active, created_at
        FROM exams
        WHERE id = ?
        "#,
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let owned = exam.admin_id == actor_id(claims)
        || (claims.organization_id.is_some()
            && exam.organization_id == claims.organization_id);

    if !owned {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(exam)
}

/// Creates an exam together with its ordered question list.
///
/// The exam row and all question rows are written in one transaction, so a
/// failure cannot leave an exam without its questions. Order numbers are
/// assigned 1..N in submission order. The exam starts inactive.
pub async fn create_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let exam_id = sqlx::query(
        r#"
        INSERT INTO exams (title, description, duration_minutes, admin_id, organization_id, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.duration_minutes)
    .bind(actor_id(&claims))
    .bind(claims.organization_id)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for (index, question) in payload.questions.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO questions
            (exam_id, question_text, option_a, option_b, option_c, option_d, correct_option, order_number, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(exam_id)
        .bind(&question.question_text)
        .bind(&question.option_a)
        .bind(&question.option_b)
        .bind(&question.option_c)
        .bind(&question.option_d)
        .bind(&question.correct_option)
        .bind(index as i64 + 1)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit exam creation: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let exam = sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, title, description, duration_minutes, admin_id, organization_id, is_active, created_at
        FROM exams
        WHERE id = ?
        "#,
    )
    .bind(exam_id)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "examId": exam_id,
            "exam": exam,
        })),
    ))
}

/// Lists the actor's exams, newest first, with registered student counts.
pub async fn list_exams(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
) -> Result<impl IntoResponse, AppError> {
    let exams = sqlx::query_as::<_, ExamWithCount>(
        r#"
        SELECT
            e.id, e.title, e.description, e.duration_minutes, e.admin_id,
            e.organization_id, e.is_active, e.created_at,
            (SELECT COUNT(*) FROM students s WHERE s.exam_id = e.id) AS student_count
        FROM exams e
        WHERE e.admin_id = ?
        ORDER BY e.created_at DESC, e.id DESC
        "#,
    )
    .bind(actor_id(&claims))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list exams: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(json!({ "exams": exams })))
}

/// Returns one exam with its registered students.
pub async fn get_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_owned_exam(&pool, id, &claims).await?;

    let students = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, exam_id, student_id, password, name, created_at
        FROM students
        WHERE exam_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(exam.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "exam": exam,
        "students": students,
    })))
}

/// Toggles the active flag gating student logins.
pub async fn toggle_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<i64>,
    Json(payload): Json<ToggleExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_owned_exam(&pool, id, &claims).await?;

    sqlx::query("UPDATE exams SET is_active = ? WHERE id = ?")
        .bind(payload.is_active)
        .bind(exam.id)
        .execute(&pool)
        .await?;

    let exam = sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, title, description, duration_minutes, admin_id, organization_id, is_active, created_at
        FROM exams
        WHERE id = ?
        "#,
    )
    .bind(exam.id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "exam": exam })))
}

/// Registers a student to an exam.
///
/// The identifier must be unique within the exam only; the same identifier
/// on another exam is fine. The stored password is hashed; the response
/// echoes the plaintext once so the admin can hand out the credential.
pub async fn add_student(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let exam = fetch_owned_exam(&pool, id, &claims).await?;

    let hashed_password = hash_password(&payload.password)?;

    let student_id = sqlx::query(
        r#"
        INSERT INTO students (exam_id, student_id, password, name, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(exam.id)
    .bind(&payload.student_id)
    .bind(&hashed_password)
    .bind(&payload.name)
    .bind(Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Student ID already exists for this exam".to_string())
        } else {
            tracing::error!("Failed to add student: {:?}", e);
            AppError::from(e)
        }
    })?
    .last_insert_rowid();

    let student = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, exam_id, student_id, password, name, created_at
        FROM students
        WHERE id = ?
        "#,
    )
    .bind(student_id)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "student": CreatedStudent {
                student,
                password: payload.password,
            },
        })),
    ))
}

/// Returns the results listing and exam-wide statistics.
///
/// Statistics cover submitted results only; an exam without submissions
/// reports all-zero stats but still counts registered students.
pub async fn get_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_owned_exam(&pool, id, &claims).await?;

    let rows = sqlx::query_as::<_, ResultRow>(
        r#"
        SELECT
            r.id, s.student_id, s.name AS student_name,
            r.score, r.total_questions, r.time_taken_minutes, r.submitted_at
        FROM student_results r
        JOIN students s ON s.id = r.student_id
        WHERE r.exam_id = ?
        ORDER BY r.submitted_at DESC, r.id DESC
        "#,
    )
    .bind(exam.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch exam results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let total_students =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE exam_id = ?")
            .bind(exam.id)
            .fetch_one(&pool)
            .await?;

    let results: Vec<ResultEntry> = rows.into_iter().map(ResultEntry::from).collect();
    let stats = ExamStats::compute(total_students, &results);

    Ok(Json(json!({
        "exam": exam,
        "results": results,
        "stats": stats,
    })))
}
