// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, exam, student, team},
    state::AppState,
    utils::jwt::{admin_auth_middleware, student_auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (admin auth, exam authoring, team, student).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let admin_routes = Router::new()
        .route("/login", post(auth::admin_login))
        // Protected admin routes
        .merge(
            Router::new()
                .route("/exams", get(exam::list_exams).post(exam::create_exam))
                .route("/exams/{id}", get(exam::get_exam))
                .route("/exams/{id}/toggle", patch(exam::toggle_exam))
                .route("/exams/{id}/students", post(exam::add_student))
                .route("/exams/{id}/results", get(exam::get_results))
                .route("/team", get(team::get_team))
                .route("/team/add", post(team::add_member))
                .route("/team/toggle", patch(team::toggle_member))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    admin_auth_middleware,
                )),
        );

    let student_routes = Router::new()
        .route("/login", post(student::student_login))
        // Protected student routes
        .merge(
            Router::new()
                .route("/exam", get(student::get_exam))
                .route("/submit", post(student::submit_exam))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    student_auth_middleware,
                )),
        );

    Router::new()
        .nest("/api/admin", admin_routes)
        .nest("/api/student", student_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
