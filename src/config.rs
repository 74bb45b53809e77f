// src/config.rs

use dotenvy::dotenv;
use std::env;

const DEFAULT_ADMIN_TOKEN_SECS: u64 = 24 * 60 * 60;
const DEFAULT_STUDENT_TOKEN_SECS: u64 = 4 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,

    /// Admin token lifetime in seconds. Defaults to 24 hours.
    pub admin_token_secs: u64,
    /// Student token lifetime in seconds. Defaults to 4 hours; exams are
    /// timed, so student tokens are deliberately short-lived.
    pub student_token_secs: u64,

    /// Optional first-run owner account, created at startup if absent.
    pub seed_admin_id: Option<String>,
    pub seed_admin_password: Option<String>,
    pub seed_admin_name: Option<String>,
    pub seed_organization: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_token_secs = env::var("ADMIN_TOKEN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ADMIN_TOKEN_SECS);

        let student_token_secs = env::var("STUDENT_TOKEN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_STUDENT_TOKEN_SECS);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            admin_token_secs,
            student_token_secs,
            seed_admin_id: env::var("SEED_ADMIN_ID").ok(),
            seed_admin_password: env::var("SEED_ADMIN_PASSWORD").ok(),
            seed_admin_name: env::var("SEED_ADMIN_NAME").ok(),
            seed_organization: env::var("SEED_ORGANIZATION").ok(),
        }
    }
}
