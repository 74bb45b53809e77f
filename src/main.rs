// src/main.rs

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use examportal::config::Config;
use examportal::models::admin::ROLE_OWNER;
use examportal::routes;
use examportal::state::AppState;
use examportal::utils::hash::hash_password;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    // Seed Owner Account
    if let Err(e) = seed_owner_account(&pool, &config).await {
        tracing::error!("Failed to seed owner account: {:?}", e);
    }

    // Create AppState
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

/// Creates the first-run owner account (and its organization) from the
/// SEED_* environment variables, if configured and not already present.
async fn seed_owner_account(
    pool: &SqlitePool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(admin_id), Some(password)) = (&config.seed_admin_id, &config.seed_admin_password)
    else {
        return Ok(());
    };

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM admins WHERE admin_id = ?")
        .bind(admin_id)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding owner account: {}", admin_id);

    let now = chrono::Utc::now();

    let organization_id = match &config.seed_organization {
        Some(org_name) => Some(
            sqlx::query("INSERT INTO organizations (name, created_at) VALUES (?, ?)")
                .bind(org_name)
                .bind(now)
                .execute(pool)
                .await?
                .last_insert_rowid(),
        ),
        None => None,
    };

    let name = config.seed_admin_name.as_deref().unwrap_or("Owner");
    let hashed_password = hash_password(password)?;

    sqlx::query(
        r#"
        INSERT INTO admins (admin_id, password, name, organization_id, role, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(admin_id)
    .bind(&hashed_password)
    .bind(name)
    .bind(organization_id)
    .bind(ROLE_OWNER)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!("Owner account created successfully.");

    Ok(())
}
