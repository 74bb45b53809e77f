// tests/team_tests.rs

use examportal::{config::Config, routes, state::AppState, utils::hash::hash_password};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

async fn spawn_app() -> (String, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "team_test_secret".to_string(),
        rust_log: "error".to_string(),
        admin_token_secs: 600,
        student_token_secs: 600,
        seed_admin_id: None,
        seed_admin_password: None,
        seed_admin_name: None,
        seed_organization: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

async fn insert_organization(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO organizations (name, created_at) VALUES (?, ?)")
        .bind(name)
        .bind(chrono::Utc::now())
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

async fn insert_admin(
    pool: &SqlitePool,
    admin_id: &str,
    password: &str,
    role: &str,
    organization_id: Option<i64>,
) -> i64 {
    let hashed = hash_password(password).unwrap();
    sqlx::query(
        r#"
        INSERT INTO admins (admin_id, password, name, organization_id, role, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(admin_id)
    .bind(&hashed)
    .bind(format!("Admin {}", admin_id))
    .bind(organization_id)
    .bind(role)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

async fn login_admin(client: &reqwest::Client, address: &str, admin_id: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/api/admin/login", address))
        .json(&serde_json::json!({ "adminId": admin_id, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn add_member(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    admin_id: &str,
    role: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/api/admin/team/add", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": format!("Member {}", admin_id),
            "admin_id": admin_id,
            "password": "member-pass",
            "role": role
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn team_listing_shows_members_and_inviter() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let org = insert_organization(&pool, "Acme School").await;
    insert_admin(&pool, "boss", "password123", "owner", Some(org)).await;
    let token = login_admin(&client, &address, "boss", "password123").await;

    let response = add_member(&client, &address, &token, "worker", "member").await;
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["member"]["role"], "member");
    assert_eq!(body["member"]["is_active"], true);

    let response = client
        .get(format!("{}/api/admin/team", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["organization"]["name"], "Acme School");
    assert_eq!(body["currentUserRole"], "owner");

    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    // Oldest first: the owner precedes the invited member
    assert_eq!(members[0]["admin_id"], "boss");
    assert_eq!(members[1]["admin_id"], "worker");
    assert_eq!(members[1]["invited_by_name"], "Admin boss");
}

#[tokio::test]
async fn member_roles_cannot_manage_the_team() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let org = insert_organization(&pool, "Acme School").await;
    let owner_id = insert_admin(&pool, "boss2", "password123", "owner", Some(org)).await;
    insert_admin(&pool, "plain", "password123", "member", Some(org)).await;
    let member_token = login_admin(&client, &address, "plain", "password123").await;

    let response = add_member(&client, &address, &member_token, "newcomer", "member").await;
    assert_eq!(response.status().as_u16(), 403);

    let response = client
        .patch(format!("{}/api/admin/team/toggle", address))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&serde_json::json!({ "memberId": owner_id, "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn only_owners_grant_the_admin_role() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let org = insert_organization(&pool, "Acme School").await;
    insert_admin(&pool, "boss3", "password123", "owner", Some(org)).await;
    insert_admin(&pool, "deputy", "password123", "admin", Some(org)).await;

    let owner_token = login_admin(&client, &address, "boss3", "password123").await;
    let admin_token = login_admin(&client, &address, "deputy", "password123").await;

    // An admin may add members but not other admins
    let response = add_member(&client, &address, &admin_token, "helper", "member").await;
    assert_eq!(response.status().as_u16(), 201);

    let response = add_member(&client, &address, &admin_token, "peer", "admin").await;
    assert_eq!(response.status().as_u16(), 403);

    // The owner may
    let response = add_member(&client, &address, &owner_token, "peer", "admin").await;
    assert_eq!(response.status().as_u16(), 201);

    // Nobody creates owners
    let response = add_member(&client, &address, &owner_token, "usurper", "owner").await;
    assert_eq!(response.status().as_u16(), 403);

    // Login identifiers are globally unique
    let response = add_member(&client, &address, &owner_token, "peer", "member").await;
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn deactivation_locks_members_out_but_never_owners() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let org = insert_organization(&pool, "Acme School").await;
    let owner_id = insert_admin(&pool, "boss4", "password123", "owner", Some(org)).await;
    let member_id = insert_admin(&pool, "temp", "password123", "member", Some(org)).await;
    let owner_token = login_admin(&client, &address, "boss4", "password123").await;

    // Deactivate the member
    let response = client
        .patch(format!("{}/api/admin/team/toggle", address))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "memberId": member_id, "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["member"]["is_active"], false);

    // A deactivated member cannot log in
    let response = client
        .post(format!("{}/api/admin/login", address))
        .json(&serde_json::json!({ "adminId": "temp", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // Owners can never be deactivated
    let response = client
        .patch(format!("{}/api/admin/team/toggle", address))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "memberId": owner_id, "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn toggling_is_scoped_to_the_actor_organization() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let first_org = insert_organization(&pool, "Acme School").await;
    let second_org = insert_organization(&pool, "Rival School").await;
    insert_admin(&pool, "boss5", "password123", "owner", Some(first_org)).await;
    let outsider_id = insert_admin(&pool, "rival", "password123", "member", Some(second_org)).await;
    let owner_token = login_admin(&client, &address, "boss5", "password123").await;

    let response = client
        .patch(format!("{}/api/admin/team/toggle", address))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "memberId": outsider_id, "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
