//! Shared fixtures for the integration tests.
//!
//! Every test gets its own shared-cache in-memory database, installed as the pool the DI-created
//! `DatabaseConnection` hands out. Tests using it must be `#[serial]`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use di_axum::RouterServiceProviderExtensions;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;
use tower::ServiceExt;
use unmask_api::infrastructure::database::DatabaseConnection;
use uuid::Uuid;

/// Counter for unique test database URIs
static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

pub async fn setup_test_db() -> SqlitePool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_url = format!("sqlite:file:unmask_test{}?mode=memory&cache=shared", db_num);

    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    DatabaseConnection::install_pool(pool.clone());

    pool
}

/// File-backed database for tests that need real lock contention between pooled connections.
/// Keep the returned directory alive for as long as the pool is used.
pub async fn setup_file_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("unmask.db"))
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    DatabaseConnection::install_pool(pool.clone());

    (dir, pool)
}

pub fn cleanup_test_db() {
    DatabaseConnection::clear_installed_pool();
}

/// Create test app - uses the pool installed by `setup_test_db()`
pub fn create_test_app() -> Router {
    let provider = unmask_api::services().build_provider().unwrap();
    unmask_api::router().with_provider(provider)
}

/// Sends one request through a fresh app and returns the status and the JSON body, if any.
pub async fn send(method: &str, uri: &str, user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-User-ID", user.to_string());
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = create_test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

pub async fn insert_profile(pool: &SqlitePool, role: &str, subjects: Option<&str>) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (id, role, name, bio, subjects, created_at) VALUES (?, ?, ?, ?, ?, ?)")
        .bind(id)
        .bind(role)
        .bind(format!("{role} {}", &id.to_string()[..8]))
        .bind(Option::<String>::None)
        .bind(subjects)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn insert_request(pool: &SqlitePool, student_id: Uuid, subject: &str, status: &str) -> Uuid {
    insert_request_at(pool, student_id, subject, status, Utc::now()).await
}

pub async fn insert_request_at(
    pool: &SqlitePool,
    student_id: Uuid,
    subject: &str,
    status: &str,
    created_at: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO requests (id, student_id, title, subject, description, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
        .bind(id)
        .bind(student_id)
        .bind(format!("Help with {subject}"))
        .bind(subject)
        .bind("Midterm next month")
        .bind(status)
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn insert_offer(pool: &SqlitePool, request_id: Uuid, educator_id: Uuid, price: f64) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO offers (id, request_id, educator_id, price, timeline, study_plan, status, created_at) VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)")
        .bind(id)
        .bind(request_id)
        .bind(educator_id)
        .bind(price)
        .bind("2 weeks")
        .bind("Week 1: SQL. Week 2: normalization.")
        .bind(Utc::now() - Duration::seconds(1))
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn insert_conversation(pool: &SqlitePool, request_id: Uuid, student_id: Uuid, educator_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO conversations (id, request_id, student_id, educator_id, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(id)
        .bind(request_id)
        .bind(student_id)
        .bind(educator_id)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn offer_status(pool: &SqlitePool, offer_id: Uuid) -> String {
    let row: (String,) = sqlx::query_as("SELECT status FROM offers WHERE id = ?")
        .bind(offer_id)
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

pub async fn request_status(pool: &SqlitePool, request_id: Uuid) -> String {
    let row: (String,) = sqlx::query_as("SELECT status FROM requests WHERE id = ?")
        .bind(request_id)
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

pub async fn accepted_offer_count(pool: &SqlitePool, request_id: Uuid) -> i64 {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM offers WHERE request_id = ? AND status = 'accepted'")
            .bind(request_id)
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

pub async fn conversation_ids(pool: &SqlitePool, request_id: Uuid) -> Vec<Uuid> {
    let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM conversations WHERE request_id = ?")
        .bind(request_id)
        .fetch_all(pool)
        .await
        .unwrap();
    rows.into_iter().map(|row| row.0).collect()
}
