//! API Integration Tests
//!
//! Tests the profile, request, offer and conversation endpoints with a real database.
//!
//! Tests are serialized because they share the installed test pool.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::*;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_requires_user_header() {
    let _pool = setup_test_db().await;

    let (status, _) = send("GET", "/conversations", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_onboarding_creates_profile_once() {
    let _pool = setup_test_db().await;
    let user = Uuid::new_v4();

    let (status, json) = send(
        "POST",
        "/profiles",
        Some(user),
        Some(json!({ "role": "educator", "name": "  Ada  ", "bio": "10 years", "subjects": "DBMS, SQL" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], user.to_string());
    assert_eq!(json["name"], "Ada");
    assert_eq!(json["role"], "educator");
    assert_eq!(json["subjects"], "DBMS, SQL");

    let (status, json) = send("GET", "/profiles/me", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bio"], "10 years");

    let (status, _) = send(
        "POST",
        "/profiles",
        Some(user),
        Some(json!({ "role": "student", "name": "Ada again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_student_profile_drops_educator_fields() {
    let _pool = setup_test_db().await;
    let user = Uuid::new_v4();

    let (status, json) = send(
        "POST",
        "/profiles",
        Some(user),
        Some(json!({ "role": "student", "name": "Sam", "bio": "ignored", "subjects": "ignored" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["bio"].is_null());
    assert!(json["subjects"].is_null());

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_missing_profile_is_not_found() {
    let _pool = setup_test_db().await;

    let (status, _) = send("GET", "/profiles/me", Some(Uuid::new_v4()), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_student_creates_and_lists_requests() {
    let pool = setup_test_db().await;
    let student = insert_profile(&pool, "student", None).await;

    let (status, created) = send(
        "POST",
        "/requests",
        Some(student),
        Some(json!({
            "title": "DBMS midterm",
            "subject": "Computer Science",
            "description": "SQL and normalization",
            "curriculum_link": "   ",
            "exam_date": "2026-12-01",
            "budget_min": 500.0,
            "budget_max": 900.0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "open");
    assert_eq!(created["student_id"], student.to_string());
    assert_eq!(created["exam_date"], "2026-12-01");
    assert!(created["curriculum_link"].is_null());

    let (status, json) = send("GET", "/requests", Some(student), None).await;
    assert_eq!(status, StatusCode::OK);
    let requests = json["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["id"], created["id"]);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_request_validation() {
    let pool = setup_test_db().await;
    let student = insert_profile(&pool, "student", None).await;
    let educator = insert_profile(&pool, "educator", None).await;

    let (status, json) = send(
        "POST",
        "/requests",
        Some(student),
        Some(json!({ "title": " ", "subject": "Math", "description": "Algebra" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "invalid_input");

    let (status, _) = send(
        "POST",
        "/requests",
        Some(student),
        Some(json!({ "title": "Algebra", "subject": "Math", "description": "Help", "budget_min": 900.0, "budget_max": 100.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        "POST",
        "/requests",
        Some(educator),
        Some(json!({ "title": "Algebra", "subject": "Math", "description": "Help" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_marketplace_lists_open_requests_for_educators() {
    let pool = setup_test_db().await;
    let student = insert_profile(&pool, "student", None).await;
    let educator = insert_profile(&pool, "educator", Some("dbms, physics")).await;

    let now = Utc::now();
    let older = insert_request_at(&pool, student, "Advanced DBMS", "open", now - Duration::hours(2)).await;
    let newer = insert_request_at(&pool, student, "Organic Chemistry", "open", now - Duration::hours(1)).await;
    insert_request_at(&pool, student, "Physics", "accepted", now).await;
    insert_offer(&pool, older, educator, 400.0).await;

    let (status, json) = send("GET", "/marketplace", Some(educator), None).await;

    assert_eq!(status, StatusCode::OK);
    let requests = json["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["id"], newer.to_string());
    assert_eq!(requests[0]["matches_subjects"], false);
    assert_eq!(requests[0]["already_offered"], false);
    assert_eq!(requests[1]["id"], older.to_string());
    assert_eq!(requests[1]["matches_subjects"], true);
    assert_eq!(requests[1]["already_offered"], true);

    let (status, _) = send("GET", "/marketplace", Some(student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_request_visibility() {
    let pool = setup_test_db().await;
    let owner = insert_profile(&pool, "student", None).await;
    let other_student = insert_profile(&pool, "student", None).await;
    let educator = insert_profile(&pool, "educator", None).await;
    let open = insert_request(&pool, owner, "DBMS", "open").await;
    let accepted = insert_request(&pool, owner, "Physics", "accepted").await;

    let (status, _) = send("GET", &format!("/requests/{open}"), Some(educator), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send("GET", &format!("/requests/{accepted}"), Some(educator), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send("GET", &format!("/requests/{accepted}"), Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "accepted");

    let (status, _) = send("GET", &format!("/requests/{open}"), Some(other_student), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_educator_submits_offer() {
    let pool = setup_test_db().await;
    let student = insert_profile(&pool, "student", None).await;
    let educator = insert_profile(&pool, "educator", None).await;
    let request = insert_request(&pool, student, "DBMS", "open").await;

    let (status, json) = send(
        "POST",
        &format!("/requests/{request}/offers"),
        Some(educator),
        Some(json!({ "price": 500.0, "timeline": "2 weeks", "study_plan": "SQL drills" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["educator_id"], educator.to_string());

    let (status, json) = send("GET", "/offers", Some(educator), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["offers"].as_array().unwrap().len(), 1);

    let (status, json) = send("GET", &format!("/requests/{request}/offers"), Some(student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["offers"][0]["price"], 500.0);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_offer_rules() {
    let pool = setup_test_db().await;
    let student = insert_profile(&pool, "student", None).await;
    let other_student = insert_profile(&pool, "student", None).await;
    let educator = insert_profile(&pool, "educator", None).await;
    let open = insert_request(&pool, student, "DBMS", "open").await;
    let accepted = insert_request(&pool, student, "Physics", "accepted").await;
    let offer = json!({ "price": 500.0, "timeline": "2 weeks", "study_plan": "SQL drills" });

    let (status, _) = send("POST", &format!("/requests/{open}/offers"), Some(student), Some(offer.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send("POST", &format!("/requests/{accepted}/offers"), Some(educator), Some(offer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        "POST",
        &format!("/requests/{open}/offers"),
        Some(educator),
        Some(json!({ "price": -5.0, "timeline": "2 weeks", "study_plan": "SQL drills" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send("GET", &format!("/requests/{open}/offers"), Some(other_student), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_participants_chat_in_conversation() {
    let pool = setup_test_db().await;
    let student = insert_profile(&pool, "student", None).await;
    let educator = insert_profile(&pool, "educator", None).await;
    let outsider = insert_profile(&pool, "educator", None).await;
    let request = insert_request(&pool, student, "DBMS", "accepted").await;
    let conversation = insert_conversation(&pool, request, student, educator).await;
    let uri = format!("/conversations/{conversation}/messages");

    let (status, json) = send("POST", &uri, Some(student), Some(json!({ "content": " Hi! " }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["content"], "Hi!");
    assert_eq!(json["sender_id"], student.to_string());

    let (status, _) = send("POST", &uri, Some(educator), Some(json!({ "content": "Hello" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send("GET", &uri, Some(educator), None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Hi!");

    let (status, _) = send("GET", &uri, Some(outsider), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send("POST", &uri, Some(outsider), Some(json!({ "content": "spam" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send("POST", &uri, Some(student), Some(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send("GET", "/conversations", Some(educator), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["conversations"][0]["id"], conversation.to_string());

    let (status, json) = send("GET", "/conversations", Some(outsider), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["conversations"].as_array().unwrap().len(), 0);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_read_views_join_profiles_and_requests() {
    let pool = setup_test_db().await;
    let student = insert_profile(&pool, "student", None).await;
    let educator = insert_profile(&pool, "educator", Some("dbms, sql")).await;
    let outsider = insert_profile(&pool, "educator", None).await;
    let request = insert_request(&pool, student, "DBMS", "open").await;
    let offer = insert_offer(&pool, request, educator, 500.0).await;
    let educator_name = format!("educator {}", &educator.to_string()[..8]);
    let student_name = format!("student {}", &student.to_string()[..8]);

    let (status, json) = send("GET", &format!("/requests/{request}/offers"), Some(student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["offers"][0]["id"], offer.to_string());
    assert_eq!(json["offers"][0]["educator"]["id"], educator.to_string());
    assert_eq!(json["offers"][0]["educator"]["name"], educator_name);
    assert_eq!(json["offers"][0]["educator"]["subjects"], "dbms, sql");

    let (_, json) = send("GET", &format!("/requests/{request}"), Some(student), None).await;
    assert!(json["accepted_offer"].is_null());
    assert!(json["conversation_id"].is_null());

    let (status, accepted) = send(
        "POST",
        &format!("/requests/{request}/offers/{offer}/accept"),
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversation = accepted["conversation_id"].clone();

    let (status, json) = send("GET", &format!("/requests/{request}"), Some(student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "accepted");
    assert_eq!(json["accepted_offer"]["id"], offer.to_string());
    assert_eq!(json["accepted_offer"]["status"], "accepted");
    assert_eq!(json["conversation_id"], conversation);

    let (status, json) = send("GET", "/offers", Some(educator), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["offers"][0]["status"], "accepted");
    assert_eq!(json["offers"][0]["request"]["id"], request.to_string());
    assert_eq!(json["offers"][0]["request"]["title"], "Help with DBMS");
    assert_eq!(json["offers"][0]["request"]["subject"], "DBMS");

    let (status, json) = send("GET", "/conversations", Some(student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["conversations"][0]["id"], conversation);
    assert_eq!(json["conversations"][0]["request"]["title"], "Help with DBMS");
    assert_eq!(json["conversations"][0]["educator"]["name"], educator_name);

    let uri = format!("/conversations/{}", conversation.as_str().unwrap());
    let (status, json) = send("GET", &uri, Some(educator), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["student"]["id"], student.to_string());
    assert_eq!(json["student"]["name"], student_name);
    assert_eq!(json["request"]["subject"], "DBMS");

    let (status, _) = send("GET", &uri, Some(outsider), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}
