//! HTTP-level integration tests for the create and list endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, jane_doe, post_json, post_raw};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_returns_201_with_persisted_submission(pool: PgPool) {
    let response = post_json(build_test_app(pool), "/create", jane_doe()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Data created successfully");
    assert_eq!(json["data"]["name"], "Jane Doe");
    assert_eq!(json["data"]["educationLevel"], "Bachelor’s Degree");
    assert!(json["data"]["id"].as_i64().unwrap() > 0);
    assert!(json["data"]["createdAt"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_is_also_served_under_api_v1(pool: PgPool) {
    let response = post_json(build_test_app(pool), "/api/v1/create", jane_doe()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_experience_list_returns_400(pool: PgPool) {
    let mut body = jane_doe();
    body["experienceList"] = json!([]);

    let response = post_json(build_test_app(pool.clone()), "/create", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "All required fields must be provided");
    assert!(json["errors"]["experienceList"].is_string());

    let list = body_json(get(build_test_app(pool), "/get-data").await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_consent_returns_400(pool: PgPool) {
    let mut body = jane_doe();
    body.as_object_mut().unwrap().remove("dataConsent");

    let response = post_json(build_test_app(pool), "/create", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["errors"]["dataConsent"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn experience_entry_without_years_returns_400(pool: PgPool) {
    let mut body = jane_doe();
    body["experienceList"] = json!([{"organization": "ABC School"}]);

    let response = post_json(build_test_app(pool), "/create", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["errors"]["experienceList[0].years"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_job_type_returns_400(pool: PgPool) {
    let mut body = jane_doe();
    body["jobType"] = json!("Freelance");

    let response = post_json(build_test_app(pool), "/create", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_returns_400_envelope(pool: PgPool) {
    let response = post_raw(build_test_app(pool), "/create", "{\"name\": ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_returns_created_submissions(pool: PgPool) {
    for name in ["Jane Doe", "John Roe"] {
        let mut body = jane_doe();
        body["name"] = json!(name);
        let response = post_json(build_test_app(pool.clone()), "/create", body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    for uri in ["/get-data", "/api/v1/get-data"] {
        let response = get(build_test_app(pool.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let data = json["data"].as_array().expect("data should be an array");
        assert_eq!(data.len(), 2);
        assert!(data.iter().any(|s| s["name"] == "John Roe"));
        assert_eq!(data[0]["experienceList"][0]["organization"], "ABC School");
    }
}
