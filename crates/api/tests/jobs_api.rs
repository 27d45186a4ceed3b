//! HTTP-level integration tests for the job lifecycle endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_user, delete_auth, get_auth, post_json_auth, token_for,
};
use hourbank_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use sqlx::PgPool;

fn job_body(title: &str, hours: &str) -> serde_json::Value {
    serde_json::json!({ "title": title, "description": "help needed", "hours": hours })
}

// ---------------------------------------------------------------------------
// Creation and validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_job_returns_open_public_job(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/jobs", &token_for(&alice), job_body("Fix fence", "2.00")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Fix fence");
    assert_eq!(json["data"]["requester_id"], alice.id);
    assert_eq!(json["data"]["visibility"], "public");
    assert!(json["data"]["provider_id"].is_null());
    assert!(json["data"]["completed_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn job_hours_are_range_checked(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let token = token_for(&alice);

    for bad_hours in ["0.00", "0.10", "100.50", "-1.00"] {
        let response =
            post_json_auth(app.clone(), "/api/v1/jobs", &token, job_body("Bad", bad_hours)).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "hours {bad_hours} must be rejected"
        );
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    // Boundary values pass.
    for good_hours in ["0.25", "100.00"] {
        let response =
            post_json_auth(app.clone(), "/api/v1/jobs", &token, job_body("Good", good_hours)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_title_is_rejected(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/jobs", &token_for(&alice), job_body("   ", "1.00")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn job_creation_is_rate_limited(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let token = token_for(&alice);

    for i in 0..10 {
        let response =
            post_json_auth(app.clone(), "/api/v1/jobs", &token, job_body(&format!("Job {i}"), "1.00"))
                .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = post_json_auth(app, "/api/v1/jobs", &token, job_body("One too many", "1.00")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().get("retry-after").is_some());

    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
    assert!(json["retry_after_secs"].as_i64().unwrap() > 0);
}

// ---------------------------------------------------------------------------
// Claim / release / complete
// ---------------------------------------------------------------------------

async fn create_job_via_api(app: axum::Router, token: &str) -> i64 {
    let response = post_json_auth(app, "/api/v1/jobs", token, job_body("Garden help", "2.00")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_release_reclaim_flow(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let bob = create_test_user(&pool, "bob", ROLE_MEMBER).await;
    let carol = create_test_user(&pool, "carol", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);

    let job_id = create_job_via_api(app.clone(), &token_for(&alice)).await;

    // Requester cannot claim their own job.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/claim"),
        &token_for(&alice),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Bob claims it.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/claim"),
        &token_for(&bob),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["provider_id"], bob.id);

    // Carol is too late.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/claim"),
        &token_for(&carol),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Carol cannot release a job she does not hold.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/release"),
        &token_for(&carol),
        serde_json::json!({ "reason": "nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Bob releases; Carol can now claim.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/release"),
        &token_for(&bob),
        serde_json::json!({ "reason": "schedule clash" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["provider_id"].is_null());

    let response = post_json_auth(
        app,
        &format!("/api/v1/jobs/{job_id}/claim"),
        &token_for(&carol),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_mints_exchange_once(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let bob = create_test_user(&pool, "bob", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);

    let job_id = create_job_via_api(app.clone(), &token_for(&alice)).await;
    post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/claim"),
        &token_for(&bob),
        serde_json::json!({}),
    )
    .await;

    // Only the requester may complete.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/complete"),
        &token_for(&bob),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/complete"),
        &token_for(&alice),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["exchange_id"].is_number());

    // Completing twice conflicts; deleting a completed job conflicts too.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/complete"),
        &token_for(&alice),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(app, &format!("/api/v1/jobs/{job_id}"), &token_for(&alice)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_unclaimed_job_fails_validation(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);

    let job_id = create_job_via_api(app.clone(), &token_for(&alice)).await;
    let response = post_json_auth(
        app,
        &format!("/api/v1/jobs/{job_id}/complete"),
        &token_for(&alice),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hours_override_is_validated_and_applied(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let bob = create_test_user(&pool, "bob", ROLE_MEMBER).await;
    let app = common::build_test_app(pool.clone());

    let job_id = create_job_via_api(app.clone(), &token_for(&alice)).await;
    post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/claim"),
        &token_for(&bob),
        serde_json::json!({}),
    )
    .await;

    // Out-of-range override is rejected before anything commits.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/complete"),
        &token_for(&alice),
        serde_json::json!({ "hours_override": "500.00" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        &format!("/api/v1/jobs/{job_id}/complete"),
        &token_for(&alice),
        serde_json::json!({ "hours_override": "3.50" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let job = hourbank_db::repositories::JobRepo::get(&pool, job_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.hours, rust_decimal::Decimal::new(350, 2));
}

// ---------------------------------------------------------------------------
// Deletion and visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_permissions(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let stranger = create_test_user(&pool, "stranger", ROLE_MEMBER).await;
    let admin = create_test_user(&pool, "admin", ROLE_ADMIN).await;
    let app = common::build_test_app(pool);

    let first = create_job_via_api(app.clone(), &token_for(&alice)).await;
    let second = create_job_via_api(app.clone(), &token_for(&alice)).await;

    let response = delete_auth(app.clone(), &format!("/api/v1/jobs/{first}"), &token_for(&stranger)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &format!("/api/v1/jobs/{first}"), &token_for(&alice)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &format!("/api/v1/jobs/{second}"), &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hidden_job_is_404_for_strangers(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let stranger = create_test_user(&pool, "stranger", ROLE_MEMBER).await;
    let app = common::build_test_app(pool.clone());

    let job_id = create_job_via_api(app.clone(), &token_for(&alice)).await;
    hourbank_db::repositories::JobRepo::set_visibility(&pool, job_id, "hidden")
        .await
        .unwrap();

    let response = get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &token_for(&stranger)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still visible to the requester.
    let response = get_auth(app, &format!("/api/v1/jobs/{job_id}"), &token_for(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
