//! HTTP-level integration tests for flagging, auto-hide, moderator alerts,
//! the review queue, and the trust-role auto-downgrade.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_user, get_auth, patch_json_auth, post_json_auth, token_for,
};
use hourbank_core::roles::{ROLE_LIMITED, ROLE_MEMBER, ROLE_MODERATOR};
use hourbank_db::repositories::{JobRepo, MessageRepo, UserRepo};
use sqlx::PgPool;

fn flag_body(item_type: &str, item_id: i64, reason: &str) -> serde_json::Value {
    serde_json::json!({
        "flagged_item_type": item_type,
        "flagged_item_id": item_id,
        "reason_slug": reason,
    })
}

async fn create_job_via_api(app: axum::Router, token: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/jobs",
        token,
        serde_json::json!({ "title": "Garden help", "hours": "2.00" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Flag creation and auto-hide
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn flagging_a_job_hides_it_and_alerts_moderators(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let reporter = create_test_user(&pool, "reporter", ROLE_MEMBER).await;
    let moderator = create_test_user(&pool, "mod", ROLE_MODERATOR).await;
    let app = common::build_test_app(pool.clone());

    let job_id = create_job_via_api(app.clone(), &token_for(&alice)).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/flags",
        &token_for(&reporter),
        flag_body("job", job_id, "spam"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "open");
    assert_eq!(json["data"]["reporter_id"], reporter.id);

    // The job went hidden immediately.
    let job = JobRepo::get(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.visibility, "hidden");

    // Strangers can no longer fetch it; moderators can.
    let response = get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &token_for(&reporter)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = get_auth(app, &format!("/api/v1/jobs/{job_id}"), &token_for(&moderator)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The moderator received an alert message.
    let inbox = MessageRepo::list_for_user(&pool, moderator.id, 50, 0).await.unwrap();
    assert!(inbox.iter().any(|m| m.message_type == "mod_alert"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn flag_creation_succeeds_even_when_follow_ons_have_nothing_to_do(pool: PgPool) {
    let reporter = create_test_user(&pool, "reporter", ROLE_MEMBER).await;
    let moderator = create_test_user(&pool, "mod", ROLE_MODERATOR).await;
    let app = common::build_test_app(pool.clone());

    // Neither the job nor the implicated user resolves; auto-hide and the
    // downgrade check find nothing to act on. The report must still land
    // with a 201 -- a failure here would invite retry duplicates.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/flags",
        &token_for(&reporter),
        flag_body("job", 424242, "spam"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let flag_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/flags",
        &token_for(&reporter),
        flag_body("user", 424242, "harassment"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Exactly one flag row per report, both visible in the review queue.
    let response = get_auth(app, "/api/v1/flags?status=open", &token_for(&moderator)).await;
    let json = body_json(response).await;
    let open = json["data"].as_array().unwrap();
    assert_eq!(open.len(), 2);
    assert!(open.iter().any(|f| f["id"] == flag_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_reason_or_kind_fails_validation(pool: PgPool) {
    let reporter = create_test_user(&pool, "reporter", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let token = token_for(&reporter);

    let response =
        post_json_auth(app.clone(), "/api/v1/flags", &token, flag_body("comment", 1, "spam")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response =
        post_json_auth(app, "/api/v1/flags", &token, flag_body("job", 1, "i-dislike-it")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeat_flags_on_one_item_are_rate_limited(pool: PgPool) {
    let reporter = create_test_user(&pool, "reporter", ROLE_MEMBER).await;
    let target = create_test_user(&pool, "target", ROLE_MODERATOR).await;
    let app = common::build_test_app(pool);
    let token = token_for(&reporter);

    for reason in ["spam", "scam", "harassment"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/flags",
            &token,
            flag_body("user", target.id, reason),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Fourth flag on the same item within the window: blocked.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/flags",
        &token,
        flag_body("user", target.id, "other"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");

    // A different item is a different window.
    let response = post_json_auth(
        app,
        "/api/v1/flags",
        &token,
        flag_body("job", 12345, "spam"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Auto-downgrade
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn three_open_flags_downgrade_a_member(pool: PgPool) {
    let reporter = create_test_user(&pool, "reporter", ROLE_MEMBER).await;
    let target = create_test_user(&pool, "target", ROLE_MEMBER).await;
    let _moderator = create_test_user(&pool, "mod", ROLE_MODERATOR).await;
    let app = common::build_test_app(pool.clone());
    let token = token_for(&reporter);

    for (i, reason) in ["spam", "scam"].iter().enumerate() {
        post_json_auth(
            app.clone(),
            "/api/v1/flags",
            &token,
            flag_body("user", target.id, reason),
        )
        .await;
        let user = UserRepo::get(&pool, target.id).await.unwrap().unwrap();
        assert_eq!(user.role, ROLE_MEMBER, "no downgrade after {} flags", i + 1);
    }

    let response = post_json_auth(
        app,
        "/api/v1/flags",
        &token,
        flag_body("user", target.id, "harassment"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let user = UserRepo::get(&pool, target.id).await.unwrap().unwrap();
    assert_eq!(user.role, ROLE_LIMITED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn moderators_are_never_auto_downgraded(pool: PgPool) {
    let reporter = create_test_user(&pool, "reporter", ROLE_MEMBER).await;
    let second_reporter = create_test_user(&pool, "reporter2", ROLE_MEMBER).await;
    let target = create_test_user(&pool, "target", ROLE_MODERATOR).await;
    let app = common::build_test_app(pool.clone());

    for (token, reasons) in [
        (token_for(&reporter), ["spam", "scam"]),
        (token_for(&second_reporter), ["harassment", "other"]),
    ] {
        for reason in reasons {
            post_json_auth(
                app.clone(),
                "/api/v1/flags",
                &token,
                flag_body("user", target.id, reason),
            )
            .await;
        }
    }

    let user = UserRepo::get(&pool, target.id).await.unwrap().unwrap();
    assert_eq!(user.role, ROLE_MODERATOR);
}

// ---------------------------------------------------------------------------
// Review queue and moderator actions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_queue_requires_moderator(pool: PgPool) {
    let member = create_test_user(&pool, "member", ROLE_MEMBER).await;
    let moderator = create_test_user(&pool, "mod", ROLE_MODERATOR).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/flags", &token_for(&member)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/flags?status=open", &token_for(&moderator)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_update_and_content_restore(pool: PgPool) {
    let alice = create_test_user(&pool, "alice", ROLE_MEMBER).await;
    let reporter = create_test_user(&pool, "reporter", ROLE_MEMBER).await;
    let moderator = create_test_user(&pool, "mod", ROLE_MODERATOR).await;
    let app = common::build_test_app(pool.clone());

    let job_id = create_job_via_api(app.clone(), &token_for(&alice)).await;
    let response = post_json_auth(
        app.clone(),
        "/api/v1/flags",
        &token_for(&reporter),
        flag_body("job", job_id, "spam"),
    )
    .await;
    let flag_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Resolve the flag with a note.
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/flags/{flag_id}"),
        &token_for(&moderator),
        serde_json::json!({ "status": "restored", "resolution_note": "false alarm" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "restored");
    assert_eq!(json["data"]["reviewer_id"], moderator.id);
    assert_eq!(json["data"]["resolution_note"], "false alarm");

    // Restore the job's visibility explicitly.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/flags/{flag_id}/restore-content"),
        &token_for(&moderator),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let job = JobRepo::get(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.visibility, "public");

    // Members cannot touch moderation actions.
    let response = patch_json_auth(
        app,
        &format!("/api/v1/flags/{flag_id}"),
        &token_for(&reporter),
        serde_json::json!({ "status": "resolved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
