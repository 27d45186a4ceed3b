//! Integration tests for the job lifecycle compare-and-swap operations.
//!
//! Exercises the repository layer against a real database:
//! - claim exclusivity, sequential and concurrent
//! - release and reclaim
//! - completion minting exactly one exchange, including under a race
//! - the completed-job delete guard

use hourbank_db::models::flag::CreateFlag;
use hourbank_db::models::job::CreateJob;
use hourbank_db::models::user::CreateUser;
use hourbank_db::repositories::{ExchangeRepo, FlagRepo, JobRepo, UserRepo};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash: "argon2-hash-placeholder".to_string(),
            role: None,
        },
    )
    .await
    .expect("user creation should succeed")
    .id
}

async fn seed_job(pool: &PgPool, requester_id: i64, hours: Decimal) -> i64 {
    JobRepo::create(
        pool,
        requester_id,
        &CreateJob {
            title: "Fix the fence".to_string(),
            description: Some("Back garden, two panels".to_string()),
            hours,
        },
    )
    .await
    .expect("job creation should succeed")
    .id
}

// ---------------------------------------------------------------------------
// Claim / release
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_is_exclusive(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let first = seed_user(&pool, "first").await;
    let second = seed_user(&pool, "second").await;
    let job_id = seed_job(&pool, requester, Decimal::new(200, 2)).await;

    assert!(JobRepo::claim(&pool, job_id, first).await.unwrap());
    assert!(!JobRepo::claim(&pool, job_id, second).await.unwrap());

    let job = JobRepo::get(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.provider_id, Some(first));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_claims_have_one_winner(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let first = seed_user(&pool, "first").await;
    let second = seed_user(&pool, "second").await;
    let job_id = seed_job(&pool, requester, Decimal::new(100, 2)).await;

    let (a, b) = tokio::join!(
        JobRepo::claim(&pool, job_id, first),
        JobRepo::claim(&pool, job_id, second),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    assert!(a ^ b, "exactly one concurrent claim must win (a={a}, b={b})");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn release_reopens_job_for_reclaim(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let first = seed_user(&pool, "first").await;
    let second = seed_user(&pool, "second").await;
    let job_id = seed_job(&pool, requester, Decimal::new(150, 2)).await;

    assert!(JobRepo::claim(&pool, job_id, first).await.unwrap());
    assert!(JobRepo::release(&pool, job_id, first).await.unwrap());

    let job = JobRepo::get(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.provider_id, None);

    // Someone else can now claim it.
    assert!(JobRepo::claim(&pool, job_id, second).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn release_by_non_holder_is_noop(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let holder = seed_user(&pool, "holder").await;
    let other = seed_user(&pool, "other").await;
    let job_id = seed_job(&pool, requester, Decimal::new(100, 2)).await;

    assert!(JobRepo::claim(&pool, job_id, holder).await.unwrap());
    assert!(!JobRepo::release(&pool, job_id, other).await.unwrap());

    let job = JobRepo::get(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.provider_id, Some(holder));
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_mints_exactly_one_exchange(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let provider = seed_user(&pool, "provider").await;
    let job_id = seed_job(&pool, requester, Decimal::new(250, 2)).await;
    JobRepo::claim(&pool, job_id, provider).await.unwrap();

    let exchange_id = JobRepo::complete(&pool, job_id, None)
        .await
        .unwrap()
        .expect("first completion should mint an exchange");

    let exchange = ExchangeRepo::get(&pool, exchange_id).await.unwrap().unwrap();
    assert_eq!(exchange.job_id, job_id);
    assert_eq!(exchange.provider_id, provider);
    assert_eq!(exchange.requester_id, requester);
    assert_eq!(exchange.hours, Decimal::new(250, 2));

    // Second completion finds nothing to do.
    assert_eq!(JobRepo::complete(&pool, job_id, None).await.unwrap(), None);
    assert_eq!(ExchangeRepo::count_for_job(&pool, job_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_completions_mint_one_exchange(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let provider = seed_user(&pool, "provider").await;
    let job_id = seed_job(&pool, requester, Decimal::new(300, 2)).await;
    JobRepo::claim(&pool, job_id, provider).await.unwrap();

    let (a, b) = tokio::join!(
        JobRepo::complete(&pool, job_id, None),
        JobRepo::complete(&pool, job_id, None),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    assert!(
        a.is_some() ^ b.is_some(),
        "exactly one concurrent completion must win (a={a:?}, b={b:?})"
    );
    assert_eq!(ExchangeRepo::count_for_job(&pool, job_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_unclaimed_job_is_rejected(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let job_id = seed_job(&pool, requester, Decimal::new(100, 2)).await;

    assert_eq!(JobRepo::complete(&pool, job_id, None).await.unwrap(), None);
    assert_eq!(ExchangeRepo::count_for_job(&pool, job_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hours_override_becomes_hours_of_record(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let provider = seed_user(&pool, "provider").await;
    let job_id = seed_job(&pool, requester, Decimal::new(200, 2)).await;
    JobRepo::claim(&pool, job_id, provider).await.unwrap();

    let exchange_id = JobRepo::complete(&pool, job_id, Some(Decimal::new(350, 2)))
        .await
        .unwrap()
        .unwrap();

    let exchange = ExchangeRepo::get(&pool, exchange_id).await.unwrap().unwrap();
    assert_eq!(exchange.hours, Decimal::new(350, 2));

    let job = JobRepo::get(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.hours, Decimal::new(350, 2));
}

// ---------------------------------------------------------------------------
// Delete guard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn completed_job_cannot_be_deleted(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let provider = seed_user(&pool, "provider").await;
    let job_id = seed_job(&pool, requester, Decimal::new(100, 2)).await;
    JobRepo::claim(&pool, job_id, provider).await.unwrap();
    JobRepo::complete(&pool, job_id, None).await.unwrap().unwrap();

    assert!(!JobRepo::delete(&pool, job_id).await.unwrap());
    assert!(JobRepo::get(&pool, job_id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn open_job_can_be_deleted(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let job_id = seed_job(&pool, requester, Decimal::new(100, 2)).await;

    assert!(JobRepo::delete(&pool, job_id).await.unwrap());
    assert!(JobRepo::get(&pool, job_id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Visibility listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn hidden_jobs_stay_visible_to_their_requester(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let stranger = seed_user(&pool, "stranger").await;
    let job_id = seed_job(&pool, requester, Decimal::new(100, 2)).await;
    JobRepo::set_visibility(&pool, job_id, "hidden").await.unwrap();

    let for_stranger = JobRepo::list_visible(&pool, stranger, false, false, 50, 0)
        .await
        .unwrap();
    assert!(for_stranger.iter().all(|j| j.id != job_id));

    let for_requester = JobRepo::list_visible(&pool, requester, false, false, 50, 0)
        .await
        .unwrap();
    assert!(for_requester.iter().any(|j| j.id == job_id));

    // Moderator view includes it regardless.
    let for_moderator = JobRepo::list_visible(&pool, stranger, true, false, 50, 0)
        .await
        .unwrap();
    assert!(for_moderator.iter().any(|j| j.id == job_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn flag_gate_never_hides_a_job_from_its_parties(pool: PgPool) {
    let requester = seed_user(&pool, "requester").await;
    let provider = seed_user(&pool, "provider").await;
    let reporter = seed_user(&pool, "reporter").await;
    let job_id = seed_job(&pool, requester, Decimal::new(200, 2)).await;
    JobRepo::claim(&pool, job_id, provider).await.unwrap();

    FlagRepo::create(
        &pool,
        reporter,
        &CreateFlag {
            flagged_item_type: "job".to_string(),
            flagged_item_id: job_id,
            flagged_user_id: None,
            reason_slug: "spam".to_string(),
            context_note: None,
        },
    )
    .await
    .unwrap();

    // Gated out for strangers (including the reporter) while the flag is open.
    let for_reporter = JobRepo::list_visible(&pool, reporter, false, true, 50, 0)
        .await
        .unwrap();
    assert!(for_reporter.iter().all(|j| j.id != job_id));

    // Both parties keep seeing their own job, matching the by-id read.
    let for_requester = JobRepo::list_visible(&pool, requester, false, true, 50, 0)
        .await
        .unwrap();
    assert!(for_requester.iter().any(|j| j.id == job_id));

    let for_provider = JobRepo::list_visible(&pool, provider, false, true, 50, 0)
        .await
        .unwrap();
    assert!(for_provider.iter().any(|j| j.id == job_id));
}
