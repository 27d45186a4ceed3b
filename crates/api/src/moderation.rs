//! Moderation orchestration: visibility actions, moderator alerts, and the
//! trust-role auto-downgrade.
//!
//! Everything here runs *after* the flag row itself has committed. Alert
//! delivery is best-effort: a failed message send is logged and never rolls
//! back the flag.

use hourbank_core::moderation::FlaggedItemKind;
use hourbank_core::roles::ROLE_LIMITED;
use hourbank_core::settings::CommunitySettings;
use hourbank_core::types::DbId;
use hourbank_db::models::message::TYPE_MOD_ALERT;
use hourbank_db::repositories::{
    AppreciationRepo, FlagRepo, JobRepo, MessageRepo, UserRepo,
};
use hourbank_db::DbPool;
use hourbank_events::bus::EVENT_USER_DOWNGRADED;
use hourbank_events::{EventBus, PlatformEvent};

use crate::error::AppResult;

/// Immediate visibility action applied when a flag is created and auto-hide
/// is enabled. Dispatch is exhaustive over the item kinds: jobs go hidden,
/// appreciations go private, messages are marked read, user flags hide
/// nothing.
pub async fn apply_auto_hide(pool: &DbPool, kind: FlaggedItemKind, item_id: DbId) -> AppResult<()> {
    match kind {
        FlaggedItemKind::Job => {
            JobRepo::set_visibility(pool, item_id, "hidden").await?;
        }
        FlaggedItemKind::Appreciation => {
            AppreciationRepo::set_public(pool, item_id, false).await?;
        }
        FlaggedItemKind::Message => {
            MessageRepo::mark_read(pool, item_id).await?;
        }
        FlaggedItemKind::User => {}
    }
    Ok(())
}

/// Moderator action: suppress the flagged content's visibility.
pub async fn remove_content(pool: &DbPool, kind: FlaggedItemKind, item_id: DbId) -> AppResult<()> {
    apply_auto_hide(pool, kind, item_id).await
}

/// Moderator action: restore the flagged content's visibility. The inverse
/// of [`remove_content`]; messages and user flags have nothing to restore.
pub async fn restore_content(pool: &DbPool, kind: FlaggedItemKind, item_id: DbId) -> AppResult<()> {
    match kind {
        FlaggedItemKind::Job => {
            JobRepo::set_visibility(pool, item_id, "public").await?;
        }
        FlaggedItemKind::Appreciation => {
            AppreciationRepo::set_public(pool, item_id, true).await?;
        }
        FlaggedItemKind::Message | FlaggedItemKind::User => {}
    }
    Ok(())
}

/// Soft visibility gate used by read paths: an item is suppressed when an
/// `open` flag exists for it *and* auto-hide is enabled. This is derived,
/// not stored; the `visibility`/`is_public` columns remain the
/// authoritative immediate-hide markers and both must be honored.
pub async fn is_content_visible(
    pool: &DbPool,
    settings: &CommunitySettings,
    kind: FlaggedItemKind,
    item_id: DbId,
) -> AppResult<bool> {
    if !settings.auto_hide_enabled {
        return Ok(true);
    }
    let flagged = FlagRepo::has_open_flag(pool, kind.as_str(), item_id).await?;
    Ok(!flagged)
}

/// Send a moderation alert to every user holding moderator or admin role.
/// Best-effort: delivery failures are logged and swallowed.
pub async fn alert_moderators(pool: &DbPool, body: &str, related_id: Option<DbId>) {
    let moderators = match UserRepo::list_moderators(pool).await {
        Ok(moderators) => moderators,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load moderator list for alert");
            return;
        }
    };
    for moderator in moderators {
        if let Err(e) =
            MessageRepo::send(pool, None, moderator.id, body, TYPE_MOD_ALERT, related_id).await
        {
            tracing::error!(
                error = %e,
                moderator_id = moderator.id,
                "Failed to deliver moderation alert"
            );
        }
    }
}

/// Re-run the auto-downgrade check for a flagged user.
///
/// Counts flags still open or under review against the user; at or above
/// the configured threshold a plain member is demoted to the limited tier.
/// The role write is conditional (`WHERE role = 'member'`), so repeated
/// checks are a no-op on the role -- but an alert goes out each time the
/// threshold is met, matching the established behaviour (see DESIGN.md).
pub async fn run_auto_downgrade(
    pool: &DbPool,
    event_bus: &EventBus,
    settings: &CommunitySettings,
    user_id: DbId,
) -> AppResult<()> {
    let open_count = FlagRepo::count_open_against_user(pool, user_id).await?;

    let Some(user) = UserRepo::get(pool, user_id).await? else {
        // Flags can implicate ids that no longer resolve; nothing to demote.
        return Ok(());
    };

    if !hourbank_core::moderation::should_downgrade(
        open_count,
        settings.auto_downgrade_threshold,
        &user.role,
    ) {
        // Covers the already-limited case too: the role cannot change again.
        if open_count >= settings.auto_downgrade_threshold && user.role == ROLE_LIMITED {
            alert_moderators(
                pool,
                &format!(
                    "User {} has {open_count} open flags and is already limited",
                    user.username
                ),
                Some(user_id),
            )
            .await;
        }
        return Ok(());
    }

    let changed = UserRepo::downgrade_member(pool, user_id, ROLE_LIMITED).await?;
    if changed {
        tracing::info!(user_id, open_count, "Auto-downgraded user to limited tier");
        event_bus.publish(
            PlatformEvent::new(EVENT_USER_DOWNGRADED)
                .with_source("user", user_id)
                .with_payload(serde_json::json!({ "open_flags": open_count })),
        );
    }

    alert_moderators(
        pool,
        &format!(
            "User {} reached {open_count} open flags and was limited",
            user.username
        ),
        Some(user_id),
    )
    .await;

    Ok(())
}
