//! Repository for the `community_settings` key/value table.
//!
//! Settings are loaded fresh on each validating operation so moderator
//! configuration changes take effect immediately. Unknown keys are ignored;
//! malformed values fall back to the compiled defaults with a warning.

use hourbank_core::settings::CommunitySettings;
use sqlx::PgPool;

/// Setting key for the auto-hide toggle.
pub const KEY_AUTO_HIDE_ENABLED: &str = "auto_hide_enabled";
/// Setting key for the auto-downgrade threshold.
pub const KEY_AUTO_DOWNGRADE_THRESHOLD: &str = "auto_downgrade_threshold";
/// Setting key for the appreciation tag set.
pub const KEY_APPRECIATION_TAGS: &str = "appreciation_tags";
/// Setting key for the private-note tag set.
pub const KEY_NOTE_TAGS: &str = "note_tags";
/// Setting key for the flag reason set.
pub const KEY_FLAG_REASONS: &str = "flag_reasons";

/// Provides reads and writes for community settings.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Load the current settings snapshot, starting from defaults and
    /// overlaying every stored key.
    pub async fn load(pool: &PgPool) -> Result<CommunitySettings, sqlx::Error> {
        let rows: Vec<(String, serde_json::Value)> =
            sqlx::query_as("SELECT key, value FROM community_settings")
                .fetch_all(pool)
                .await?;

        let mut settings = CommunitySettings::default();
        for (key, value) in rows {
            match key.as_str() {
                KEY_AUTO_HIDE_ENABLED => {
                    apply(&mut settings.auto_hide_enabled, &key, value);
                }
                KEY_AUTO_DOWNGRADE_THRESHOLD => {
                    apply(&mut settings.auto_downgrade_threshold, &key, value);
                }
                KEY_APPRECIATION_TAGS => {
                    apply(&mut settings.appreciation_tags, &key, value);
                }
                KEY_NOTE_TAGS => {
                    apply(&mut settings.note_tags, &key, value);
                }
                KEY_FLAG_REASONS => {
                    apply(&mut settings.flag_reasons, &key, value);
                }
                _ => {}
            }
        }
        Ok(settings)
    }

    /// Upsert a single setting value.
    pub async fn set(
        pool: &PgPool,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO community_settings (key, value) \
             VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Deserialize a stored value into the settings field, keeping the default
/// on type mismatch.
fn apply<T: serde::de::DeserializeOwned>(slot: &mut T, key: &str, value: serde_json::Value) {
    match serde_json::from_value(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => tracing::warn!(key, error = %e, "Ignoring malformed community setting"),
    }
}
