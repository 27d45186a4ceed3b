//! Community-tunable settings.
//!
//! Settings live in the `community_settings` key/value table and are loaded
//! fresh on every validating operation so changes take effect immediately.
//! This struct is the typed view; unknown or missing keys fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};

/// Typed snapshot of the community settings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunitySettings {
    /// Whether flagging content immediately suppresses its visibility.
    pub auto_hide_enabled: bool,
    /// Open-flag count at which a member is demoted to the limited tier.
    pub auto_downgrade_threshold: i64,
    /// Accepted appreciation tag slugs.
    pub appreciation_tags: Vec<String>,
    /// Accepted private-note tag slugs.
    pub note_tags: Vec<String>,
    /// Accepted flag reason slugs.
    pub flag_reasons: Vec<String>,
}

impl Default for CommunitySettings {
    fn default() -> Self {
        Self {
            auto_hide_enabled: true,
            auto_downgrade_threshold: 3,
            appreciation_tags: to_strings(&[
                "helpful",
                "skilled",
                "punctual",
                "friendly",
                "generous",
            ]),
            note_tags: to_strings(&["met", "trusted", "follow_up", "caution"]),
            flag_reasons: to_strings(&[
                "spam",
                "scam",
                "harassment",
                "inappropriate",
                "no_show",
                "other",
            ]),
        }
    }
}

impl CommunitySettings {
    /// Validate an appreciation tag against the configured set.
    pub fn validate_appreciation_tag(&self, tag: &str) -> Result<(), String> {
        validate_slug("appreciation tag", tag, &self.appreciation_tags)
    }

    /// Validate a private-note tag against the configured set.
    pub fn validate_note_tag(&self, tag: &str) -> Result<(), String> {
        validate_slug("note tag", tag, &self.note_tags)
    }

    /// Validate a flag reason against the configured set.
    pub fn validate_flag_reason(&self, reason: &str) -> Result<(), String> {
        validate_slug("flag reason", reason, &self.flag_reasons)
    }
}

fn validate_slug(what: &str, slug: &str, allowed: &[String]) -> Result<(), String> {
    if allowed.iter().any(|a| a == slug) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {what} '{slug}'. Must be one of: {}",
            allowed.join(", ")
        ))
    }
}

fn to_strings(slugs: &[&str]) -> Vec<String> {
    slugs.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tags_validate() {
        let settings = CommunitySettings::default();
        assert!(settings.validate_appreciation_tag("helpful").is_ok());
        assert!(settings.validate_note_tag("trusted").is_ok());
        assert!(settings.validate_flag_reason("spam").is_ok());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let settings = CommunitySettings::default();
        let result = settings.validate_appreciation_tag("legendary");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid appreciation tag"));
    }

    #[test]
    fn test_configured_set_replaces_defaults() {
        let settings = CommunitySettings {
            note_tags: vec!["neighbour".to_string()],
            ..CommunitySettings::default()
        };
        assert!(settings.validate_note_tag("neighbour").is_ok());
        assert!(settings.validate_note_tag("trusted").is_err());
    }

    #[test]
    fn test_default_threshold_is_three() {
        assert_eq!(CommunitySettings::default().auto_downgrade_threshold, 3);
    }
}
