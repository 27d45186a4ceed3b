//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_users_table.sql`.

/// Full community administrator.
pub const ROLE_ADMIN: &str = "admin";

/// Trusted member with moderation capability.
pub const ROLE_MODERATOR: &str = "moderator";

/// Base role every new member starts with.
pub const ROLE_MEMBER: &str = "member";

/// Restricted tier applied by the flag auto-downgrade.
pub const ROLE_LIMITED: &str = "limited";

/// All roles the system recognises.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MODERATOR, ROLE_MEMBER, ROLE_LIMITED];

/// Whether a role carries moderation capability.
pub fn is_moderator(role: &str) -> bool {
    role == ROLE_MODERATOR || role == ROLE_ADMIN
}

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}
