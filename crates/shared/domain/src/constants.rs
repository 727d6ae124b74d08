//! Domain-level constants.
//!
//! These constants define forum business rules shared by every repository.

// =============================================================================
// Roles
// =============================================================================

/// Role granting moderation rights
pub const ROLE_MODERATOR: &str = "Moderator";

/// Role granting full administrative rights
pub const ROLE_ADMINISTRATOR: &str = "Administrator";

/// Roles that make a user part of the forum staff
pub const STAFF_ROLES: &[&str] = &[ROLE_MODERATOR, ROLE_ADMINISTRATOR];

/// Check if a role name is a staff role (case-insensitive)
pub fn is_staff_role(role: &str) -> bool {
    STAFF_ROLES.iter().any(|staff| staff.eq_ignore_ascii_case(role))
}

// =============================================================================
// Activity log
// =============================================================================

/// Activity type recorded when a user receives a warning
pub const ACTIVITY_WARNING: &str = "Warning";

/// Activity type recorded when a user is banned
pub const ACTIVITY_BAN: &str = "Ban";

/// Activity types that count as offenses
pub const OFFENSE_ACTIVITIES: &[&str] = &[ACTIVITY_WARNING, ACTIVITY_BAN];

/// Check if an activity type is an offense (case-insensitive)
pub fn is_offense(activity_type: &str) -> bool {
    OFFENSE_ACTIVITIES
        .iter()
        .any(|offense| offense.eq_ignore_ascii_case(activity_type))
}

// =============================================================================
// Presence & pagination
// =============================================================================

/// Trailing window in which a user counts as logged in
pub const DEFAULT_PRESENCE_WINDOW_MINUTES: i64 = 10;

/// Default number of replies per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// First page number (1-indexed)
pub const FIRST_PAGE: u64 = 1;
