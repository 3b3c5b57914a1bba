//! Common validation utilities.

use validator::ValidationError;

/// Largest capacity a coach may publish for a single window.
pub const MAX_SLOT_CAPACITY: i32 = 100;

/// Validates that a slot capacity is within 1..=MAX_SLOT_CAPACITY.
pub fn validate_capacity(capacity: i32) -> Result<(), ValidationError> {
    if (1..=MAX_SLOT_CAPACITY).contains(&capacity) {
        Ok(())
    } else {
        let mut err = ValidationError::new("capacity_range");
        err.message = Some(format!("Capacity must be between 1 and {}", MAX_SLOT_CAPACITY).into());
        Err(err)
    }
}

/// Validates a login username: letters, digits and `@.+-_` only.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_format");
        err.message = Some("Username may only contain letters, digits and @/./+/-/_".into());
        Err(err)
    }
}

/// Returns true when `target` is a same-site path that is safe to redirect to
/// after login.
pub fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
