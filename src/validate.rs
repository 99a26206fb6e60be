//! Field rules for user payloads.

use crate::store::NewUser;

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 150;

/// The first rule a candidate user breaks.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("name cannot be numbers")]
    NumericName,

    #[error("age out of range")]
    AgeOutOfRange,
}

/// Checks a candidate against the rules in order; the first failure wins.
pub fn validate(user: &NewUser) -> Result<(), ValidationError> {
    if user.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    // Any Unicode digit counts, not only ASCII `0-9`.
    if user.name.chars().all(char::is_numeric) {
        return Err(ValidationError::NumericName);
    }
    if !(MIN_AGE..=MAX_AGE).contains(&user.age) {
        return Err(ValidationError::AgeOutOfRange);
    }
    Ok(())
}
