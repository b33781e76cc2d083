use once_cell::sync::Lazy;
use regex::Regex;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Letters, numbers, combining marks, spaces, dashes, underscores, brackets
/// and quotes. Khmer names need the marks class.
static LEGAL_USERNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}\p{M}\p{Zs}\p{Pd}\p{Pe}\p{Ps}\p{Pi}\p{Pf}_]+$")
        .expect("username pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid username format")]
    InvalidUsername,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Invalid registration key")]
    InvalidRegistrationKey,
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if LEGAL_USERNAME.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername)
    }
}

/// Length is counted in bytes, so multi-byte scripts reach the minimum sooner
pub fn validate_password(password: &str, min_length: usize) -> Result<(), ValidationError> {
    if password.len() < min_length {
        return Err(ValidationError::PasswordTooShort(min_length));
    }
    Ok(())
}

/// Checks run on `POST /register` before touching the database
pub fn validate_registration(
    username: &str,
    password: &str,
    key: &str,
    expected_key: &str,
    min_password_length: usize,
) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_password(password, min_password_length)?;
    if !bool::from(key.as_bytes().ct_eq(expected_key.as_bytes())) {
        return Err(ValidationError::InvalidRegistrationKey);
    }
    Ok(())
}
