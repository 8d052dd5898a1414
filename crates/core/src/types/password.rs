//! Password strength rules applied before registration.

use thiserror::Error;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in characters (bcrypt input limit on the backend).
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// The first rule a candidate password fails.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password is required")]
    Empty,
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,
    #[error("password must contain at least one lower-case letter")]
    MissingLowercase,
    #[error("password must contain at least one upper-case letter")]
    MissingUppercase,
    #[error("password must contain at least one digit")]
    MissingDigit,
    #[error("password must contain at least one symbol")]
    MissingSymbol,
}

/// Validate a new password against the account rules.
///
/// Length is counted in characters, not bytes. Rules are checked in a fixed
/// order and only the first failure is reported.
///
/// # Errors
///
/// Returns the [`PasswordError`] for the first rule that fails.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }

    let mut length = 0usize;
    let (mut lower, mut upper, mut digit, mut symbol) = (false, false, false, false);
    for c in password.chars() {
        length += 1;
        if c.is_lowercase() {
            lower = true;
        } else if c.is_uppercase() {
            upper = true;
        } else if c.is_numeric() {
            digit = true;
        } else if c.is_ascii_punctuation() || is_symbol(c) {
            symbol = true;
        }
    }

    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    if !lower {
        return Err(PasswordError::MissingLowercase);
    }
    if !upper {
        return Err(PasswordError::MissingUppercase);
    }
    if !digit {
        return Err(PasswordError::MissingDigit);
    }
    if !symbol {
        return Err(PasswordError::MissingSymbol);
    }
    Ok(())
}

/// Non-ASCII punctuation and symbols (e.g. `€`, `«`, `،`).
fn is_symbol(c: char) -> bool {
    !c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()
}
