//! Signup field checks.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_REGEX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .ok()
});

/// Which signup field failed validation. Each maps to a translation key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidField {
    Email,
    Username,
    PasswordTooShort,
}

impl InvalidField {
    #[must_use]
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::Email => "signup.email-invalid",
            Self::Username => "signup.username-invalid",
            Self::PasswordTooShort => "signup.password-short",
        }
    }
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    !email.is_empty()
        && EMAIL_REGEX
            .as_ref()
            .is_some_and(|regex| regex.is_match(email))
}

/// Check the shape of the signup fields, in the order the form shows them.
///
/// # Errors
/// Returns the first field that is invalid.
pub fn validate_signup(email: &str, username: &str, password: &str) -> Result<(), InvalidField> {
    if !valid_email(email) {
        return Err(InvalidField::Email);
    }
    if username.is_empty() {
        return Err(InvalidField::Username);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(InvalidField::PasswordTooShort);
    }
    Ok(())
}
