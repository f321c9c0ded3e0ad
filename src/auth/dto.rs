use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Non-blank and at least 8 characters, counted as characters rather
/// than bytes.
pub(crate) fn is_valid_password(password: &str) -> bool {
    !password.trim().is_empty() && password.chars().count() >= 8
}
