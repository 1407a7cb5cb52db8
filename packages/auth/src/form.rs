//! Email + password form validation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

/// Per-field validation messages. A `None` field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [self.email.as_deref(), self.password.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// Validate the whole form, as done on submit and on blur.
pub fn validate_login_form(email: &str, password: &str) -> Result<(), FormErrors> {
    let errors = FormErrors {
        email: if email.is_empty() {
            Some("Email is required".to_string())
        } else if !EMAIL_RE.is_match(email) {
            Some("Please enter a valid email".to_string())
        } else {
            None
        },
        password: if password.is_empty() {
            Some("Password is required".to_string())
        } else if password.chars().count() < MIN_PASSWORD_LEN {
            Some(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ))
        } else {
            None
        },
    };

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Message for the email field while the user is typing, if any.
pub fn validate_email_live(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        Some("Email is required")
    } else if !EMAIL_RE.is_match(email) {
        Some("Invalid email format")
    } else {
        None
    }
}
