/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login, token refresh
/// - `users`: Own profile and password, admin user lookup
/// - `articles`: Article listing, detail and mutations
/// - `categories` / `tags`: Public listings and admin management
/// - `comments`: Article comments
/// - `upload`: File upload

pub mod articles;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod health;
pub mod tags;
pub mod upload;
pub mod users;

use validator::{ValidateEmail, ValidationError};

/// Accepts an empty string or a well-formed address
pub(crate) fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email format".into());
        Err(err)
    }
}

/// Empty strings mean "leave unchanged"
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_optional_email() {
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("a@example.com").is_ok());
        assert!(validate_optional_email("not-an-email").is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
