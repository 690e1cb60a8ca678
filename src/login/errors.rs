//! Mapping of server-side login failures onto form fields.

use super::api::ApiFailure;
use super::FieldErrors;
use crate::error::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailureKind {
    AccountMissing,
    InvalidEmail,
    WrongPassword,
}

impl LoginFailureKind {
    fn from_code(code: ErrorCode) -> Option<Self> {
        match code {
            ErrorCode::UserNotFound => Some(Self::AccountMissing),
            ErrorCode::InvalidEmail => Some(Self::InvalidEmail),
            ErrorCode::WrongCredentials => Some(Self::WrongPassword),
            _ => None,
        }
    }

    fn from_message(message: &str) -> Option<Self> {
        match message {
            "User not found" => Some(Self::AccountMissing),
            "email must be an email" => Some(Self::InvalidEmail),
            "Wrong credentials provided" => Some(Self::WrongPassword),
            _ => None,
        }
    }
}

/// A structured code wins; exact server messages are the fallback.
pub fn classify(failure: &ApiFailure) -> Option<LoginFailureKind> {
    failure
        .code
        .as_deref()
        .and_then(ErrorCode::parse)
        .and_then(LoginFailureKind::from_code)
        .or_else(|| LoginFailureKind::from_message(&failure.message))
}

/// Field messages for a failure, plus the banner text when no field applies.
pub fn present(failure: &ApiFailure) -> (FieldErrors, Option<String>) {
    let mut fields = FieldErrors::default();
    match classify(failure) {
        Some(LoginFailureKind::AccountMissing) => fields.email = Some("Account does not exist".into()),
        Some(LoginFailureKind::InvalidEmail) => fields.email = Some("Please provide a valid email".into()),
        Some(LoginFailureKind::WrongPassword) => fields.password = Some("Invalid password".into()),
        None => return (fields, Some(failure.message.clone())),
    }
    (fields, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(message: &str, code: Option<&str>) -> ApiFailure {
        ApiFailure { status: Some(400), message: message.into(), code: code.map(str::to_string) }
    }

    #[test]
    fn known_messages_map_to_fields() {
        let (f, banner) = present(&failure("User not found", None));
        assert_eq!(f.email.as_deref(), Some("Account does not exist"));
        assert!(banner.is_none());

        let (f, _) = present(&failure("email must be an email", None));
        assert_eq!(f.email.as_deref(), Some("Please provide a valid email"));

        let (f, banner) = present(&failure("Wrong credentials provided", None));
        assert_eq!(f.password.as_deref(), Some("Invalid password"));
        assert!(f.email.is_none() && banner.is_none());
    }

    #[test]
    fn codes_take_precedence_over_messages() {
        let kind = classify(&failure("Benutzer nicht gefunden", Some("user_not_found")));
        assert_eq!(kind, Some(LoginFailureKind::AccountMissing));
        let kind = classify(&failure("User not found", Some("wrong_credentials")));
        assert_eq!(kind, Some(LoginFailureKind::WrongPassword));
    }

    #[test]
    fn unknown_failures_become_a_banner() {
        let (f, banner) = present(&failure("Too many attempts", Some("rate_limited")));
        assert_eq!(f, FieldErrors::default());
        assert_eq!(banner.as_deref(), Some("Too many attempts"));
        // matching is exact
        assert!(classify(&failure("user not found", None)).is_none());
    }
}
