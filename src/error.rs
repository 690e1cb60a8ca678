//! Unified application error model and mapping helpers.
//! Every widget usecase and handler returns `AppResult<T>`; the HTTP layer turns
//! an `AppError` into a JSON body carrying the status, a human message and a
//! stable machine-readable code that clients can branch on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable error codes shared with clients. Renaming a variant is a wire break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MessageIdRequired,
    MessageNotFound,
    SubscriberNotFound,
    TemplateNotFound,
    UnknownFeed,
    InvalidQuery,
    InvalidBody,
    SubscriberIdRequired,
    InvalidApplicationIdentifier,
    InvalidHmac,
    CriticalTemplate,
    PreferenceUpdateEmpty,
    Unauthorized,
    UserNotFound,
    InvalidEmail,
    WrongCredentials,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MessageIdRequired => "message_id_required",
            ErrorCode::MessageNotFound => "message_not_found",
            ErrorCode::SubscriberNotFound => "subscriber_not_found",
            ErrorCode::TemplateNotFound => "template_not_found",
            ErrorCode::UnknownFeed => "unknown_feed",
            ErrorCode::InvalidQuery => "invalid_query",
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::SubscriberIdRequired => "subscriber_id_required",
            ErrorCode::InvalidApplicationIdentifier => "invalid_application_identifier",
            ErrorCode::InvalidHmac => "invalid_hmac",
            ErrorCode::CriticalTemplate => "critical_template",
            ErrorCode::PreferenceUpdateEmpty => "preference_update_empty",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::UserNotFound => "user_not_found",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::WrongCredentials => "wrong_credentials",
            ErrorCode::Internal => "internal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: ErrorCode, message: String },
    NotFound { code: ErrorCode, message: String },
    Auth { code: ErrorCode, message: String },
    Internal { code: ErrorCode, message: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::UserInput { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Internal { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: ErrorCode, msg: S) -> Self { AppError::UserInput { code, message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: ErrorCode, msg: S) -> Self { AppError::NotFound { code, message: msg.into() } }
    pub fn auth<S: Into<String>>(code: ErrorCode, msg: S) -> Self { AppError::Auth { code, message: msg.into() } }
    pub fn internal<S: Into<String>>(msg: S) -> Self { AppError::Internal { code: ErrorCode::Internal, message: msg.into() } }

    /// The request error raised whenever a message identifier is missing.
    pub fn message_id_required() -> Self { Self::user(ErrorCode::MessageIdRequired, "messageId is required") }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Auth { .. } => 401,
            AppError::Internal { .. } => 500,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            AppError::UserInput { .. } => "Bad Request",
            AppError::NotFound { .. } => "Not Found",
            AppError::Auth { .. } => "Unauthorized",
            AppError::Internal { .. } => "Internal Server Error",
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code().as_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = self.code().as_str(), "request failed: {}", self.message());
        }
        let body = serde_json::json!({
            "statusCode": status.as_u16(),
            "error": self.reason(),
            "message": self.message(),
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
