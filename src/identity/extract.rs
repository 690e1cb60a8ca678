use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use super::{SessionManager, SubscriberSession};
use crate::error::{AppError, ErrorCode};

/// Token from an `Authorization: Bearer <token>` header, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") { return None; }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Session guard: handlers that take a `SubscriberSession` argument answer 401
/// unless the request carries a live bearer token.
impl<S> FromRequestParts<S> for SubscriberSession
where
    S: Send + Sync,
    SessionManager: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionManager::from_ref(state);
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(AppError::auth(ErrorCode::Unauthorized, "Unauthorized"));
        };
        match sessions.validate(token) {
            Some(session) => Ok(session),
            None => {
                tracing::warn!(path = %parts.uri.path(), "rejected unknown or expired subscriber token");
                Err(AppError::auth(ErrorCode::Unauthorized, "Unauthorized"))
            }
        }
    }
}
