//! Request bodies accepted by the widget routes, plus the `JsonBody`
//! extractor that turns malformed JSON into a 400 `AppError`.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, ErrorCode};
use crate::params::OneOrMany;
use crate::storage::{ActionStatus, MarkFlags};
use crate::usecases::ChannelToggle;

/// JSON request body. An empty body deserializes to `T::default()`.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::user(ErrorCode::InvalidBody, e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::user(ErrorCode::InvalidBody, format!("Invalid request body: {e}")))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionInitializeBody {
    pub subscriber_id: String,
    pub application_identifier: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub hmac_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkMessageAsBody {
    pub message_id: Option<OneOrMany>,
    pub mark: MarkFlags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkAllBody {
    pub feed_id: Option<OneOrMany>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionBody {
    pub payload: Value,
    pub status: Option<ActionStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePreferenceBody {
    pub enabled: Option<bool>,
    pub channel: Option<ChannelToggle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogUsageBody {
    pub name: String,
    pub payload: Option<Map<String, Value>>,
}
