//! Authentication API client used by the login form.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

/// A failed login call. `status` is `None` when the request never got an
/// HTTP response (connection refused, timeout, bad body).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub message: String,
    pub code: Option<String>,
}

impl ApiFailure {
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self { status: None, message: message.into(), code: None }
    }

    /// Validation-class failures are shown to the user but not reported.
    pub fn is_validation(&self) -> bool { self.status == Some(400) }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a session token.
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiFailure>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenBody {
    Plain { token: String },
    Wrapped { data: TokenData },
}

#[derive(Debug, Deserialize)]
struct TokenData {
    token: String,
}

/// Error body as sent by the API: `message` is a string or a list of strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: Value,
    error: Option<String>,
    code: Option<String>,
}

pub(crate) fn failure_from_body(status: u16, body: &[u8]) -> ApiFailure {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = match parsed.message {
        Value::String(s) => s,
        Value::Array(items) => items.first().and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        _ => parsed.error.unwrap_or_else(|| format!("HTTP {status}")),
    };
    ApiFailure { status: Some(status), message, code: parsed.code }
}

#[derive(Clone)]
pub struct HttpAuthApi {
    login_url: Url,
    client: reqwest::Client,
}

impl HttpAuthApi {
    pub fn new(api_root: &str) -> anyhow::Result<Self> {
        let login_url = Url::parse(&format!("{}/v1/auth/login", api_root.trim_end_matches('/')))
            .map_err(|e| anyhow::anyhow!("invalid API root {api_root}: {e}"))?;
        Ok(Self { login_url, client: reqwest::Client::new() })
    }

    pub fn login_url(&self) -> &Url { &self.login_url }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiFailure> {
        let resp = self
            .client
            .post(self.login_url.clone())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ApiFailure::transport(e.to_string()))?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| ApiFailure::transport(e.to_string()))?;
        if !status.is_success() {
            return Err(failure_from_body(status.as_u16(), &body));
        }
        match serde_json::from_slice::<TokenBody>(&body) {
            Ok(TokenBody::Plain { token }) | Ok(TokenBody::Wrapped { data: TokenData { token } }) => Ok(token),
            Err(e) => Err(ApiFailure { status: Some(status.as_u16()), message: format!("unexpected login response: {e}"), code: None }),
        }
    }
}
