use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use base64::Engine;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::storage::Subscriber;
use crate::tprintln;

pub type SessionToken = String;

/// Authenticated request context for widget calls.
///
/// The tenant fields are the only source of organization, environment and
/// subscriber scoping for every command built from a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberSession {
    /// Internal subscriber id.
    #[serde(rename = "_id")]
    pub id: String,
    /// External subscriber id.
    pub subscriber_id: String,
    #[serde(rename = "_organizationId")]
    pub organization_id: String,
    #[serde(rename = "_environmentId")]
    pub environment_id: String,
}

impl From<&Subscriber> for SubscriberSession {
    fn from(s: &Subscriber) -> Self {
        Self {
            id: s.id.clone(),
            subscriber_id: s.subscriber_id.clone(),
            organization_id: s.organization_id.clone(),
            environment_id: s.environment_id.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    session: SubscriberSession,
    expires_at: Instant,
}

// 256-bit random token, base64url without padding
fn token_from<F>(fill: F) -> Result<SessionToken>
where
    F: FnOnce(&mut [u8]) -> std::result::Result<(), getrandom::Error>,
{
    let mut buf = [0u8; 32];
    fill(&mut buf).map_err(|e| anyhow!("session token entropy unavailable: {e}"))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

fn gen_token() -> Result<SessionToken> { token_from(getrandom::getrandom) }

/// Issues and validates opaque bearer tokens for subscriber sessions.
#[derive(Clone)]
pub struct SessionManager {
    pub ttl: Duration,
    sessions: Arc<RwLock<HashMap<SessionToken, SessionEntry>>>,
}

impl Default for SessionManager {
    fn default() -> Self { Self::new(Duration::from_secs(24 * 60 * 60)) }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn issue(&self, session: SubscriberSession) -> Result<SessionToken> {
        let token = gen_token()?;
        self.insert(token.clone(), session)?;
        Ok(token)
    }

    /// A live token is never handed to a second session.
    fn insert(&self, token: SessionToken, session: SubscriberSession) -> Result<()> {
        tracing::debug!(subscriber = %session.subscriber_id, ttl_secs = self.ttl.as_secs(), "session.issue");
        let now = Instant::now();
        let mut map = self.sessions.write();
        if map.get(&token).is_some_and(|ent| ent.expires_at > now) {
            bail!("session token collision");
        }
        map.insert(token, SessionEntry { session, expires_at: now + self.ttl });
        Ok(())
    }

    pub fn validate(&self, token: &str) -> Option<SubscriberSession> {
        let now = Instant::now();
        let expired = {
            let map = self.sessions.read();
            match map.get(token) {
                Some(ent) if ent.expires_at > now => return Some(ent.session.clone()),
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.sessions.write().remove(token);
        }
        None
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut map = self.sessions.write();
        let before = map.len();
        map.retain(|_, ent| ent.expires_at > now);
        let removed = before - map.len();
        tprintln!("session.sweep removed={} live={}", removed, map.len());
        removed
    }

    pub fn len(&self) -> usize { self.sessions.read().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Number of live handles onto the shared session map.
    #[cfg(test)]
    pub(crate) fn shared_handles(&self) -> usize { Arc::strong_count(&self.sessions) }
}
