use std::sync::Arc;

use parking_lot::RwLock;

/// Holder of the authenticated user's token. Set on login, cleared on
/// logout or expiry; components that need the token get a clone of the context.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Arc<RwLock<Option<String>>>,
}

impl SessionContext {
    pub fn new() -> Self { Self::default() }

    pub fn set(&self, token: String) { *self.token.write() = Some(token); }

    pub fn clear(&self) { *self.token.write() = None; }

    pub fn token(&self) -> Option<String> { self.token.read().clone() }

    pub fn is_authenticated(&self) -> bool { self.token.read().is_some() }
}
