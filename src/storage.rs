//!
//! widget storage module
//! ---------------------
//! The persistence seam for the widget API. Usecases only talk to the
//! [`WidgetRepository`] trait; this crate ships [`MemoryStore`], an in-process
//! document store guarded by a `parking_lot` lock, which is what the server
//! runs with and what the tests exercise.
//!
//! Bulk message updates are applied under a single write lock, so every
//! `update_messages` call is atomic with respect to concurrent requests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod entities;
mod memory;
pub mod seed;

pub use entities::*;
pub use memory::MemoryStore;

/// Selection over one subscriber's messages inside one environment.
///
/// Deleted messages never match. When `ids` is set only those messages are
/// considered and results follow the order of `ids`; otherwise results are
/// ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    pub environment_id: String,
    /// Internal subscriber id.
    pub subscriber_id: String,
    pub channel: ChannelType,
    pub ids: Option<Vec<String>>,
    pub feed_ids: Option<Vec<String>>,
    pub seen: Option<bool>,
    pub read: Option<bool>,
}

impl MessageQuery {
    pub fn in_app(environment_id: &str, subscriber_id: &str) -> Self {
        Self {
            environment_id: environment_id.to_string(),
            subscriber_id: subscriber_id.to_string(),
            channel: ChannelType::InApp,
            ids: None,
            feed_ids: None,
            seen: None,
            read: None,
        }
    }

    pub fn with_ids(mut self, ids: Vec<String>) -> Self { self.ids = Some(ids); self }
    pub fn with_feeds(mut self, feed_ids: Option<Vec<String>>) -> Self { self.feed_ids = feed_ids; self }
    pub fn with_seen(mut self, seen: Option<bool>) -> Self { self.seen = seen; self }
    pub fn with_read(mut self, read: Option<bool>) -> Self { self.read = read; self }

    pub fn matches(&self, m: &Message) -> bool {
        if m.deleted || m.environment_id != self.environment_id || m.subscriber_id != self.subscriber_id {
            return false;
        }
        if m.channel != self.channel { return false; }
        if let Some(ids) = &self.ids {
            if !ids.iter().any(|id| id == &m.id) { return false; }
        }
        if let Some(feeds) = &self.feed_ids {
            match &m.feed_id {
                Some(f) if feeds.iter().any(|x| x == f) => {}
                _ => return false,
            }
        }
        if let Some(seen) = self.seen {
            if m.seen != seen { return false; }
        }
        if let Some(read) = self.read {
            if m.read != read { return false; }
        }
        true
    }
}

/// Mutation applied in place to every selected message.
pub type MessageUpdate<'a> = &'a (dyn Fn(&mut Message) + Send + Sync);

#[async_trait]
pub trait WidgetRepository: Send + Sync {
    async fn find_environment_by_identifier(&self, identifier: &str) -> Result<Option<Environment>>;
    async fn find_organization(&self, id: &str) -> Result<Option<Organization>>;

    /// Look up by external subscriber id.
    async fn find_subscriber(&self, environment_id: &str, subscriber_id: &str) -> Result<Option<Subscriber>>;
    /// Look up by internal id.
    async fn find_subscriber_by_id(&self, environment_id: &str, id: &str) -> Result<Option<Subscriber>>;
    async fn save_subscriber(&self, subscriber: Subscriber) -> Result<Subscriber>;

    async fn find_feeds(&self, environment_id: &str) -> Result<Vec<Feed>>;

    async fn find_messages(&self, query: &MessageQuery, skip: usize, limit: usize) -> Result<Vec<Message>>;
    async fn count_messages(&self, query: &MessageQuery) -> Result<u64>;
    /// Atomically apply `update` to every message matching `query` and return the updated records.
    async fn update_messages(&self, query: &MessageQuery, update: MessageUpdate<'_>) -> Result<Vec<Message>>;

    async fn find_templates(&self, environment_id: &str) -> Result<Vec<NotificationTemplate>>;
    async fn find_template(&self, environment_id: &str, id: &str) -> Result<Option<NotificationTemplate>>;

    async fn find_preferences(&self, environment_id: &str, subscriber_id: &str) -> Result<Vec<SubscriberPreference>>;
    async fn save_preference(&self, preference: SubscriberPreference) -> Result<SubscriberPreference>;
}

/// New document id: 24 lowercase hex chars, the shape clients already handle.
pub fn new_object_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    simple[..24].to_string()
}

pub fn now() -> DateTime<Utc> { Utc::now() }

#[cfg(test)]
#[path = "storage/storage_tests.rs"]
mod tests;
