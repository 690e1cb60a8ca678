use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::seed::Fixture;
use super::*;

#[derive(Debug, Default)]
struct Collections {
    environments: HashMap<String, Environment>,
    organizations: HashMap<String, Organization>,
    subscribers: HashMap<String, Subscriber>,
    feeds: Vec<Feed>,
    templates: Vec<NotificationTemplate>,
    preferences: Vec<SubscriberPreference>,
    /// Insertion order is kept so ties on `created_at` stay deterministic.
    messages: Vec<Message>,
}

/// In-memory document store shared by all request handlers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn from_fixture(f: Fixture) -> Self {
        let mut c = Collections::default();
        for e in f.environments { c.environments.insert(e.id.clone(), e); }
        for o in f.organizations { c.organizations.insert(o.id.clone(), o); }
        for s in f.subscribers { c.subscribers.insert(s.id.clone(), s); }
        c.feeds = f.feeds;
        c.templates = f.templates;
        c.preferences = f.preferences;
        c.messages = f.messages;
        Self { inner: Arc::new(RwLock::new(c)) }
    }

    /// Copy of every collection, in fixture shape.
    pub fn snapshot(&self) -> Fixture {
        let c = self.inner.read();
        Fixture {
            environments: c.environments.values().cloned().collect(),
            organizations: c.organizations.values().cloned().collect(),
            subscribers: c.subscribers.values().cloned().collect(),
            feeds: c.feeds.clone(),
            templates: c.templates.clone(),
            preferences: c.preferences.clone(),
            messages: c.messages.clone(),
        }
    }

    pub fn insert_message(&self, message: Message) {
        self.inner.write().messages.push(message);
    }
}

fn select<'a>(messages: &'a [Message], query: &MessageQuery) -> Vec<&'a Message> {
    match &query.ids {
        Some(ids) => {
            let mut seen = HashSet::new();
            ids.iter()
                .filter(|id| seen.insert(id.as_str()))
                .filter_map(|id| messages.iter().find(|m| &m.id == id && query.matches(m)))
                .collect()
        }
        None => {
            let mut out: Vec<&Message> = messages.iter().filter(|m| query.matches(m)).collect();
            // equal timestamps: later inserts first
            out.reverse();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            out
        }
    }
}

#[async_trait]
impl WidgetRepository for MemoryStore {
    async fn find_environment_by_identifier(&self, identifier: &str) -> Result<Option<Environment>> {
        Ok(self.inner.read().environments.values().find(|e| e.identifier == identifier).cloned())
    }

    async fn find_organization(&self, id: &str) -> Result<Option<Organization>> {
        Ok(self.inner.read().organizations.get(id).cloned())
    }

    async fn find_subscriber(&self, environment_id: &str, subscriber_id: &str) -> Result<Option<Subscriber>> {
        let c = self.inner.read();
        Ok(c.subscribers
            .values()
            .find(|s| s.environment_id == environment_id && s.subscriber_id == subscriber_id)
            .cloned())
    }

    async fn find_subscriber_by_id(&self, environment_id: &str, id: &str) -> Result<Option<Subscriber>> {
        Ok(self.inner.read().subscribers.get(id).filter(|s| s.environment_id == environment_id).cloned())
    }

    async fn save_subscriber(&self, subscriber: Subscriber) -> Result<Subscriber> {
        self.inner.write().subscribers.insert(subscriber.id.clone(), subscriber.clone());
        Ok(subscriber)
    }

    async fn find_feeds(&self, environment_id: &str) -> Result<Vec<Feed>> {
        Ok(self.inner.read().feeds.iter().filter(|f| f.environment_id == environment_id).cloned().collect())
    }

    async fn find_messages(&self, query: &MessageQuery, skip: usize, limit: usize) -> Result<Vec<Message>> {
        let c = self.inner.read();
        Ok(select(&c.messages, query).into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count_messages(&self, query: &MessageQuery) -> Result<u64> {
        let c = self.inner.read();
        Ok(c.messages.iter().filter(|m| query.matches(m)).count() as u64)
    }

    async fn update_messages(&self, query: &MessageQuery, update: MessageUpdate<'_>) -> Result<Vec<Message>> {
        let mut c = self.inner.write();
        let targets: Vec<String> = select(&c.messages, query).into_iter().map(|m| m.id.clone()).collect();
        let mut out = Vec::with_capacity(targets.len());
        for id in targets {
            if let Some(m) = c.messages.iter_mut().find(|m| m.id == id) {
                update(m);
                out.push(m.clone());
            }
        }
        Ok(out)
    }

    async fn find_templates(&self, environment_id: &str) -> Result<Vec<NotificationTemplate>> {
        Ok(self.inner.read().templates.iter().filter(|t| t.environment_id == environment_id).cloned().collect())
    }

    async fn find_template(&self, environment_id: &str, id: &str) -> Result<Option<NotificationTemplate>> {
        Ok(self.inner.read().templates.iter().find(|t| t.environment_id == environment_id && t.id == id).cloned())
    }

    async fn find_preferences(&self, environment_id: &str, subscriber_id: &str) -> Result<Vec<SubscriberPreference>> {
        let c = self.inner.read();
        Ok(c.preferences
            .iter()
            .filter(|p| p.environment_id == environment_id && p.subscriber_id == subscriber_id)
            .cloned()
            .collect())
    }

    async fn save_preference(&self, preference: SubscriberPreference) -> Result<SubscriberPreference> {
        let mut c = self.inner.write();
        match c.preferences.iter_mut().find(|p| p.id == preference.id) {
            Some(existing) => *existing = preference.clone(),
            None => c.preferences.push(preference.clone()),
        }
        Ok(preference)
    }
}
