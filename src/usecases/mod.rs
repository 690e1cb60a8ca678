//! Widget usecases.
//!
//! Every HTTP operation maps to exactly one usecase invocation. A usecase
//! takes one immutable command, talks to the [`WidgetRepository`] and returns
//! an `AppResult`. Commands that act on behalf of a subscriber carry a
//! [`Scope`], which can only be built from an authenticated
//! [`SubscriberSession`], so tenant ids never come from client input.

use std::sync::Arc;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::identity::{SessionManager, SubscriberSession};
use crate::storage::{Subscriber, WidgetRepository};

pub mod initialize_session;
pub mod notifications_feed;
pub mod feed_count;
pub mod mark_message_as;
pub mod mark_all_messages_as;
pub mod remove_message;
pub mod update_message_actions;
pub mod organization_data;
pub mod subscriber_preference;

pub use initialize_session::{InitializeSession, InitializeSessionCommand, SessionInitializeResponse};
pub use notifications_feed::{FeedPage, GetNotificationsFeed, GetNotificationsFeedCommand, FEED_PAGE_SIZE};
pub use feed_count::{CountResponse, GetFeedCount, GetFeedCountCommand};
pub use mark_message_as::{MarkMessageAs, MarkMessageAsCommand};
pub use mark_all_messages_as::{MarkAllKind, MarkAllMessagesAs, MarkAllMessagesAsCommand};
pub use remove_message::{RemoveMessage, RemoveMessageCommand};
pub use update_message_actions::{UpdateMessageActions, UpdateMessageActionsCommand};
pub use organization_data::{GetOrganizationData, GetOrganizationDataCommand, OrganizationResponse};
pub use subscriber_preference::{
    ChannelToggle, GetSubscriberPreference, GetSubscriberPreferenceCommand, PreferenceItem, PreferenceState,
    TemplateSummary, UpdateSubscriberPreference, UpdateSubscriberPreferenceCommand,
};

/// Tenant scope of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    organization_id: String,
    environment_id: String,
    subscriber_id: String,
    subscriber_internal_id: String,
}

impl Scope {
    pub fn organization_id(&self) -> &str { &self.organization_id }
    pub fn environment_id(&self) -> &str { &self.environment_id }
    /// External subscriber id.
    pub fn subscriber_id(&self) -> &str { &self.subscriber_id }
    pub fn subscriber_internal_id(&self) -> &str { &self.subscriber_internal_id }
}

impl From<&SubscriberSession> for Scope {
    fn from(s: &SubscriberSession) -> Self {
        Self {
            organization_id: s.organization_id.clone(),
            environment_id: s.environment_id.clone(),
            subscriber_id: s.subscriber_id.clone(),
            subscriber_internal_id: s.id.clone(),
        }
    }
}

pub(crate) async fn resolve_subscriber(repo: &dyn WidgetRepository, scope: &Scope) -> AppResult<Subscriber> {
    repo.find_subscriber(scope.environment_id(), scope.subscriber_id())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::SubscriberNotFound, format!("Subscriber {} not found", scope.subscriber_id())))
}

/// Map feed tokens (feed id or feed identifier) to feed ids of the scope's environment.
pub(crate) async fn resolve_feed_ids(
    repo: &dyn WidgetRepository,
    scope: &Scope,
    tokens: Option<&[String]>,
) -> AppResult<Option<Vec<String>>> {
    let Some(tokens) = tokens else { return Ok(None); };
    let feeds = repo.find_feeds(scope.environment_id()).await?;
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        match feeds.iter().find(|f| &f.id == t || &f.identifier == t) {
            Some(f) => out.push(f.id.clone()),
            None => return Err(AppError::user(ErrorCode::UnknownFeed, format!("Feed {t} not found"))),
        }
    }
    Ok(Some(out))
}

/// Usecase registry handed to the HTTP layer.
#[derive(Clone)]
pub struct Usecases {
    pub initialize_session: Arc<InitializeSession>,
    pub notifications_feed: Arc<GetNotificationsFeed>,
    pub feed_count: Arc<GetFeedCount>,
    pub mark_message_as: Arc<MarkMessageAs>,
    pub mark_all_messages_as: Arc<MarkAllMessagesAs>,
    pub remove_message: Arc<RemoveMessage>,
    pub update_message_actions: Arc<UpdateMessageActions>,
    pub organization_data: Arc<GetOrganizationData>,
    pub get_preferences: Arc<GetSubscriberPreference>,
    pub update_preference: Arc<UpdateSubscriberPreference>,
}

impl Usecases {
    pub fn new(repo: Arc<dyn WidgetRepository>, sessions: SessionManager) -> Self {
        Self {
            initialize_session: Arc::new(InitializeSession::new(repo.clone(), sessions)),
            notifications_feed: Arc::new(GetNotificationsFeed::new(repo.clone())),
            feed_count: Arc::new(GetFeedCount::new(repo.clone())),
            mark_message_as: Arc::new(MarkMessageAs::new(repo.clone())),
            mark_all_messages_as: Arc::new(MarkAllMessagesAs::new(repo.clone())),
            remove_message: Arc::new(RemoveMessage::new(repo.clone())),
            update_message_actions: Arc::new(UpdateMessageActions::new(repo.clone())),
            organization_data: Arc::new(GetOrganizationData::new(repo.clone())),
            get_preferences: Arc::new(GetSubscriberPreference::new(repo.clone())),
            update_preference: Arc::new(UpdateSubscriberPreference::new(repo)),
        }
    }
}
