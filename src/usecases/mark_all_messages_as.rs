use std::sync::Arc;

use super::{resolve_feed_ids, resolve_subscriber, CountResponse, Scope};
use crate::error::AppResult;
use crate::storage::{now, MarkFlags, Message, MessageQuery, WidgetRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkAllKind {
    Read,
    Seen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAllMessagesAsCommand {
    pub scope: Scope,
    pub mark_as: MarkAllKind,
    pub feed_ids: Option<Vec<String>>,
}

pub struct MarkAllMessagesAs {
    repo: Arc<dyn WidgetRepository>,
}

impl MarkAllMessagesAs {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: MarkAllMessagesAsCommand) -> AppResult<CountResponse> {
        let subscriber = resolve_subscriber(self.repo.as_ref(), &cmd.scope).await?;
        let feeds = resolve_feed_ids(self.repo.as_ref(), &cmd.scope, cmd.feed_ids.as_deref()).await?;
        let base = MessageQuery::in_app(cmd.scope.environment_id(), &subscriber.id).with_feeds(feeds);
        let (query, mark) = match cmd.mark_as {
            MarkAllKind::Read => (base.with_read(Some(false)), MarkFlags::read()),
            MarkAllKind::Seen => (base.with_seen(Some(false)), MarkFlags::seen()),
        };
        let ts = now();
        let updated = self.repo.update_messages(&query, &move |m: &mut Message| m.apply_mark(mark, ts)).await?;
        let count = updated.len() as u64;
        tracing::debug!(subscriber = %subscriber.subscriber_id, kind = ?cmd.mark_as, count, "mark all");
        Ok(CountResponse { count })
    }
}
