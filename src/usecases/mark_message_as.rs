use std::sync::Arc;

use super::{resolve_subscriber, Scope};
use crate::error::{AppError, AppResult};
use crate::storage::{now, MarkFlags, Message, MessageQuery, WidgetRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkMessageAsCommand {
    pub scope: Scope,
    pub message_ids: Vec<String>,
    pub mark: MarkFlags,
}

/// Applies a seen/read transition to the listed messages. Ids that do not
/// belong to the subscriber, or are deleted, are skipped; the result keeps the
/// request order.
pub struct MarkMessageAs {
    repo: Arc<dyn WidgetRepository>,
}

impl MarkMessageAs {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: MarkMessageAsCommand) -> AppResult<Vec<Message>> {
        if cmd.message_ids.is_empty() || cmd.message_ids.iter().all(|id| id.is_empty()) {
            return Err(AppError::message_id_required());
        }
        let subscriber = resolve_subscriber(self.repo.as_ref(), &cmd.scope).await?;
        let query = MessageQuery::in_app(cmd.scope.environment_id(), &subscriber.id).with_ids(cmd.message_ids);
        let ts = now();
        let mark = cmd.mark;
        let updated = self.repo.update_messages(&query, &move |m: &mut Message| m.apply_mark(mark, ts)).await?;
        tracing::debug!(subscriber = %subscriber.subscriber_id, updated = updated.len(), ?mark, "mark messages");
        Ok(updated)
    }
}
