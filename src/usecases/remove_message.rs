use std::sync::Arc;

use super::{resolve_subscriber, Scope};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::storage::{Message, MessageQuery, WidgetRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveMessageCommand {
    pub scope: Scope,
    pub message_id: String,
}

/// Soft delete: the record stays in the store with `deleted` set.
pub struct RemoveMessage {
    repo: Arc<dyn WidgetRepository>,
}

impl RemoveMessage {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: RemoveMessageCommand) -> AppResult<Message> {
        if cmd.message_id.is_empty() {
            return Err(AppError::message_id_required());
        }
        let subscriber = resolve_subscriber(self.repo.as_ref(), &cmd.scope).await?;
        let query = MessageQuery::in_app(cmd.scope.environment_id(), &subscriber.id).with_ids(vec![cmd.message_id.clone()]);
        let removed = self.repo.update_messages(&query, &|m: &mut Message| m.deleted = true).await?;
        removed
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(ErrorCode::MessageNotFound, format!("Message with id: {} not found", cmd.message_id)))
    }
}
