use std::sync::Arc;

use serde_json::Value;

use super::{resolve_subscriber, Scope};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::storage::{ActionResult, ActionStatus, ButtonType, Message, MessageQuery, WidgetRepository};

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateMessageActionsCommand {
    pub scope: Scope,
    pub message_id: String,
    pub button_type: ButtonType,
    pub payload: Value,
    pub status: ActionStatus,
}

pub struct UpdateMessageActions {
    repo: Arc<dyn WidgetRepository>,
}

impl UpdateMessageActions {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: UpdateMessageActionsCommand) -> AppResult<Message> {
        if cmd.message_id.is_empty() {
            return Err(AppError::message_id_required());
        }
        let subscriber = resolve_subscriber(self.repo.as_ref(), &cmd.scope).await?;
        let query = MessageQuery::in_app(cmd.scope.environment_id(), &subscriber.id).with_ids(vec![cmd.message_id.clone()]);
        let (status, button_type, payload) = (cmd.status, cmd.button_type, cmd.payload);
        let apply = move |m: &mut Message| {
            m.cta.action.status = Some(status);
            m.cta.action.result = ActionResult { payload: payload.clone(), button_type: Some(button_type) };
        };
        let updated = self.repo.update_messages(&query, &apply).await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(ErrorCode::MessageNotFound, format!("Message with id: {} not found", cmd.message_id)))
    }
}
