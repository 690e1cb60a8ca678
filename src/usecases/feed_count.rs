use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{resolve_feed_ids, resolve_subscriber, Scope};
use crate::error::AppResult;
use crate::storage::{MessageQuery, WidgetRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFeedCountCommand {
    pub scope: Scope,
    pub feed_ids: Option<Vec<String>>,
    pub seen: Option<bool>,
    pub read: Option<bool>,
}

/// Count result shared by the count endpoints and the mark-all operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Counts the subscriber's in-app messages; an unset flag does not filter.
pub struct GetFeedCount {
    repo: Arc<dyn WidgetRepository>,
}

impl GetFeedCount {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: GetFeedCountCommand) -> AppResult<CountResponse> {
        let subscriber = resolve_subscriber(self.repo.as_ref(), &cmd.scope).await?;
        let feeds = resolve_feed_ids(self.repo.as_ref(), &cmd.scope, cmd.feed_ids.as_deref()).await?;
        let query = MessageQuery::in_app(cmd.scope.environment_id(), &subscriber.id)
            .with_feeds(feeds)
            .with_seen(cmd.seen)
            .with_read(cmd.read);
        let count = self.repo.count_messages(&query).await?;
        Ok(CountResponse { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{demo_scope, demo_store};

    async fn count(seen: Option<bool>, read: Option<bool>, feeds: Option<Vec<String>>) -> u64 {
        let (_, repo) = demo_store();
        let cmd = GetFeedCountCommand { scope: demo_scope(), feed_ids: feeds, seen, read };
        GetFeedCount::new(repo).execute(cmd).await.unwrap().count
    }

    #[tokio::test]
    async fn counts_by_flag_and_feed() {
        assert_eq!(count(None, None, None).await, 3);
        assert_eq!(count(Some(false), None, None).await, 2);
        assert_eq!(count(Some(true), None, None).await, 1);
        assert_eq!(count(None, Some(false), None).await, 3);
        assert_eq!(count(Some(false), None, Some(vec!["general".into()])).await, 1);
    }
}
