use std::sync::Arc;

use serde::Serialize;

use super::{resolve_feed_ids, resolve_subscriber, Scope};
use crate::error::AppResult;
use crate::storage::{Message, MessageQuery, WidgetRepository};

pub const FEED_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetNotificationsFeedCommand {
    pub scope: Scope,
    pub page: u32,
    pub feed_ids: Option<Vec<String>>,
    pub seen: Option<bool>,
    pub read: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub data: Vec<Message>,
    pub total_count: u64,
    pub page_size: usize,
    pub page: u32,
    pub has_more: bool,
}

pub struct GetNotificationsFeed {
    repo: Arc<dyn WidgetRepository>,
}

impl GetNotificationsFeed {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: GetNotificationsFeedCommand) -> AppResult<FeedPage> {
        let subscriber = resolve_subscriber(self.repo.as_ref(), &cmd.scope).await?;
        let feeds = resolve_feed_ids(self.repo.as_ref(), &cmd.scope, cmd.feed_ids.as_deref()).await?;
        let query = MessageQuery::in_app(cmd.scope.environment_id(), &subscriber.id)
            .with_feeds(feeds)
            .with_seen(cmd.seen)
            .with_read(cmd.read);

        let skip = cmd.page as usize * FEED_PAGE_SIZE;
        let total_count = self.repo.count_messages(&query).await?;
        let data = self.repo.find_messages(&query, skip, FEED_PAGE_SIZE).await?;
        let has_more = (skip + data.len()) < total_count as usize;
        tracing::debug!(subscriber = %subscriber.subscriber_id, page = cmd.page, total_count, "feed");
        Ok(FeedPage { data, total_count, page_size: FEED_PAGE_SIZE, page: cmd.page, has_more })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::storage::{now, ChannelType, MessageCta};
    use crate::usecases::test_support::{demo_scope, demo_store};
    use chrono::Duration;

    fn cmd(page: u32) -> GetNotificationsFeedCommand {
        GetNotificationsFeedCommand { scope: demo_scope(), page, feed_ids: None, seen: None, read: None }
    }

    #[tokio::test]
    async fn first_page_lists_newest_first() {
        let (_, repo) = demo_store();
        let page = GetNotificationsFeed::new(repo).execute(cmd(0)).await.unwrap();
        let ids: Vec<&str> = page.data.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["msg_demo_3", "msg_demo_2", "msg_demo_1"]);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.page_size, FEED_PAGE_SIZE);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn pages_through_more_than_one_page() {
        let (store, repo) = demo_store();
        let base = store.snapshot().messages[0].clone();
        for i in 0..12 {
            let mut m = base.clone();
            m.id = format!("bulk_{i}");
            m.created_at = now() - Duration::hours(1 + i);
            m.cta = MessageCta::default();
            store.insert_message(m);
        }
        let uc = GetNotificationsFeed::new(repo);
        let p0 = uc.execute(cmd(0)).await.unwrap();
        assert_eq!(p0.data.len(), 10);
        assert_eq!(p0.total_count, 15);
        assert!(p0.has_more);
        let p1 = uc.execute(cmd(1)).await.unwrap();
        assert_eq!(p1.data.len(), 5);
        assert!(!p1.has_more);
        let p9 = uc.execute(cmd(9)).await.unwrap();
        assert!(p9.data.is_empty());
    }

    #[tokio::test]
    async fn filters_by_feed_identifier_or_id_and_seen() {
        let (_, repo) = demo_store();
        let uc = GetNotificationsFeed::new(repo);
        let mut c = cmd(0);
        c.feed_ids = Some(vec!["billing".into()]);
        let page = uc.execute(c).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, "msg_demo_3");

        let mut c = cmd(0);
        c.feed_ids = Some(vec!["feed_general".into()]);
        c.seen = Some(false);
        let page = uc.execute(c).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, "msg_demo_1");
    }

    #[tokio::test]
    async fn unknown_feed_is_a_request_error() {
        let (_, repo) = demo_store();
        let mut c = cmd(0);
        c.feed_ids = Some(vec!["general".into(), "does-not-exist".into()]);
        let err = GetNotificationsFeed::new(repo).execute(c).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownFeed);
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn other_channels_stay_out_of_the_feed() {
        let (store, repo) = demo_store();
        let mut email = store.snapshot().messages[0].clone();
        email.id = "email_1".into();
        email.channel = ChannelType::Email;
        store.insert_message(email);
        let page = GetNotificationsFeed::new(repo).execute(cmd(0)).await.unwrap();
        assert!(page.data.iter().all(|m| m.id != "email_1"));
    }
}
