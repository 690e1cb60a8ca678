use std::sync::Arc;

use super::*;
use crate::analytics::TracingAnalytics;
use crate::identity::SessionManager;
use crate::storage::seed::{demo_fixture, DEMO_SUBSCRIBER_ID};
use crate::storage::{MemoryStore, WidgetRepository};

fn state() -> AppState {
    let repo: Arc<dyn WidgetRepository> = Arc::new(MemoryStore::from_fixture(demo_fixture()));
    AppState::new(repo, SessionManager::default(), Arc::new(TracingAnalytics))
}

fn session() -> SubscriberSession {
    SubscriberSession {
        id: "sub_demo".into(),
        subscriber_id: DEMO_SUBSCRIBER_ID.into(),
        organization_id: "org_demo".into(),
        environment_id: "env_demo".into(),
    }
}

fn query(q: &str) -> RawQuery { RawQuery(Some(q.to_string())) }

#[test]
fn count_defaults_to_seen_when_no_flag_given() {
    assert_eq!(count_filters(None, None), (Some(true), None));
    assert_eq!(count_filters(Some(false), None), (Some(false), None));
    assert_eq!(count_filters(None, Some(false)), (None, Some(false)));
    assert_eq!(count_filters(Some(true), Some(true)), (Some(true), Some(true)));
}

#[tokio::test]
async fn empty_path_id_is_a_bad_request() {
    let err = mark_message_as_seen(State(state()), session(), Path(String::new())).await.unwrap_err();
    assert_eq!(err.http_status(), 400);
    assert_eq!(err.message(), "messageId is required");

    let err = mark_message_as_read(State(state()), session(), Path(String::new())).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::MessageIdRequired);

    let err = remove_message(State(state()), session(), Path(String::new())).await.unwrap_err();
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn legacy_read_returns_the_single_updated_record_in_an_array() {
    let Json(out) = mark_message_as_read(State(state()), session(), Path("msg_demo_1".into())).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "msg_demo_1");
    assert!(out[0].read && out[0].seen);
}

#[tokio::test]
async fn legacy_paths_split_comma_joined_ids() {
    let st = state();
    let Json(out) = mark_message_as_read(State(st.clone()), session(), Path("msg_demo_1,msg_demo_3".into())).await.unwrap();
    let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["msg_demo_1", "msg_demo_3"]);

    let Json(m) = mark_message_as_seen(State(st), session(), Path("msg_demo_3,msg_demo_1".into())).await.unwrap();
    assert_eq!(m.id, "msg_demo_3");
}

#[tokio::test]
async fn legacy_seen_for_unknown_id_is_not_found() {
    let err = mark_message_as_seen(State(state()), session(), Path("nope".into())).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
    let Json(m) = mark_message_as_seen(State(state()), session(), Path("msg_demo_3".into())).await.unwrap();
    assert!(m.seen);
}

#[tokio::test]
async fn mark_as_requires_message_id() {
    let body = MarkMessageAsBody { message_id: None, mark: MarkFlags::seen() };
    let err = mark_messages_as(State(state()), session(), JsonBody(body)).await.unwrap_err();
    assert_eq!(err.http_status(), 400);
    assert_eq!(err.message(), "messageId is required");

    let body = MarkMessageAsBody { message_id: Some("".into()), mark: MarkFlags::seen() };
    assert!(mark_messages_as(State(state()), session(), JsonBody(body)).await.is_err());
}

#[tokio::test]
async fn mark_as_splits_comma_delimited_ids() {
    let body = MarkMessageAsBody {
        message_id: Some("msg_demo_1,msg_demo_3".into()),
        mark: MarkFlags { seen: Some(true), read: Some(true) },
    };
    let Json(out) = mark_messages_as(State(state()), session(), JsonBody(body)).await.unwrap();
    let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["msg_demo_1", "msg_demo_3"]);
}

#[tokio::test]
async fn counts_follow_the_query_policy() {
    let st = state();
    let Json(c) = get_notifications_count(State(st.clone()), session(), RawQuery(None)).await.unwrap();
    assert_eq!(c.count, 1);
    let Json(c) = get_unseen_count(State(st.clone()), session(), query("seen=false")).await.unwrap();
    assert_eq!(c.count, 2);
    let Json(c) = get_unread_count(State(st.clone()), session(), query("read=false&feedIdentifier=billing")).await.unwrap();
    assert_eq!(c.count, 1);
    let Json(c) = get_unseen_count(State(st.clone()), session(), query("seen=false&feedIdentifier[]=general")).await.unwrap();
    assert_eq!(c.count, 1);
    let err = get_notifications_count(State(st), session(), query("seen=maybe")).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidQuery);
}

#[tokio::test]
async fn mark_all_returns_a_count() {
    let st = state();
    let Json(c) = mark_all_as_seen(State(st.clone()), session(), JsonBody(MarkAllBody::default())).await.unwrap();
    assert_eq!(c.count, 2);
    let body = MarkAllBody { feed_id: Some("billing".into()) };
    let Json(c) = mark_all_as_read(State(st), session(), JsonBody(body)).await.unwrap();
    assert_eq!(c.count, 1);
}

#[tokio::test]
async fn action_type_and_status_are_validated() {
    let body = ActionBody { payload: json!({"ok": 1}), status: Some(crate::storage::ActionStatus::Done) };
    let err = mark_action_as_done(State(state()), session(), Path(("msg_demo_1".into(), "tertiary".into())), JsonBody(body.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 400);

    let missing_status = ActionBody { payload: Value::Null, status: None };
    let err = mark_action_as_done(State(state()), session(), Path(("msg_demo_1".into(), "primary".into())), JsonBody(missing_status))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidBody);

    let Json(m) = mark_action_as_done(State(state()), session(), Path(("msg_demo_1".into(), "secondary".into())), JsonBody(body))
        .await
        .unwrap();
    assert_eq!(m.cta.action.result.button_type, Some(ButtonType::Secondary));
}

#[tokio::test]
async fn usage_log_answers_success() {
    let body = LogUsageBody { name: "Open Widget".into(), payload: None };
    let Json(v) = log_usage(State(state()), session(), JsonBody(body)).await.unwrap();
    assert_eq!(v, json!({"success": true}));

    let err = log_usage(State(state()), session(), JsonBody(LogUsageBody::default())).await.unwrap_err();
    assert_eq!(err.http_status(), 400);
}
