//! Widget route handlers. Each handler shapes request parameters into one
//! command and invokes one usecase; tenant ids come only from the session.

use axum::extract::{Path, RawQuery, State};
use axum::Json;
use serde_json::{json, Value};

use super::dto::*;
use super::AppState;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::identity::SubscriberSession;
use crate::params::{normalize, OneOrMany, QueryParams};
use crate::storage::{ButtonType, MarkFlags, Message};
use crate::usecases::*;

const FEED_IDENTIFIER: &str = "feedIdentifier";

pub async fn session_initialize(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SessionInitializeBody>,
) -> AppResult<Json<SessionInitializeResponse>> {
    let cmd = InitializeSessionCommand {
        subscriber_id: body.subscriber_id,
        application_identifier: body.application_identifier,
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        hmac_hash: body.hmac_hash,
    };
    let resp = state.usecases.initialize_session.execute(cmd).await?;
    tracing::info!(subscriber = %resp.profile.subscriber_id, environment = %resp.profile.environment_id, "session initialized");
    Ok(Json(resp))
}

pub async fn get_notifications_feed(
    State(state): State<AppState>,
    session: SubscriberSession,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<FeedPage>> {
    let q = QueryParams::parse(raw.as_deref());
    let cmd = GetNotificationsFeedCommand {
        scope: Scope::from(&session),
        page: q.page("page")?,
        feed_ids: q.ids(FEED_IDENTIFIER),
        seen: q.flag("seen")?,
        read: q.flag("read")?,
    };
    Ok(Json(state.usecases.notifications_feed.execute(cmd).await?))
}

async fn count(state: &AppState, session: &SubscriberSession, q: &QueryParams, seen: Option<bool>, read: Option<bool>) -> AppResult<Json<CountResponse>> {
    let cmd = GetFeedCountCommand { scope: Scope::from(session), feed_ids: q.ids(FEED_IDENTIFIER), seen, read };
    Ok(Json(state.usecases.feed_count.execute(cmd).await?))
}

pub async fn get_unseen_count(
    State(state): State<AppState>,
    session: SubscriberSession,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<CountResponse>> {
    let q = QueryParams::parse(raw.as_deref());
    count(&state, &session, &q, q.flag("seen")?, None).await
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    session: SubscriberSession,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<CountResponse>> {
    let q = QueryParams::parse(raw.as_deref());
    count(&state, &session, &q, None, q.flag("read")?).await
}

/// Seen/read filters for the generic count: with neither given, count seen messages.
pub fn count_filters(seen: Option<bool>, read: Option<bool>) -> (Option<bool>, Option<bool>) {
    match (seen, read) {
        (None, None) => (Some(true), None),
        other => other,
    }
}

pub async fn get_notifications_count(
    State(state): State<AppState>,
    session: SubscriberSession,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<CountResponse>> {
    let q = QueryParams::parse(raw.as_deref());
    let (seen, read) = count_filters(q.flag("seen")?, q.flag("read")?);
    count(&state, &session, &q, seen, read).await
}

/// Path ids go through the same comma splitting as body ids.
fn path_ids(message_id: String) -> AppResult<Vec<String>> {
    normalize(Some(OneOrMany::One(message_id))).ok_or_else(AppError::message_id_required)
}

async fn mark(state: &AppState, session: &SubscriberSession, message_ids: Vec<String>, mark: MarkFlags) -> AppResult<Vec<Message>> {
    let cmd = MarkMessageAsCommand { scope: Scope::from(session), message_ids, mark };
    state.usecases.mark_message_as.execute(cmd).await
}

/// Deprecated single-message form; answers with the one updated record.
pub async fn mark_message_as_seen(
    State(state): State<AppState>,
    session: SubscriberSession,
    Path(message_id): Path<String>,
) -> AppResult<Json<Message>> {
    let ids = path_ids(message_id.clone())?;
    let updated = mark(&state, &session, ids, MarkFlags::seen()).await?;
    updated
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| AppError::not_found(ErrorCode::MessageNotFound, format!("Message with id: {message_id} not found")))
}

/// Deprecated single-message form.
pub async fn mark_message_as_read(
    State(state): State<AppState>,
    session: SubscriberSession,
    Path(message_id): Path<String>,
) -> AppResult<Json<Vec<Message>>> {
    let ids = path_ids(message_id)?;
    Ok(Json(mark(&state, &session, ids, MarkFlags::read()).await?))
}

pub async fn mark_messages_as(
    State(state): State<AppState>,
    session: SubscriberSession,
    JsonBody(body): JsonBody<MarkMessageAsBody>,
) -> AppResult<Json<Vec<Message>>> {
    let ids = normalize(body.message_id).ok_or_else(AppError::message_id_required)?;
    Ok(Json(mark(&state, &session, ids, body.mark).await?))
}

async fn mark_all(state: &AppState, session: &SubscriberSession, body: MarkAllBody, mark_as: MarkAllKind) -> AppResult<Json<CountResponse>> {
    let cmd = MarkAllMessagesAsCommand { scope: Scope::from(session), mark_as, feed_ids: normalize(body.feed_id) };
    Ok(Json(state.usecases.mark_all_messages_as.execute(cmd).await?))
}

pub async fn mark_all_as_read(
    State(state): State<AppState>,
    session: SubscriberSession,
    JsonBody(body): JsonBody<MarkAllBody>,
) -> AppResult<Json<CountResponse>> {
    mark_all(&state, &session, body, MarkAllKind::Read).await
}

pub async fn mark_all_as_seen(
    State(state): State<AppState>,
    session: SubscriberSession,
    JsonBody(body): JsonBody<MarkAllBody>,
) -> AppResult<Json<CountResponse>> {
    mark_all(&state, &session, body, MarkAllKind::Seen).await
}

pub async fn remove_message(
    State(state): State<AppState>,
    session: SubscriberSession,
    Path(message_id): Path<String>,
) -> AppResult<Json<Message>> {
    let cmd = RemoveMessageCommand { scope: Scope::from(&session), message_id };
    Ok(Json(state.usecases.remove_message.execute(cmd).await?))
}

pub async fn mark_action_as_done(
    State(state): State<AppState>,
    session: SubscriberSession,
    Path((message_id, button_type)): Path<(String, String)>,
    JsonBody(body): JsonBody<ActionBody>,
) -> AppResult<Json<Message>> {
    let button_type: ButtonType = serde_json::from_value(Value::String(button_type.clone()))
        .map_err(|_| AppError::user(ErrorCode::InvalidQuery, format!("Unknown action type: {button_type}")))?;
    let status = body
        .status
        .ok_or_else(|| AppError::user(ErrorCode::InvalidBody, "status must be one of pending, done"))?;
    let cmd = UpdateMessageActionsCommand {
        scope: Scope::from(&session),
        message_id,
        button_type,
        payload: body.payload,
        status,
    };
    Ok(Json(state.usecases.update_message_actions.execute(cmd).await?))
}

pub async fn get_organization_data(
    State(state): State<AppState>,
    session: SubscriberSession,
) -> AppResult<Json<OrganizationResponse>> {
    let cmd = GetOrganizationDataCommand { scope: Scope::from(&session) };
    Ok(Json(state.usecases.organization_data.execute(cmd).await?))
}

pub async fn get_subscriber_preference(
    State(state): State<AppState>,
    session: SubscriberSession,
) -> AppResult<Json<Vec<PreferenceItem>>> {
    let cmd = GetSubscriberPreferenceCommand { scope: Scope::from(&session) };
    Ok(Json(state.usecases.get_preferences.execute(cmd).await?))
}

pub async fn update_subscriber_preference(
    State(state): State<AppState>,
    session: SubscriberSession,
    Path(template_id): Path<String>,
    JsonBody(body): JsonBody<UpdatePreferenceBody>,
) -> AppResult<Json<PreferenceItem>> {
    let cmd = UpdateSubscriberPreferenceCommand {
        scope: Scope::from(&session),
        template_id,
        enabled: body.enabled,
        channel: body.channel,
    };
    Ok(Json(state.usecases.update_preference.execute(cmd).await?))
}

pub async fn log_usage(
    State(state): State<AppState>,
    session: SubscriberSession,
    JsonBody(body): JsonBody<LogUsageBody>,
) -> AppResult<Json<Value>> {
    if body.name.is_empty() {
        return Err(AppError::user(ErrorCode::InvalidBody, "name is required"));
    }
    let LogUsageBody { name, payload } = body;
    let mut properties = payload.unwrap_or_default();
    properties.insert("environmentId".to_string(), Value::String(session.environment_id.clone()));
    let analytics = state.analytics.clone();
    let organization_id = session.organization_id;
    tokio::spawn(async move {
        analytics.track(&name, &organization_id, properties);
    });
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
#[path = "widgets_tests.rs"]
mod tests;
