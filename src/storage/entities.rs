//! Documents persisted by the widget repository.
//!
//! Field names follow the document-store convention the widget clients expect:
//! `_id`, `_organizationId`, `_environmentId`, `_subscriberId`, ... and camelCase
//! for everything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_organizationId")]
    pub organization_id: String,
    pub name: String,
    /// Public application identifier used by the embeddable widget.
    pub identifier: String,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
    #[serde(default)]
    pub widget: WidgetSettings,
}

impl Environment {
    pub fn primary_api_key(&self) -> Option<&str> { self.api_keys.first().map(|k| k.key.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    /// When set, session initialization must present an HMAC of the subscriber id.
    #[serde(default)]
    pub notification_center_encryption: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(rename = "_id")]
    pub id: String,
    /// External identifier chosen by the integrating application.
    pub subscriber_id: String,
    #[serde(rename = "_organizationId")]
    pub organization_id: String,
    #[serde(rename = "_environmentId")]
    pub environment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(rename = "_id")]
    pub id: String,
    pub identifier: String,
    pub name: String,
    #[serde(rename = "_organizationId")]
    pub organization_id: String,
    #[serde(rename = "_environmentId")]
    pub environment_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    InApp,
    Email,
    Sms,
    Chat,
    Push,
}

impl Default for ChannelType {
    fn default() -> Self { ChannelType::InApp }
}

/// Fully resolved on/off state per delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPreferences {
    pub email: bool,
    pub sms: bool,
    pub in_app: bool,
    pub chat: bool,
    pub push: bool,
}

impl Default for ChannelPreferences {
    fn default() -> Self { Self { email: true, sms: true, in_app: true, chat: true, push: true } }
}

/// Per-subscriber channel overrides; `None` inherits the template default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_app: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,
}

impl ChannelOverrides {
    pub fn set(&mut self, channel: ChannelType, enabled: bool) {
        let slot = match channel {
            ChannelType::Email => &mut self.email,
            ChannelType::Sms => &mut self.sms,
            ChannelType::InApp => &mut self.in_app,
            ChannelType::Chat => &mut self.chat,
            ChannelType::Push => &mut self.push,
        };
        *slot = Some(enabled);
    }

    pub fn apply(&self, base: ChannelPreferences) -> ChannelPreferences {
        ChannelPreferences {
            email: self.email.unwrap_or(base.email),
            sms: self.sms.unwrap_or(base.sms),
            in_app: self.in_app.unwrap_or(base.in_app),
            chat: self.chat.unwrap_or(base.chat),
            push: self.push.unwrap_or(base.push),
        }
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_organizationId")]
    pub organization_id: String,
    #[serde(rename = "_environmentId")]
    pub environment_id: String,
    pub name: String,
    #[serde(default)]
    pub critical: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub preference_settings: ChannelPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberPreference {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_organizationId")]
    pub organization_id: String,
    #[serde(rename = "_environmentId")]
    pub environment_id: String,
    /// Internal subscriber id.
    #[serde(rename = "_subscriberId")]
    pub subscriber_id: String,
    #[serde(rename = "_templateId")]
    pub template_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub channels: ChannelOverrides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonType {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionButton {
    #[serde(rename = "type")]
    pub button_type: ButtonType,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub payload: JsonValue,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub button_type: Option<ButtonType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionStatus>,
    #[serde(default)]
    pub buttons: Vec<ActionButton>,
    #[serde(default)]
    pub result: ActionResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCta {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub cta_type: Option<String>,
    #[serde(default)]
    pub data: CtaData,
    #[serde(default)]
    pub action: MessageAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_organizationId")]
    pub organization_id: String,
    #[serde(rename = "_environmentId")]
    pub environment_id: String,
    /// Internal subscriber id.
    #[serde(rename = "_subscriberId")]
    pub subscriber_id: String,
    #[serde(rename = "_templateId", default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(rename = "_feedId", default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<String>,
    #[serde(default)]
    pub channel: ChannelType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub seen: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_read_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cta: MessageCta,
    #[serde(default)]
    pub payload: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// Requested seen/read transition; an unset flag leaves the field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl MarkFlags {
    pub fn seen() -> Self { Self { seen: Some(true), read: None } }
    pub fn read() -> Self { Self { seen: None, read: Some(true) } }
}

impl Message {
    /// Apply a seen/read transition. Reading a message also marks it seen.
    pub fn apply_mark(&mut self, mark: MarkFlags, now: DateTime<Utc>) {
        let seen = match (mark.seen, mark.read) {
            (_, Some(true)) => Some(true),
            (s, _) => s,
        };
        if let Some(seen) = seen {
            self.seen = seen;
            if seen { self.last_seen_date = Some(now); }
        }
        if let Some(read) = mark.read {
            self.read = read;
            if read { self.last_read_date = Some(now); }
        }
    }
}
