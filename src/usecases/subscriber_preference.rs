//! Subscriber preferences per notification template.
//!
//! A template's `preference_settings` are the defaults; a stored
//! [`SubscriberPreference`] only records what the subscriber overrode.
//! Critical templates are always delivered and never listed or editable.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{resolve_subscriber, Scope};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::storage::{
    new_object_id, ChannelOverrides, ChannelPreferences, ChannelType, NotificationTemplate, SubscriberPreference,
    WidgetRepository,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub critical: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceState {
    pub enabled: bool,
    pub channels: ChannelPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub template: TemplateSummary,
    pub preference: PreferenceState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelToggle {
    #[serde(rename = "type")]
    pub channel: ChannelType,
    pub enabled: bool,
}

fn item(template: &NotificationTemplate, stored: Option<&SubscriberPreference>) -> PreferenceItem {
    let preference = match stored {
        Some(p) => PreferenceState { enabled: p.enabled, channels: p.channels.apply(template.preference_settings) },
        None => PreferenceState { enabled: true, channels: template.preference_settings },
    };
    PreferenceItem {
        template: TemplateSummary { id: template.id.clone(), name: template.name.clone(), critical: template.critical },
        preference,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSubscriberPreferenceCommand {
    pub scope: Scope,
}

pub struct GetSubscriberPreference {
    repo: Arc<dyn WidgetRepository>,
}

impl GetSubscriberPreference {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: GetSubscriberPreferenceCommand) -> AppResult<Vec<PreferenceItem>> {
        let subscriber = resolve_subscriber(self.repo.as_ref(), &cmd.scope).await?;
        let env = cmd.scope.environment_id();
        let templates = self.repo.find_templates(env).await?;
        let stored = self.repo.find_preferences(env, &subscriber.id).await?;
        Ok(templates
            .iter()
            .filter(|t| t.active && !t.critical)
            .map(|t| item(t, stored.iter().find(|p| p.template_id == t.id)))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSubscriberPreferenceCommand {
    pub scope: Scope,
    pub template_id: String,
    pub enabled: Option<bool>,
    pub channel: Option<ChannelToggle>,
}

pub struct UpdateSubscriberPreference {
    repo: Arc<dyn WidgetRepository>,
}

impl UpdateSubscriberPreference {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: UpdateSubscriberPreferenceCommand) -> AppResult<PreferenceItem> {
        let subscriber = resolve_subscriber(self.repo.as_ref(), &cmd.scope).await?;
        let env = cmd.scope.environment_id();
        let template = self
            .repo
            .find_template(env, &cmd.template_id)
            .await?
            .ok_or_else(|| AppError::not_found(ErrorCode::TemplateNotFound, format!("Template with id {} is not found", cmd.template_id)))?;
        if template.critical {
            return Err(AppError::user(ErrorCode::CriticalTemplate, "Critical template preferences can not be changed"));
        }
        if cmd.enabled.is_none() && cmd.channel.is_none() {
            return Err(AppError::user(ErrorCode::PreferenceUpdateEmpty, "Either enabled or channel must be provided"));
        }

        let mut pref = self
            .repo
            .find_preferences(env, &subscriber.id)
            .await?
            .into_iter()
            .find(|p| p.template_id == template.id)
            .unwrap_or_else(|| SubscriberPreference {
                id: new_object_id(),
                organization_id: cmd.scope.organization_id().to_string(),
                environment_id: env.to_string(),
                subscriber_id: subscriber.id.clone(),
                template_id: template.id.clone(),
                enabled: true,
                channels: ChannelOverrides::default(),
            });
        if let Some(enabled) = cmd.enabled {
            pref.enabled = enabled;
        }
        if let Some(toggle) = cmd.channel {
            pref.channels.set(toggle.channel, toggle.enabled);
        }
        let saved = self.repo.save_preference(pref).await?;
        tracing::debug!(subscriber = %subscriber.subscriber_id, template = %template.id, "preference updated");
        Ok(item(&template, Some(&saved)))
    }
}
