//! Fixture loading and the first-run demo dataset.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::entities::*;

/// Every collection the widget store knows about, in one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub environments: Vec<Environment>,
    pub organizations: Vec<Organization>,
    pub subscribers: Vec<Subscriber>,
    pub feeds: Vec<Feed>,
    pub templates: Vec<NotificationTemplate>,
    pub preferences: Vec<SubscriberPreference>,
    pub messages: Vec<Message>,
}

pub fn load_fixture(path: &Path) -> Result<Fixture> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture file: {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&text)
        .with_context(|| format!("Invalid fixture JSON in {}", path.display()))?;
    tracing::info!(
        target: "startup",
        environments = fixture.environments.len(),
        subscribers = fixture.subscribers.len(),
        messages = fixture.messages.len(),
        "loaded fixture {}", path.display()
    );
    Ok(fixture)
}

pub const DEMO_APP_IDENTIFIER: &str = "demo-app";
pub const DEMO_SUBSCRIBER_ID: &str = "demo-subscriber";

/// Small dataset used when the server starts without a fixture file:
/// one environment, two feeds, two templates (one critical) and a handful of
/// in-app messages for a single subscriber.
pub fn demo_fixture() -> Fixture {
    let now = Utc::now();
    let org = "org_demo";
    let env = "env_demo";
    let sub = "sub_demo";

    let message = |id: &str, feed: &str, content: &str, age_min: i64, seen: bool, read: bool| Message {
        id: id.to_string(),
        organization_id: org.to_string(),
        environment_id: env.to_string(),
        subscriber_id: sub.to_string(),
        template_id: Some("tpl_welcome".to_string()),
        feed_id: Some(feed.to_string()),
        channel: ChannelType::InApp,
        content: content.to_string(),
        seen,
        read,
        deleted: false,
        last_seen_date: None,
        last_read_date: None,
        cta: MessageCta {
            cta_type: Some("redirect".into()),
            data: CtaData { url: Some("/inbox".into()) },
            action: MessageAction {
                status: Some(ActionStatus::Pending),
                buttons: vec![
                    ActionButton { button_type: ButtonType::Primary, content: "Accept".into() },
                    ActionButton { button_type: ButtonType::Secondary, content: "Dismiss".into() },
                ],
                result: ActionResult::default(),
            },
        },
        payload: json!({}),
        created_at: now - Duration::minutes(age_min),
    };

    Fixture {
        environments: vec![Environment {
            id: env.into(),
            organization_id: org.into(),
            name: "Development".into(),
            identifier: DEMO_APP_IDENTIFIER.into(),
            api_keys: vec![ApiKey { key: "demo-api-key".into() }],
            widget: WidgetSettings { notification_center_encryption: false },
        }],
        organizations: vec![Organization {
            id: org.into(),
            name: "Demo Org".into(),
            logo: None,
            branding: Some(Branding { color: Some("#ff512f".into()), direction: Some("ltr".into()), ..Default::default() }),
        }],
        subscribers: vec![Subscriber {
            id: sub.into(),
            subscriber_id: DEMO_SUBSCRIBER_ID.into(),
            organization_id: org.into(),
            environment_id: env.into(),
            first_name: Some("Demo".into()),
            last_name: Some("User".into()),
            email: Some("demo@example.com".into()),
            phone: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        }],
        feeds: vec![
            Feed { id: "feed_general".into(), identifier: "general".into(), name: "General".into(), organization_id: org.into(), environment_id: env.into() },
            Feed { id: "feed_billing".into(), identifier: "billing".into(), name: "Billing".into(), organization_id: org.into(), environment_id: env.into() },
        ],
        templates: vec![
            NotificationTemplate {
                id: "tpl_welcome".into(),
                organization_id: org.into(),
                environment_id: env.into(),
                name: "Welcome".into(),
                critical: false,
                active: true,
                preference_settings: ChannelPreferences::default(),
            },
            NotificationTemplate {
                id: "tpl_security".into(),
                organization_id: org.into(),
                environment_id: env.into(),
                name: "Security alert".into(),
                critical: true,
                active: true,
                preference_settings: ChannelPreferences::default(),
            },
        ],
        preferences: Vec::new(),
        messages: vec![
            message("msg_demo_1", "feed_general", "Welcome to your inbox", 30, false, false),
            message("msg_demo_2", "feed_general", "Your profile is complete", 20, true, false),
            message("msg_demo_3", "feed_billing", "Invoice #1042 is ready", 10, false, false),
        ],
    }
}
