//! Usage analytics sink. The widget API only ever fires events; delivery to a
//! real analytics backend is someone else's concern.

use serde_json::{Map, Value};

pub trait Analytics: Send + Sync {
    fn track(&self, event: &str, organization_id: &str, properties: Map<String, Value>);
}

/// Emits every event as a structured log line on the `analytics` target.
#[derive(Debug, Default, Clone)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn track(&self, event: &str, organization_id: &str, properties: Map<String, Value>) {
        let properties = Value::Object(properties);
        tracing::info!(
            target: "analytics",
            event,
            organization_id,
            properties = %properties,
            "track"
        );
    }
}
