//!
//! widget HTTP server
//! ------------------
//! Axum router for the embeddable notification inbox. Every route under
//! `/widgets` except session initialization requires a subscriber bearer token,
//! resolved by the `SubscriberSession` extractor.
//!
//! Responsibilities:
//! - Build the repository (fixture file or demo dataset) and the session registry.
//! - Map each widget endpoint to exactly one usecase.
//! - Periodically sweep expired sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tracing::info;

use crate::analytics::{Analytics, TracingAnalytics};
use crate::config::ServerConfig;
use crate::identity::SessionManager;
use crate::storage::seed::{demo_fixture, load_fixture};
use crate::storage::{MemoryStore, WidgetRepository};
use crate::usecases::Usecases;

pub mod dto;
pub mod widgets;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub usecases: Usecases,
    pub sessions: SessionManager,
    pub analytics: Arc<dyn Analytics>,
}

impl AppState {
    pub fn new(repo: Arc<dyn WidgetRepository>, sessions: SessionManager, analytics: Arc<dyn Analytics>) -> Self {
        Self { usecases: Usecases::new(repo, sessions.clone()), sessions, analytics }
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self { state.sessions.clone() }
}

pub fn widget_routes() -> Router<AppState> {
    use widgets::*;
    Router::new()
        .route("/session/initialize", post(session_initialize))
        .route("/notifications/feed", get(get_notifications_feed))
        .route("/notifications/unseen", get(get_unseen_count))
        .route("/notifications/unread", get(get_unread_count))
        .route("/notifications/count", get(get_notifications_count))
        .route("/messages/markAs", post(mark_messages_as))
        .route("/messages/read", post(mark_all_as_read))
        .route("/messages/seen", post(mark_all_as_seen))
        .route("/messages/{message_id}", delete(remove_message))
        .route("/messages/{message_id}/seen", post(mark_message_as_seen))
        .route("/messages/{message_id}/read", post(mark_message_as_read))
        .route("/messages/{message_id}/actions/{button_type}", post(mark_action_as_done))
        .route("/organization", get(get_organization_data))
        .route("/preferences", get(get_subscriber_preference))
        .route("/preferences/{template_id}", patch(update_subscriber_preference))
        .route("/usage/log", post(log_usage))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "widget ok" }))
        .nest("/widgets", widget_routes())
        .with_state(state)
}

/// Build state from configuration: fixture file when given, otherwise the demo dataset.
pub fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let fixture = match &config.data_file {
        Some(path) => load_fixture(path).with_context(|| format!("While loading data file {}", path.display()))?,
        None => {
            info!(target: "startup", "no data file configured; seeding demo dataset");
            demo_fixture()
        }
    };
    let repo: Arc<dyn WidgetRepository> = Arc::new(MemoryStore::from_fixture(fixture));
    Ok(AppState::new(repo, SessionManager::new(config.session_ttl), Arc::new(TracingAnalytics)))
}

/// Aborts the sweeper loop when the owning server future ends or is dropped.
struct SweeperGuard(tokio::task::JoinHandle<()>);

impl Drop for SweeperGuard {
    fn drop(&mut self) { self.0.abort(); }
}

fn spawn_session_sweeper(sessions: SessionManager) -> SweeperGuard {
    SweeperGuard(tokio::spawn(async move {
        loop {
            tokio::time::sleep(SESSION_SWEEP_INTERVAL).await;
            let removed = sessions.sweep_expired();
            if removed > 0 { tracing::debug!(removed = removed, "session_sweep"); }
        }
    }))
}

/// Serve on an already bound listener until the process stops.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    let _sweeper = spawn_session_sweeper(state.sessions.clone());
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let state = build_state(&config)?;
    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(target: "startup", "Starting widget server on {} (session ttl {}s)", addr, config.session_ttl.as_secs());
    serve(listener, state).await
}
