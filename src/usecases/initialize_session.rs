use std::sync::Arc;

use serde::Serialize;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::identity::hmac::verify_subscriber_hash;
use crate::identity::{SessionManager, SessionToken, SubscriberSession};
use crate::storage::{new_object_id, now, Subscriber, WidgetRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeSessionCommand {
    pub subscriber_id: String,
    pub application_identifier: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub hmac_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInitializeResponse {
    pub token: SessionToken,
    pub profile: Subscriber,
}

/// Authenticates an embedded widget against its environment, upserts the
/// subscriber and hands out a bearer token.
pub struct InitializeSession {
    repo: Arc<dyn WidgetRepository>,
    sessions: SessionManager,
}

impl InitializeSession {
    pub fn new(repo: Arc<dyn WidgetRepository>, sessions: SessionManager) -> Self { Self { repo, sessions } }

    pub async fn execute(&self, cmd: InitializeSessionCommand) -> AppResult<SessionInitializeResponse> {
        if cmd.subscriber_id.is_empty() {
            return Err(AppError::user(ErrorCode::SubscriberIdRequired, "subscriberId is required"));
        }
        let env = self
            .repo
            .find_environment_by_identifier(&cmd.application_identifier)
            .await?
            .ok_or_else(|| AppError::user(ErrorCode::InvalidApplicationIdentifier, "Please provide a valid app identifier"))?;

        if env.widget.notification_center_encryption {
            let key = env.primary_api_key().unwrap_or_default();
            let valid = cmd
                .hmac_hash
                .as_deref()
                .map(|h| verify_subscriber_hash(key, &cmd.subscriber_id, h))
                .unwrap_or(false);
            if !valid {
                tracing::warn!(environment = %env.id, subscriber = %cmd.subscriber_id, "hmac verification failed");
                return Err(AppError::user(ErrorCode::InvalidHmac, "Please provide a valid HMAC hash"));
            }
        }

        let ts = now();
        let subscriber = match self.repo.find_subscriber(&env.id, &cmd.subscriber_id).await? {
            Some(mut existing) => {
                let mut changed = false;
                for (slot, incoming) in [
                    (&mut existing.email, &cmd.email),
                    (&mut existing.first_name, &cmd.first_name),
                    (&mut existing.last_name, &cmd.last_name),
                    (&mut existing.phone, &cmd.phone),
                ] {
                    if incoming.is_some() && *slot != *incoming {
                        *slot = incoming.clone();
                        changed = true;
                    }
                }
                if changed {
                    existing.updated_at = ts;
                    self.repo.save_subscriber(existing).await?
                } else {
                    existing
                }
            }
            None => {
                let created = Subscriber {
                    id: new_object_id(),
                    subscriber_id: cmd.subscriber_id.clone(),
                    organization_id: env.organization_id.clone(),
                    environment_id: env.id.clone(),
                    first_name: cmd.first_name.clone(),
                    last_name: cmd.last_name.clone(),
                    email: cmd.email.clone(),
                    phone: cmd.phone.clone(),
                    avatar: None,
                    created_at: ts,
                    updated_at: ts,
                };
                tracing::info!(environment = %env.id, subscriber = %created.subscriber_id, "created subscriber");
                self.repo.save_subscriber(created).await?
            }
        };

        let token = self.sessions.issue(SubscriberSession::from(&subscriber)).map_err(|e| {
            tracing::error!(subscriber = %subscriber.subscriber_id, "session issue failed: {e:#}");
            AppError::internal("Could not issue a session token")
        })?;
        Ok(SessionInitializeResponse { token, profile: subscriber })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::hmac::sign_subscriber_id;
    use crate::storage::seed::{demo_fixture, DEMO_APP_IDENTIFIER, DEMO_SUBSCRIBER_ID};
    use crate::storage::MemoryStore;

    fn cmd(subscriber_id: &str) -> InitializeSessionCommand {
        InitializeSessionCommand {
            subscriber_id: subscriber_id.into(),
            application_identifier: DEMO_APP_IDENTIFIER.into(),
            email: None,
            first_name: None,
            last_name: None,
            phone: None,
            hmac_hash: None,
        }
    }

    fn usecase(encrypted: bool) -> (InitializeSession, SessionManager) {
        let mut f = demo_fixture();
        f.environments[0].widget.notification_center_encryption = encrypted;
        let sessions = SessionManager::default();
        let repo: Arc<dyn WidgetRepository> = Arc::new(MemoryStore::from_fixture(f));
        (InitializeSession::new(repo, sessions.clone()), sessions)
    }

    #[tokio::test]
    async fn existing_subscriber_gets_a_valid_token() {
        let (uc, sessions) = usecase(false);
        let resp = uc.execute(cmd(DEMO_SUBSCRIBER_ID)).await.unwrap();
        assert_eq!(resp.profile.id, "sub_demo");
        let session = sessions.validate(&resp.token).unwrap();
        assert_eq!(session.environment_id, "env_demo");
        assert_eq!(session.organization_id, "org_demo");
        assert_eq!(session.subscriber_id, DEMO_SUBSCRIBER_ID);
    }

    #[tokio::test]
    async fn unknown_subscriber_is_created_with_profile_fields() {
        let (uc, _) = usecase(false);
        let mut c = cmd("new-one");
        c.email = Some("new@example.com".into());
        c.first_name = Some("New".into());
        let resp = uc.execute(c).await.unwrap();
        assert_eq!(resp.profile.subscriber_id, "new-one");
        assert_eq!(resp.profile.email.as_deref(), Some("new@example.com"));
        assert_eq!(resp.profile.environment_id, "env_demo");

        let again = uc.execute(cmd("new-one")).await.unwrap();
        assert_eq!(again.profile.id, resp.profile.id);
        assert_eq!(again.profile.email.as_deref(), Some("new@example.com"));
    }

    #[tokio::test]
    async fn rejects_unknown_application_and_missing_subscriber() {
        let (uc, _) = usecase(false);
        let mut c = cmd(DEMO_SUBSCRIBER_ID);
        c.application_identifier = "nope".into();
        let err = uc.execute(c).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidApplicationIdentifier);
        assert_eq!(err.http_status(), 400);

        let err = uc.execute(cmd("")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SubscriberIdRequired);
    }

    #[tokio::test]
    async fn encrypted_environment_requires_matching_hmac() {
        let (uc, _) = usecase(true);
        let err = uc.execute(cmd(DEMO_SUBSCRIBER_ID)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidHmac);

        let mut wrong = cmd(DEMO_SUBSCRIBER_ID);
        wrong.hmac_hash = Some(sign_subscriber_id("demo-api-key", "someone-else"));
        assert_eq!(uc.execute(wrong).await.unwrap_err().code(), ErrorCode::InvalidHmac);

        let mut right = cmd(DEMO_SUBSCRIBER_ID);
        right.hmac_hash = Some(sign_subscriber_id("demo-api-key", DEMO_SUBSCRIBER_ID));
        assert!(uc.execute(right).await.is_ok());
    }
}
