use std::sync::Arc;

use serde::Serialize;

use super::Scope;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::storage::{Branding, WidgetRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOrganizationDataCommand {
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub branding: Branding,
}

pub struct GetOrganizationData {
    repo: Arc<dyn WidgetRepository>,
}

impl GetOrganizationData {
    pub fn new(repo: Arc<dyn WidgetRepository>) -> Self { Self { repo } }

    pub async fn execute(&self, cmd: GetOrganizationDataCommand) -> AppResult<OrganizationResponse> {
        let scope = &cmd.scope;
        self.repo
            .find_subscriber_by_id(scope.environment_id(), scope.subscriber_internal_id())
            .await?
            .ok_or_else(|| AppError::not_found(ErrorCode::SubscriberNotFound, "Subscriber not found"))?;
        let org = self
            .repo
            .find_organization(scope.organization_id())
            .await?
            .ok_or_else(|| AppError::internal(format!("organization {} missing", scope.organization_id())))?;
        let mut branding = org.branding.unwrap_or_default();
        if branding.logo.is_none() {
            branding.logo = org.logo;
        }
        Ok(OrganizationResponse { id: org.id, name: org.name, branding })
    }
}
