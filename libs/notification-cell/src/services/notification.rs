use chrono::Local;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_backend::{segment, AppState, BackendClient, Resource};
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_search, matches_text, parse_choice};

use crate::models::{Notification, NotificationForm, NotificationListQuery, RecipientType};

pub struct NotificationService {
    backend: BackendClient,
}

impl NotificationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    async fn fetch_inbox(
        &self,
        recipient_type: RecipientType,
        recipient_id: &str,
        unread_only: bool,
        auth_token: &str,
    ) -> Result<Vec<Notification>, AppError> {
        let scope = if unread_only { "unread" } else { "recipient" };
        let path = format!(
            "{}/{}/{}/{}",
            Notification::COLLECTION,
            scope,
            recipient_type,
            segment(recipient_id)
        );

        debug!("Fetching {} notifications for {} {}", scope, recipient_type, recipient_id);
        Ok(self.backend.fetch_list::<Notification>(&path, Some(auth_token)).await?)
    }

    /// The back office may browse any inbox; everyone else only reads their own.
    pub async fn fetch_visible(
        &self,
        user: &User,
        query: &NotificationListQuery,
        auth_token: &str,
    ) -> Result<Vec<Notification>, AppError> {
        let unread_only = query.unread_only.unwrap_or(false);

        if !user.is_back_office() {
            return self
                .fetch_inbox(RecipientType::for_role(user.role), user.scope_id(), unread_only, auth_token)
                .await;
        }

        let recipient_type = parse_choice::<RecipientType>("recipient type", query.recipient_type.as_deref())?;
        let recipient_id = query.recipient_id.as_deref().map(str::trim).filter(|id| !id.is_empty());

        match (recipient_type, recipient_id) {
            (Some(recipient_type), Some(recipient_id)) => {
                self.fetch_inbox(recipient_type, recipient_id, unread_only, auth_token).await
            }
            _ => {
                debug!("Fetching all notifications");
                let all = self.backend.list::<Notification>(auth_token).await?;
                Ok(if unread_only {
                    all.into_iter().filter(Notification::is_unread).collect()
                } else {
                    all
                })
            }
        }
    }

    pub async fn list_notifications(
        &self,
        user: &User,
        query: &NotificationListQuery,
        auth_token: &str,
    ) -> Result<ListResponse<Notification>, AppError> {
        let notifications = self.fetch_visible(user, query, auth_token).await?;

        Ok(ListResponse::filtered(notifications, |n| {
            matches_search(query.sender.as_deref(), &[n.sender_username.as_deref()])
                && matches_text(n.priority.as_deref(), query.priority.as_deref())
        }))
    }

    /// The backend has no single-notification route, so the caller's
    /// visible list is searched instead.
    pub async fn get_notification(&self, user: &User, id: i64, auth_token: &str) -> Result<Notification, AppError> {
        self.fetch_visible(user, &NotificationListQuery::default(), auth_token)
            .await?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))
    }

    pub async fn send_notification(&self, form: NotificationForm, sender: &str, auth_token: &str) -> Result<Value, AppError> {
        let mut payload = form.into_checked_payload(FormMode::Add)?;
        payload["senderUsername"] = json!(sender);
        payload["isRead"] = json!(false);
        payload["createdAt"] = json!(Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S").to_string());

        info!("Sending notification to {} {}", payload["recipientType"], payload["recipientId"]);
        Ok(self.backend.create::<Notification>(payload, auth_token).await?)
    }

    pub async fn mark_read(&self, user: &User, id: i64, auth_token: &str) -> Result<Value, AppError> {
        if !user.is_back_office() {
            // 404 for notifications outside the caller's inbox
            self.get_notification(user, id, auth_token).await?;
        }

        let path = format!("{}/{}/read", Notification::COLLECTION, id);
        debug!("Marking notification {} read", id);

        let updated = self
            .backend
            .send(Method::PUT, &path, Some(auth_token), None)
            .await?;

        Ok(updated.unwrap_or_default())
    }

    pub async fn delete_notification(&self, id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting notification {}", id);
        Ok(self.backend.remove::<Notification>(&id.to_string(), auth_token).await?)
    }
}
