use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tracing::error;

use crate::config::AppConfig;
use crate::domain::notification::Notification;
use crate::infra::documents::DocumentStore;
use crate::store::{Action, SocialStore};

/// Fetches, deletes, and delivers notification records. Records live as an
/// array on the owner's profile document.
#[derive(Clone)]
pub struct NotificationService {
    store: SocialStore,
    documents: Arc<dyn DocumentStore>,
    users_collection: String,
}

impl NotificationService {
    pub fn new(store: SocialStore, documents: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        Self {
            store,
            documents,
            users_collection: config.users_collection.clone(),
        }
    }

    /// Full resync from the external source. Three-phase: pending, then
    /// either a wholesale replacement of the local list or a recorded error.
    pub async fn fetch(&self, user_id: &str) {
        self.store.dispatch(Action::FetchNotificationsPending);
        match self.load_records(user_id).await {
            Ok(records) => {
                self.store
                    .dispatch(Action::FetchNotificationsSucceeded { records });
            }
            Err(err) => {
                error!(error = ?err, user_id = %user_id, "failed to fetch notifications");
                self.store.dispatch(Action::FetchNotificationsFailed {
                    error: err.to_string(),
                });
            }
        }
    }

    /// Remove a record from the owner's document. Callers treat this as
    /// fire-and-forget; local removal never waits for it.
    pub async fn delete_remote(&self, user_id: &str, notification_id: &str) -> Result<()> {
        let mut document = self.profile_document(user_id).await?;
        let records: Vec<String> = records_from(&document)
            .into_iter()
            .filter(|record| {
                Notification::decode_id(record)
                    .map(|id| id != notification_id)
                    .unwrap_or(true)
            })
            .collect();
        document["notifications"] = json!(records);
        self.documents
            .update(&self.users_collection, user_id, document)
            .await?;
        Ok(())
    }

    /// Append a record to the recipient's document; the platform pushes the
    /// change to the recipient's channel.
    pub async fn deliver(&self, user_id: &str, record: &str) -> Result<()> {
        let mut document = self.profile_document(user_id).await?;
        let mut records = records_from(&document);
        records.push(record.to_string());
        document["notifications"] = json!(records);
        self.documents
            .update(&self.users_collection, user_id, document)
            .await?;
        Ok(())
    }

    async fn load_records(&self, user_id: &str) -> Result<Vec<String>> {
        let document = self.profile_document(user_id).await?;
        Ok(records_from(&document))
    }

    async fn profile_document(&self, user_id: &str) -> Result<Value> {
        let document = self
            .documents
            .get_by_id(&self.users_collection, user_id)
            .await?
            .ok_or_else(|| anyhow!("user {} not found", user_id))?;
        if !document.is_object() {
            return Err(anyhow!("malformed profile document for {}", user_id));
        }
        Ok(document)
    }
}

fn records_from(document: &Value) -> Vec<String> {
    document
        .get("notifications")
        .and_then(Value::as_array)
        .map(|records| {
            records
                .iter()
                .filter_map(|value| value.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
