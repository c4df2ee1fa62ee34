use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc::{self, UnboundedSender};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::user::{Session, UserProfile};
use crate::infra::auth::{AccountFields, AuthProvider};
use crate::infra::directory::UserDirectory;
use crate::infra::documents::DocumentStore;
use crate::infra::files::FileStore;
use crate::infra::realtime::{
    RealtimeEventKind, RealtimeMessage, RealtimeProvider, RealtimeSubscription, SubscriptionGuard,
};

struct StoredAccount {
    session: Session,
    #[allow(dead_code)]
    password: String,
}

type ChannelMap = HashMap<String, Vec<(u64, UnboundedSender<RealtimeMessage>)>>;

/// In-memory implementation of every external collaborator, used by the demo
/// binary and the test suites. Document mutations emit push messages on the
/// document's channel, the same way the managed platform does. Writes can be
/// failed on demand to exercise the optimistic-update paths.
pub struct InMemoryBackend {
    config: AppConfig,
    collections: Mutex<HashMap<String, HashMap<String, Value>>>,
    accounts: Mutex<HashMap<String, StoredAccount>>,
    session: Mutex<Option<Session>>,
    files: Mutex<HashMap<String, Bytes>>,
    channels: Arc<Mutex<ChannelMap>>,
    next_subscription: AtomicU64,
    fail_writes: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryBackend {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            collections: Mutex::new(HashMap::new()),
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            files: Mutex::new(HashMap::new()),
            channels: Arc::new(Mutex::new(HashMap::new())),
            next_subscription: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
            latency: Mutex::new(None),
        })
    }

    /// Make every subsequent write fail, to simulate a service outage.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Add jittered latency to every call, to make the demo feel like a
    /// network.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *lock(&self.latency) = latency;
    }

    /// Replace the current session without going through account creation.
    pub fn force_session(&self, session: Option<Session>) {
        *lock(&self.session) = session;
    }

    /// Push a raw message onto a channel, bypassing the document store.
    pub fn emit(&self, channel_path: &str, message: RealtimeMessage) {
        let mut channels = lock(&self.channels);
        if let Some(senders) = channels.get_mut(channel_path) {
            senders.retain(|(_, sender)| sender.send(message.clone()).is_ok());
            if senders.is_empty() {
                channels.remove(channel_path);
            }
        }
    }

    /// Number of live provider channels, for subscription-leak assertions.
    pub fn channel_count(&self) -> usize {
        lock(&self.channels).values().map(Vec::len).sum()
    }

    async fn pause(&self) {
        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            let millis = latency.as_millis() as u64;
            let jitter = rand::thread_rng().gen_range(0..=millis.max(2) / 2);
            tokio::time::sleep(Duration::from_millis(millis + jitter)).await;
        }
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("backend unavailable");
        }
        Ok(())
    }

    fn fetch_doc(&self, collection_id: &str, document_id: &str) -> Option<Value> {
        lock(&self.collections)
            .get(collection_id)
            .and_then(|collection| collection.get(document_id))
            .cloned()
    }

    fn store_doc(
        &self,
        collection_id: &str,
        document_id: &str,
        document: Value,
        event: RealtimeEventKind,
    ) {
        lock(&self.collections)
            .entry(collection_id.to_string())
            .or_default()
            .insert(document_id.to_string(), document.clone());
        self.emit(
            &self.config.document_channel(collection_id, document_id),
            RealtimeMessage {
                event,
                payload: document,
            },
        );
    }
}

#[async_trait]
impl DocumentStore for InMemoryBackend {
    async fn get_by_id(&self, collection_id: &str, document_id: &str) -> Result<Option<Value>> {
        self.pause().await;
        Ok(self.fetch_doc(collection_id, document_id))
    }

    async fn query(&self, collection_id: &str, filters: &[(String, Value)]) -> Result<Vec<Value>> {
        self.pause().await;
        let collections = lock(&self.collections);
        let Some(collection) = collections.get(collection_id) else {
            return Ok(Vec::new());
        };
        Ok(collection
            .values()
            .filter(|document| {
                filters
                    .iter()
                    .all(|(field, expected)| document.get(field) == Some(expected))
            })
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        collection_id: &str,
        document_id: &str,
        document: Value,
    ) -> Result<Value> {
        self.pause().await;
        self.check_writes()?;
        self.store_doc(
            collection_id,
            document_id,
            document.clone(),
            RealtimeEventKind::Create,
        );
        Ok(document)
    }

    async fn update(
        &self,
        collection_id: &str,
        document_id: &str,
        document: Value,
    ) -> Result<Value> {
        self.pause().await;
        self.check_writes()?;
        if self.fetch_doc(collection_id, document_id).is_none() {
            bail!("document {}/{} not found", collection_id, document_id);
        }
        self.store_doc(
            collection_id,
            document_id,
            document.clone(),
            RealtimeEventKind::Update,
        );
        Ok(document)
    }

    async fn delete(&self, collection_id: &str, document_id: &str) -> Result<()> {
        self.pause().await;
        self.check_writes()?;
        let removed = lock(&self.collections)
            .get_mut(collection_id)
            .and_then(|collection| collection.remove(document_id));
        if removed.is_none() {
            bail!("document {}/{} not found", collection_id, document_id);
        }
        self.emit(
            &self.config.document_channel(collection_id, document_id),
            RealtimeMessage {
                event: RealtimeEventKind::Delete,
                payload: serde_json::json!({ "id": document_id }),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for InMemoryBackend {
    async fn create_account(&self, fields: &AccountFields) -> Result<Session> {
        self.pause().await;
        self.check_writes()?;
        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(&fields.email) {
            bail!("an account with this email already exists");
        }
        let session = Session {
            user_id: Uuid::new_v4().to_string(),
            name: fields.name.clone(),
            email: fields.email.clone(),
        };
        accounts.insert(
            fields.email.clone(),
            StoredAccount {
                session: session.clone(),
                password: fields.password.clone(),
            },
        );
        drop(accounts);
        *lock(&self.session) = Some(session.clone());
        Ok(session)
    }

    async fn get_current_user(&self) -> Result<Option<Session>> {
        self.pause().await;
        Ok(lock(&self.session).clone())
    }

    async fn logout(&self) -> Result<()> {
        self.pause().await;
        *lock(&self.session) = None;
        Ok(())
    }
}

#[async_trait]
impl FileStore for InMemoryBackend {
    async fn upload(&self, _filename: &str, bytes: Bytes) -> Result<String> {
        self.pause().await;
        self.check_writes()?;
        let file_ref = hex::encode(Sha256::digest(&bytes));
        lock(&self.files).insert(file_ref.clone(), bytes);
        Ok(file_ref)
    }

    fn preview_url(&self, file_ref: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.config.endpoint.as_str().trim_end_matches('/'),
            self.config.media_bucket,
            file_ref,
            self.config.project_id
        )
    }

    async fn delete(&self, file_ref: &str) -> Result<()> {
        self.pause().await;
        self.check_writes()?;
        lock(&self.files)
            .remove(file_ref)
            .map(|_| ())
            .ok_or_else(|| anyhow!("file {} not found", file_ref))
    }
}

impl RealtimeProvider for InMemoryBackend {
    fn subscribe(&self, channel_path: &str) -> Result<RealtimeSubscription> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        lock(&self.channels)
            .entry(channel_path.to_string())
            .or_default()
            .push((id, sender));

        let channels = Arc::clone(&self.channels);
        let path = channel_path.to_string();
        let guard = SubscriptionGuard::new(move || {
            let mut channels = lock(&channels);
            if let Some(senders) = channels.get_mut(&path) {
                senders.retain(|(sender_id, _)| *sender_id != id);
                if senders.is_empty() {
                    channels.remove(&path);
                }
            }
        });

        Ok(RealtimeSubscription { receiver, guard })
    }
}

#[async_trait]
impl UserDirectory for InMemoryBackend {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.pause().await;
        match self.fetch_doc(&self.config.users_collection, user_id) {
            Some(document) => {
                let profile = serde_json::from_value(document)
                    .map_err(|err| anyhow!("malformed profile document: {}", err))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn create_user(&self, profile: &UserProfile) -> Result<()> {
        self.pause().await;
        self.check_writes()?;
        let document = serde_json::to_value(profile)?;
        self.store_doc(
            &self.config.users_collection,
            &profile.user_id,
            document,
            RealtimeEventKind::Create,
        );
        Ok(())
    }
}
