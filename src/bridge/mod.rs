use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::notification::Notification;
use crate::domain::post::Post;
use crate::infra::realtime::{
    RealtimeEventKind, RealtimeMessage, RealtimeProvider, SubscriptionGuard,
};

/// What a channel is watched for. Together with the subject id this keys the
/// underlying provider channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Purpose {
    Notifications,
    PostDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChannelKey {
    subject: String,
    purpose: Purpose,
}

#[derive(Debug, Clone)]
enum BridgeEvent {
    /// Valid notification records carried by a push message.
    Notifications(Vec<String>),
    PostChanged(Post),
}

type Handler = Arc<dyn Fn(&BridgeEvent) + Send + Sync>;
type HandlerMap = Arc<Mutex<HashMap<u64, Handler>>>;

struct Channel {
    handlers: HandlerMap,
    guard: SubscriptionGuard,
    task: JoinHandle<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Forwards push events from the external provider into component callbacks.
///
/// One provider channel is opened per (subject, purpose) pair no matter how
/// many components mount for it; each mount gets its own
/// [`SubscriptionHandle`], and the provider channel is released when the last
/// handle closes. Delivery order within a channel is preserved; nothing is
/// guaranteed across channels. A channel the provider stops feeding stays
/// silently stalled.
#[derive(Clone)]
pub struct RealtimeBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    provider: Arc<dyn RealtimeProvider>,
    config: AppConfig,
    channels: Mutex<HashMap<ChannelKey, Channel>>,
    next_handle: AtomicU64,
}

impl RealtimeBridge {
    pub fn new(provider: Arc<dyn RealtimeProvider>, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                provider,
                config,
                channels: Mutex::new(HashMap::new()),
                next_handle: AtomicU64::new(0),
            }),
        }
    }

    /// Watch a user's notification stream. `on_event` receives the valid
    /// records carried by each push message, in delivery order.
    pub fn subscribe_notifications(
        &self,
        user_id: &str,
        on_event: impl Fn(Vec<String>) + Send + Sync + 'static,
    ) -> Result<SubscriptionHandle> {
        let key = ChannelKey {
            subject: user_id.to_string(),
            purpose: Purpose::Notifications,
        };
        let path = self
            .inner
            .config
            .document_channel(&self.inner.config.users_collection, user_id);
        self.subscribe_raw(
            key,
            &path,
            Arc::new(move |event| {
                if let BridgeEvent::Notifications(records) = event {
                    on_event(records.clone());
                }
            }),
        )
    }

    /// Watch a post document for updates (new comments, likes).
    pub fn subscribe_post_updates(
        &self,
        post_id: &str,
        on_event: impl Fn(Post) + Send + Sync + 'static,
    ) -> Result<SubscriptionHandle> {
        let key = ChannelKey {
            subject: post_id.to_string(),
            purpose: Purpose::PostDocument,
        };
        let path = self
            .inner
            .config
            .document_channel(&self.inner.config.posts_collection, post_id);
        self.subscribe_raw(
            key,
            &path,
            Arc::new(move |event| {
                if let BridgeEvent::PostChanged(post) = event {
                    on_event(post.clone());
                }
            }),
        )
    }

    /// Number of live provider channels, for leak assertions.
    pub fn open_channels(&self) -> usize {
        lock(&self.inner.channels).len()
    }

    fn subscribe_raw(
        &self,
        key: ChannelKey,
        path: &str,
        handler: Handler,
    ) -> Result<SubscriptionHandle> {
        let id = self.inner.next_handle.fetch_add(1, Ordering::SeqCst);
        let mut channels = lock(&self.inner.channels);

        match channels.get(&key) {
            Some(channel) => {
                lock(&channel.handlers).insert(id, handler);
            }
            None => {
                let subscription = self.inner.provider.subscribe(path)?;
                let handlers: HandlerMap = Arc::new(Mutex::new(HashMap::from([(id, handler)])));
                let task = tokio::spawn(forward(
                    subscription.receiver,
                    Arc::clone(&handlers),
                    key.purpose.clone(),
                ));
                channels.insert(
                    key.clone(),
                    Channel {
                        handlers,
                        guard: subscription.guard,
                        task,
                    },
                );
            }
        }

        Ok(SubscriptionHandle {
            bridge: self.clone(),
            key,
            id,
            closed: AtomicBool::new(false),
        })
    }

    fn release(&self, key: &ChannelKey, id: u64) {
        let mut channels = lock(&self.inner.channels);
        let Some(channel) = channels.get(key) else {
            return;
        };
        let drained = {
            let mut handlers = lock(&channel.handlers);
            handlers.remove(&id);
            handlers.is_empty()
        };
        if drained {
            if let Some(mut channel) = channels.remove(key) {
                channel.task.abort();
                channel.guard.release();
            }
        }
    }
}

async fn forward(
    mut receiver: UnboundedReceiver<RealtimeMessage>,
    handlers: HandlerMap,
    purpose: Purpose,
) {
    while let Some(message) = receiver.recv().await {
        let Some(event) = decode(&purpose, &message) else {
            continue;
        };
        let current: Vec<Handler> = lock(&handlers).values().cloned().collect();
        for handler in current {
            handler(&event);
        }
    }
}

fn decode(purpose: &Purpose, message: &RealtimeMessage) -> Option<BridgeEvent> {
    match purpose {
        Purpose::Notifications => decode_notifications(message),
        Purpose::PostDocument => decode_post(message),
    }
}

fn decode_notifications(message: &RealtimeMessage) -> Option<BridgeEvent> {
    if message.event == RealtimeEventKind::Delete {
        return None;
    }
    let raw: Vec<String> = match &message.payload {
        // Direct push of a single record.
        Value::String(record) => vec![record.clone()],
        // Full document payload; the record array lives on the profile.
        Value::Object(fields) => fields
            .get("notifications")
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|value| value.as_str().map(str::to_string))
                    .collect()
            })?,
        _ => {
            warn!("unexpected notification payload shape");
            return None;
        }
    };

    let records: Vec<String> = raw
        .into_iter()
        .filter(|record| {
            let valid = Notification::decode(record).is_some();
            if !valid {
                warn!(record = %record, "discarding malformed pushed notification");
            }
            valid
        })
        .collect();

    if records.is_empty() {
        return None;
    }
    Some(BridgeEvent::Notifications(records))
}

fn decode_post(message: &RealtimeMessage) -> Option<BridgeEvent> {
    if message.event != RealtimeEventKind::Update {
        return None;
    }
    match serde_json::from_value::<Post>(message.payload.clone()) {
        Ok(post) => Some(BridgeEvent::PostChanged(post)),
        Err(err) => {
            warn!(error = %err, "discarding malformed post payload");
            None
        }
    }
}

/// One mount's grip on a shared channel. Closing is idempotent and stops
/// delivery to this handle's callback; dropping closes implicitly so every
/// exit path releases the channel.
pub struct SubscriptionHandle {
    bridge: RealtimeBridge,
    key: ChannelKey,
    id: u64,
    closed: AtomicBool,
}

impl SubscriptionHandle {
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.bridge.release(&self.key, self.id);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}
