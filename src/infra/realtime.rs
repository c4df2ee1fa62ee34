use anyhow::Result;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeEventKind {
    Create,
    Update,
    Delete,
}

/// A push message delivered on a channel: what happened, plus the affected
/// document as the service last saw it.
#[derive(Debug, Clone)]
pub struct RealtimeMessage {
    pub event: RealtimeEventKind,
    pub payload: Value,
}

/// A live channel handle. Dropping the guard (or calling
/// [`release`](SubscriptionGuard::release)) tells the provider to stop
/// delivering into the receiver.
pub struct RealtimeSubscription {
    pub receiver: UnboundedReceiver<RealtimeMessage>,
    pub guard: SubscriptionGuard,
}

pub struct SubscriptionGuard {
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    pub fn new(on_release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_release: Some(Box::new(on_release)),
        }
    }

    /// Idempotent; subsequent calls (and the eventual drop) are no-ops.
    pub fn release(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Real-time channel provider. Reconnection and backoff are the provider's
/// concern; a dropped channel simply stops delivering.
pub trait RealtimeProvider: Send + Sync {
    fn subscribe(&self, channel_path: &str) -> Result<RealtimeSubscription>;
}
