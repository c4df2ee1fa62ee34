pub mod action;
pub mod auth;
pub mod notifications;
pub mod posts;
pub mod user;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

pub use self::action::Action;
use self::auth::AuthSlice;
use self::notifications::NotificationsSlice;
use self::posts::PostsSlice;
use self::user::UserSlice;

/// The full cross-component state, partitioned into independent slices.
#[derive(Debug, Clone, Default)]
pub struct SocialState {
    pub auth: AuthSlice,
    pub user: UserSlice,
    pub notifications: NotificationsSlice,
    pub posts: PostsSlice,
}

/// Single source of truth for cross-component state. Components never touch
/// the state directly; they dispatch [`Action`]s, which are applied
/// synchronously and serialized behind one lock. A watch counter ticks on
/// every dispatch so observers can re-read their projections.
///
/// Stores are plain injected values, not ambient singletons; tests construct
/// a fresh one each.
#[derive(Clone)]
pub struct SocialStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Mutex<SocialState>,
    changed: watch::Sender<u64>,
}

impl SocialStore {
    pub fn new() -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(SocialState::default()),
                changed,
            }),
        }
    }

    pub fn dispatch(&self, action: Action) {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        notifications::reduce(&mut state.notifications, &action);
        auth::reduce(&mut state.auth, &action);
        user::reduce(&mut state.user, &action);
        posts::reduce(&mut state.posts, &action);
        // Tick while still holding the lock so version order matches dispatch
        // order.
        self.inner.changed.send_modify(|version| *version += 1);
    }

    /// Read a projection of the current state.
    pub fn select<T>(&self, selector: impl FnOnce(&SocialState) -> T) -> T {
        let state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        selector(&state)
    }

    pub fn snapshot(&self) -> SocialState {
        self.select(Clone::clone)
    }

    /// Unread-count badge; always consistent with the latest dispatch.
    pub fn badge_count(&self) -> usize {
        self.select(|state| state.notifications.len())
    }

    /// Receiver that ticks after every dispatch.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.inner.changed.subscribe()
    }
}

impl Default for SocialStore {
    fn default() -> Self {
        Self::new()
    }
}
