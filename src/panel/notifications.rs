use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use tracing::error;

use crate::app::notifications::NotificationService;
use crate::bridge::{RealtimeBridge, SubscriptionHandle};
use crate::config::AppConfig;
use crate::domain::notification::{NavigationTarget, Notification};
use crate::panel::surface::{Point, Surface};
use crate::store::{Action, SocialStore};

/// The notification bell and its two display surfaces: the desktop dropdown
/// and the mobile sheet. The surfaces are independent state machines; only
/// one is visible per viewport width, so they are allowed to disagree.
///
/// Mounting subscribes to the user's push channel and kicks off the initial
/// resync; a remount for a new subject tears the old subscription down first.
/// The badge is a pure projection of the store slice length.
pub struct NotificationPanel {
    store: SocialStore,
    service: NotificationService,
    bridge: RealtimeBridge,
    delete_grace: Duration,
    dropdown: Surface,
    sheet: Surface,
    removing: Arc<Mutex<HashSet<String>>>,
    subscription: Option<SubscriptionHandle>,
    subject: Option<String>,
}

impl NotificationPanel {
    pub fn new(
        store: SocialStore,
        service: NotificationService,
        bridge: RealtimeBridge,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            service,
            bridge,
            delete_grace: config.delete_grace,
            dropdown: Surface::default(),
            sheet: Surface::default(),
            removing: Arc::new(Mutex::new(HashSet::new())),
            subscription: None,
            subject: None,
        }
    }

    /// Attach to a user's notification stream. Pushed records are dispatched
    /// into the store, which dedupes re-deliveries by decoded id; the initial
    /// fetch resyncs in the background.
    pub fn mount(&mut self, user_id: &str) -> Result<()> {
        self.unmount();

        let store = self.store.clone();
        let handle = self.bridge.subscribe_notifications(user_id, move |records| {
            for record in records {
                store.dispatch(Action::AddNotification { record });
            }
        })?;
        self.subscription = Some(handle);
        self.subject = Some(user_id.to_string());

        let service = self.service.clone();
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            service.fetch(&user_id).await;
        });

        Ok(())
    }

    /// Detach from the stream. Idempotent; no callback fires afterwards.
    pub fn unmount(&mut self) {
        if let Some(handle) = self.subscription.take() {
            handle.close();
        }
        self.subject = None;
    }

    pub fn dropdown(&self) -> &Surface {
        &self.dropdown
    }

    pub fn dropdown_mut(&mut self) -> &mut Surface {
        &mut self.dropdown
    }

    pub fn sheet(&self) -> &Surface {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut Surface {
        &mut self.sheet
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown.toggle();
    }

    pub fn toggle_sheet(&mut self) {
        self.sheet.toggle();
    }

    pub fn close_all(&mut self) {
        self.dropdown.close();
        self.sheet.close();
    }

    /// Route a pointer-down through both surfaces' outside-click hit-tests.
    pub fn pointer_down(&mut self, point: Point) {
        self.dropdown.pointer_down(point);
        self.sheet.pointer_down(point);
    }

    pub fn badge(&self) -> usize {
        self.store.badge_count()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.store.select(|state| state.notifications.decoded())
    }

    /// Whether an item is mid exit-transition.
    pub fn is_removing(&self, notification_id: &str) -> bool {
        self.removing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(notification_id)
    }

    /// Click a notification: resolve where it navigates and close both
    /// surfaces.
    pub fn activate(&mut self, notification_id: &str) -> Option<NavigationTarget> {
        let target = self
            .store
            .select(|state| state.notifications.find(notification_id))
            .map(|notification| notification.target());
        if target.is_some() {
            self.close_all();
        }
        target
    }

    /// Delete a notification. The item is marked for its exit transition and
    /// the remote delete is fired immediately; local removal happens after
    /// the grace delay regardless of how the remote call went. Remote
    /// failures are logged, never surfaced.
    pub fn delete(&mut self, notification_id: &str) {
        let Some(subject) = self.subject.clone() else {
            return;
        };
        self.removing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(notification_id.to_string());

        let service = self.service.clone();
        let remote_id = notification_id.to_string();
        tokio::spawn(async move {
            if let Err(err) = service.delete_remote(&subject, &remote_id).await {
                error!(error = ?err, notification_id = %remote_id, "failed to delete notification remotely");
            }
        });

        let store = self.store.clone();
        let removing = Arc::clone(&self.removing);
        let local_id = notification_id.to_string();
        let grace = self.delete_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            store.dispatch(Action::DeleteNotification {
                id: local_id.clone(),
            });
            removing
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&local_id);
        });
    }
}

impl Drop for NotificationPanel {
    fn drop(&mut self) {
        self.unmount();
    }
}
