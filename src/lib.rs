pub mod app;
pub mod bridge;
pub mod config;
pub mod domain;
pub mod infra;
pub mod panel;
pub mod store;

use std::sync::Arc;

use crate::app::auth::AccountService;
use crate::app::engagement::EngagementService;
use crate::app::notifications::NotificationService;
use crate::app::posts::{PostController, PostService};
use crate::bridge::RealtimeBridge;
use crate::config::AppConfig;
use crate::domain::user::Session;
use crate::infra::auth::AuthProvider;
use crate::infra::directory::UserDirectory;
use crate::infra::documents::DocumentStore;
use crate::infra::files::FileStore;
use crate::infra::realtime::RealtimeProvider;
use crate::panel::NotificationPanel;
use crate::store::SocialStore;

/// The wired engine: one store, one bridge, and the services around them.
/// External collaborators are injected, so tests and the demo binary run the
/// same code against the in-memory backend.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: SocialStore,
    pub bridge: RealtimeBridge,
    pub accounts: AccountService,
    pub notifications: NotificationService,
    pub engagement: EngagementService,
    pub posts: PostService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthProvider>,
        documents: Arc<dyn DocumentStore>,
        files: Arc<dyn FileStore>,
        realtime: Arc<dyn RealtimeProvider>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        let store = SocialStore::new();
        let bridge = RealtimeBridge::new(realtime, config.clone());
        let notifications =
            NotificationService::new(store.clone(), Arc::clone(&documents), &config);
        let engagement = EngagementService::new(
            Arc::clone(&documents),
            Arc::clone(&directory),
            notifications.clone(),
            &config,
        );
        let accounts = AccountService::new(
            auth,
            Arc::clone(&files),
            Arc::clone(&directory),
            store.clone(),
        );
        let posts = PostService::new(documents, files, directory, store.clone(), &config);

        Self {
            config,
            store,
            bridge,
            accounts,
            notifications,
            engagement,
            posts,
        }
    }

    /// A notification bell wired to this state.
    pub fn notification_panel(&self) -> NotificationPanel {
        NotificationPanel::new(
            self.store.clone(),
            self.notifications.clone(),
            self.bridge.clone(),
            &self.config,
        )
    }

    /// A post page controller for the given session.
    pub fn post_controller(&self, session: Session) -> PostController {
        PostController::new(
            self.posts.clone(),
            self.engagement.clone(),
            self.bridge.clone(),
            session,
            &self.config,
        )
    }
}
