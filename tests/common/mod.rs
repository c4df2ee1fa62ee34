#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use url::Url;
use uuid::Uuid;

use verse::config::AppConfig;
use verse::domain::post::Post;
use verse::domain::user::{Session, UserProfile};
use verse::infra::directory::UserDirectory;
use verse::infra::documents::DocumentStore;
use verse::infra::memory::InMemoryBackend;
use verse::AppState;

// ---------------------------------------------------------------------------
// TestApp — a fresh engine + in-memory backend per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub state: AppState,
    pub backend: Arc<InMemoryBackend>,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        endpoint: Url::parse("https://cloud.example.com/v1").expect("endpoint"),
        project_id: "verse-test".to_string(),
        database_id: "verse-test".to_string(),
        users_collection: "users".to_string(),
        posts_collection: "posts".to_string(),
        media_bucket: "media".to_string(),
        // Short delays so transition-driven tests stay fast.
        delete_grace: Duration::from_millis(50),
        comment_latency: Duration::from_millis(10),
        roster_page_size: 3,
        visible_comments: 3,
    }
}

impl TestApp {
    pub fn setup() -> Self {
        let config = test_config();
        let backend = InMemoryBackend::new(config.clone());
        let state = AppState::new(
            config,
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
        );
        Self { state, backend }
    }

    /// Seed a profile document directly, bypassing the signup flow.
    pub async fn create_user(&self, suffix: &str) -> Session {
        let user_id = format!("user_{}", suffix);
        let name = format!("Test User {}", suffix);
        let profile = UserProfile::new(&user_id, &name);
        self.backend
            .create_user(&profile)
            .await
            .expect("create profile failed");
        Session {
            user_id,
            name,
            email: format!("{}@example.com", suffix),
        }
    }

    /// Insert a post document owned by the given user.
    pub async fn create_post_for_user(&self, owner: &Session) -> Post {
        let post = Post {
            id: Uuid::new_v4().to_string(),
            user_id: owner.user_id.clone(),
            title: "test post".to_string(),
            content: "test content".to_string(),
            featured_image: None,
            liked_by: Vec::new(),
            saved_by: Vec::new(),
            comments: Vec::new(),
        };
        self.backend
            .create(
                &self.state.config.posts_collection,
                &post.id,
                serde_json::to_value(&post).expect("post to json"),
            )
            .await
            .expect("create post failed");
        post
    }

    /// Append a notification record to a user's profile document through the
    /// same path the engine delivers on.
    pub async fn push_notification(&self, user_id: &str, record: &str) {
        self.state
            .notifications
            .deliver(user_id, record)
            .await
            .expect("deliver failed");
    }

    /// The push channel path for a user's profile document.
    pub fn user_channel(&self, user_id: &str) -> String {
        self.state
            .config
            .document_channel(&self.state.config.users_collection, user_id)
    }

    /// The push channel path for a post document.
    pub fn post_channel(&self, post_id: &str) -> String {
        self.state
            .config
            .document_channel(&self.state.config.posts_collection, post_id)
    }
}

/// Build a well-formed notification record.
pub fn record(id: &str, text: &str, post_id: &str, from_user_id: &str) -> String {
    format!("{}|||{}|||{}|||{}", id, text, post_id, from_user_id)
}

/// Let spawned forwarding tasks drain their queues.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}
