use std::time::Duration;

use anyhow::anyhow;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use verse::app::auth::SignupFields;
use verse::config::AppConfig;
use verse::domain::post::Post;
use verse::infra::documents::DocumentStore;
use verse::infra::memory::InMemoryBackend;
use verse::panel::Point;
use verse::AppState;

/// Scripted demo session against the in-memory backend: an author signs up
/// and publishes, a reader likes and comments, and the author's bell picks
/// the activity up over the push channel.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let backend = InMemoryBackend::new(config.clone());
    backend.set_latency(Some(Duration::from_millis(40)));

    let state = AppState::new(
        config.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
    );

    let author = state
        .accounts
        .create_account(SignupFields {
            name: "Rainer".to_string(),
            email: "rainer@example.com".to_string(),
            phone: None,
            password: "letters-to-a-young-poet".to_string(),
            bio: Some("Writes about autumn.".to_string()),
            profile_pic: None,
        })
        .await?;
    info!(user_id = %author.user_id, "author signed up");

    let post = Post {
        id: Uuid::new_v4().to_string(),
        user_id: author.user_id.clone(),
        title: "Autumn Day".to_string(),
        content: "Lord: it is time. The summer was immense.".to_string(),
        featured_image: None,
        liked_by: Vec::new(),
        saved_by: Vec::new(),
        comments: Vec::new(),
    };
    backend
        .create(
            &config.posts_collection,
            &post.id,
            serde_json::to_value(&post)?,
        )
        .await?;
    info!(post_id = %post.id, "post published");

    let mut bell = state.notification_panel();
    bell.mount(&author.user_id)?;

    let reader = state
        .accounts
        .create_account(SignupFields {
            name: "Anna".to_string(),
            email: "anna@example.com".to_string(),
            phone: None,
            password: "quiet-reader".to_string(),
            bio: None,
            profile_pic: None,
        })
        .await?;

    let mut page = state.post_controller(reader.clone());
    if !page.open(&post.id).await? {
        return Err(anyhow!("post {} vanished before the reader opened it", post.id));
    }

    page.toggle_like().await;
    page.add_comment("This made my morning.", Point { x: 480.0, y: 640.0 })
        .await;

    // Let the push channel fan out before reading the bell.
    tokio::time::sleep(Duration::from_millis(300)).await;

    info!(badge = bell.badge(), "author's bell after reader activity");
    for notification in bell.notifications() {
        info!(id = %notification.id, text = %notification.text, "notification");
    }

    bell.toggle_dropdown();
    let newest = bell.notifications().first().map(|n| n.id.clone());
    if let Some(id) = newest {
        bell.delete(&id);
    }
    tokio::time::sleep(config.delete_grace + Duration::from_millis(200)).await;
    info!(badge = bell.badge(), "author's bell after delete");

    page.close();
    bell.unmount();
    state.accounts.logout().await;

    Ok(())
}
