use anyhow::{anyhow, Result};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub endpoint: Url,
    pub project_id: String,
    pub database_id: String,
    pub users_collection: String,
    pub posts_collection: String,
    pub media_bucket: String,
    /// How long a deleted notification keeps its slot while the exit
    /// transition plays, before it is purged from local state.
    pub delete_grace: Duration,
    /// Window the flying-comment token is shown before the comment is
    /// persisted.
    pub comment_latency: Duration,
    pub roster_page_size: usize,
    pub visible_comments: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let endpoint = env_or("BACKEND_ENDPOINT", "https://cloud.example.com/v1");
        let endpoint =
            Url::parse(&endpoint).map_err(|err| anyhow!("invalid BACKEND_ENDPOINT: {}", err))?;

        Ok(Self {
            endpoint,
            project_id: env_or("BACKEND_PROJECT_ID", "verse"),
            database_id: env_or("BACKEND_DATABASE_ID", "verse"),
            users_collection: env_or("USERS_COLLECTION_ID", "users"),
            posts_collection: env_or("POSTS_COLLECTION_ID", "posts"),
            media_bucket: env_or("MEDIA_BUCKET_ID", "media"),
            delete_grace: Duration::from_millis(env_or_parse(
                "NOTIFICATION_DELETE_GRACE_MS",
                "1000",
            )?),
            comment_latency: Duration::from_millis(env_or_parse("COMMENT_LATENCY_MS", "1000")?),
            roster_page_size: env_or_parse("ROSTER_PAGE_SIZE", "3")?,
            visible_comments: env_or_parse("VISIBLE_COMMENTS", "3")?,
        })
    }

    /// Channel path for push events on a single document.
    pub fn document_channel(&self, collection_id: &str, document_id: &str) -> String {
        format!(
            "databases.{}.collections.{}.documents.{}",
            self.database_id, collection_id, document_id
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
