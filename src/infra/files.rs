use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// External file storage. Uploads return an opaque file reference; preview
/// URLs are derived locally from the reference.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(&self, filename: &str, bytes: Bytes) -> Result<String>;

    fn preview_url(&self, file_ref: &str) -> String;

    async fn delete(&self, file_ref: &str) -> Result<()>;
}
