use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// External document store. Documents are opaque JSON keyed by collection and
/// an opaque unique id; filters are field-equality pairs.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_by_id(&self, collection_id: &str, document_id: &str) -> Result<Option<Value>>;

    async fn query(&self, collection_id: &str, filters: &[(String, Value)]) -> Result<Vec<Value>>;

    async fn create(&self, collection_id: &str, document_id: &str, document: Value)
        -> Result<Value>;

    async fn update(&self, collection_id: &str, document_id: &str, document: Value)
        -> Result<Value>;

    async fn delete(&self, collection_id: &str, document_id: &str) -> Result<()>;
}
