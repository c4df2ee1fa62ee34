use anyhow::Result;
use async_trait::async_trait;

use crate::domain::user::Session;

#[derive(Debug, Clone)]
pub struct AccountFields {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// External authentication service. Owns accounts and the current session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, fields: &AccountFields) -> Result<Session>;

    async fn get_current_user(&self) -> Result<Option<Session>>;

    async fn logout(&self) -> Result<()>;
}
