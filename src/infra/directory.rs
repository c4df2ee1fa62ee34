use anyhow::Result;
use async_trait::async_trait;

use crate::domain::user::UserProfile;

/// User directory lookup, used to hydrate foreign keys on notifications,
/// comments, and likes.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserProfile>>;

    async fn create_user(&self, profile: &UserProfile) -> Result<()>;
}
