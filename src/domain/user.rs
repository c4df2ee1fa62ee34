use serde::{Deserialize, Serialize};

/// Profile document in the user directory. Read-mostly reference data,
/// fetched per foreign key to hydrate notifications, comments, and likes.
/// The notification records for a user also live on this document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub notifications: Vec<String>,
}

impl UserProfile {
    /// Minimal profile carrying only identity and display name.
    pub fn new(user_id: &str, name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: String::new(),
            phone: None,
            password_hash: None,
            profile_pic_url: None,
            bio: None,
            notifications: Vec::new(),
        }
    }
}

/// The externally owned identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
}
