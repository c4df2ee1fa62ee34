use serde::{Deserialize, Serialize};

/// A post document as held by the external document store. Comments stay as
/// raw wire records here; decoding happens at the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub saved_by: Vec<String>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by.iter().any(|id| id == user_id)
    }

    pub fn is_saved_by(&self, user_id: &str) -> bool {
        self.saved_by.iter().any(|id| id == user_id)
    }

    pub fn add_like(&mut self, user_id: &str) {
        if !self.is_liked_by(user_id) {
            self.liked_by.push(user_id.to_string());
        }
    }

    pub fn remove_like(&mut self, user_id: &str) {
        self.liked_by.retain(|id| id != user_id);
    }

    pub fn add_save(&mut self, user_id: &str) {
        if !self.is_saved_by(user_id) {
            self.saved_by.push(user_id.to_string());
        }
    }

    pub fn remove_save(&mut self, user_id: &str) {
        self.saved_by.retain(|id| id != user_id);
    }
}
