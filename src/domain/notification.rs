use serde::{Deserialize, Serialize};

const SEPARATOR: &str = "|||";
const NO_POST: &str = "null";

/// A notification as decoded from its wire record.
///
/// The record is a flat `|||`-delimited string: the first field is the id,
/// the second the display text, and the *last two* fields are the post id and
/// the sender id. Everything between is free-form and may itself grow extra
/// fields, which is why the trailing pair is addressed from the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub text: String,
    /// `None` when the record carries the no-post sentinel; the notification
    /// then routes to the sender's profile.
    pub post_id: Option<String>,
    pub from_user_id: String,
}

/// Where activating a notification should take the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    Post { post_id: String },
    Profile { user_id: String },
}

impl Notification {
    /// Decode a wire record. Records with fewer than four fields are invalid.
    pub fn decode(record: &str) -> Option<Self> {
        let parts: Vec<&str> = record.split(SEPARATOR).collect();
        if parts.len() < 4 {
            return None;
        }

        let post_id = parts[parts.len() - 2];
        let from_user_id = parts[parts.len() - 1];

        Some(Self {
            id: parts[0].to_string(),
            text: parts[1].to_string(),
            post_id: (post_id != NO_POST).then(|| post_id.to_string()),
            from_user_id: from_user_id.to_string(),
        })
    }

    /// Encode to the wire record. Inverse of [`decode`](Self::decode) for
    /// fields that do not themselves contain the separator.
    pub fn encode(&self) -> String {
        format!(
            "{id}{sep}{text}{sep}{post}{sep}{from}",
            id = self.id,
            text = self.text,
            post = self.post_id.as_deref().unwrap_or(NO_POST),
            from = self.from_user_id,
            sep = SEPARATOR,
        )
    }

    /// Decode just the id of a record, for dedupe and delete matching.
    pub fn decode_id(record: &str) -> Option<String> {
        Self::decode(record).map(|notification| notification.id)
    }

    pub fn target(&self) -> NavigationTarget {
        match &self.post_id {
            Some(post_id) => NavigationTarget::Post {
                post_id: post_id.clone(),
            },
            None => NavigationTarget::Profile {
                user_id: self.from_user_id.clone(),
            },
        }
    }
}
