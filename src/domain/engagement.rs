use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

const SEPARATOR: &str = "@@@";

/// A comment as stored on a post document: a flat `@@@`-delimited record of
/// exactly three fields. The timestamp doubles as the comment's key, so it
/// must be unique within a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub user_id: String,
    pub text: String,
    /// RFC 3339 timestamp, kept verbatim so records round-trip byte for byte.
    pub created_at: String,
}

/// A comment joined with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedComment {
    pub comment: Comment,
    pub author_name: String,
}

impl Comment {
    pub fn compose(user_id: &str, text: &str, created_at: OffsetDateTime) -> Result<Self> {
        let created_at = created_at
            .format(&Rfc3339)
            .map_err(|err| anyhow!("failed to format comment timestamp: {}", err))?;
        Ok(Self {
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at,
        })
    }

    /// Decode a wire record. Anything that does not split into exactly three
    /// fields is invalid.
    pub fn decode(record: &str) -> Option<Self> {
        let parts: Vec<&str> = record.split(SEPARATOR).collect();
        if parts.len() != 3 {
            return None;
        }
        Some(Self {
            user_id: parts[0].to_string(),
            text: parts[1].to_string(),
            created_at: parts[2].to_string(),
        })
    }

    /// Encode to the wire record. Inverse of [`decode`](Self::decode).
    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.user_id,
            self.text,
            self.created_at,
            sep = SEPARATOR
        )
    }

    /// Decode a post's comment records, discarding malformed entries, newest
    /// first.
    pub fn decode_all(records: &[String]) -> Vec<Self> {
        let mut comments: Vec<Self> = records
            .iter()
            .filter_map(|record| {
                let comment = Self::decode(record);
                if comment.is_none() {
                    warn!(record = %record, "discarding malformed comment record");
                }
                comment
            })
            .collect();
        sort_newest_first(&mut comments);
        comments
    }

    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.created_at, &Rfc3339).ok()
    }

    /// "Today", "Yesterday", or the calendar date.
    pub fn display_date(&self, now: OffsetDateTime) -> String {
        let Some(created) = self.timestamp() else {
            return self.created_at.clone();
        };
        match (now.date() - created.date()).whole_days() {
            0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            _ => created.date().to_string(),
        }
    }
}

/// Strictly descending by timestamp; unparseable timestamps sink to the end.
pub fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}
