use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use time::OffsetDateTime;
use tracing::{error, warn};
use ulid::Ulid;

use crate::app::notifications::NotificationService;
use crate::app::posts::{FlyingComment, PostView};
use crate::config::AppConfig;
use crate::domain::engagement::{Comment, HydratedComment};
use crate::domain::notification::Notification;
use crate::domain::post::Post;
use crate::domain::user::{Session, UserProfile};
use crate::infra::directory::UserDirectory;
use crate::infra::documents::DocumentStore;
use crate::panel::surface::Point;

/// Like, save, and comment flows. Every mutation is optimistic: the view is
/// updated first, the external call follows, and a failed call is logged and
/// swallowed — local state keeps the optimistic value, it is not rolled back.
#[derive(Clone)]
pub struct EngagementService {
    documents: Arc<dyn DocumentStore>,
    directory: Arc<dyn UserDirectory>,
    notifications: NotificationService,
    posts_collection: String,
    comment_latency: Duration,
}

impl EngagementService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        directory: Arc<dyn UserDirectory>,
        notifications: NotificationService,
        config: &AppConfig,
    ) -> Self {
        Self {
            documents,
            directory,
            notifications,
            posts_collection: config.posts_collection.clone(),
            comment_latency: config.comment_latency,
        }
    }

    pub async fn toggle_like(&self, view: &mut PostView, session: &Session) {
        let was_liked = view.post.is_liked_by(&session.user_id);
        if was_liked {
            view.post.remove_like(&session.user_id);
            view.likers
                .retain(|profile| profile.user_id != session.user_id);
        } else {
            view.post.add_like(&session.user_id);
            // Placeholder roster entry; replaced by the next hydration.
            view.likers
                .push(UserProfile::new(&session.user_id, &session.name));
        }

        if let Err(err) = self.persist(&view.post).await {
            error!(error = ?err, post_id = %view.post.id, "failed to persist like toggle");
            return;
        }

        if !was_liked && view.post.user_id != session.user_id {
            let record = like_notification(session, &view.post.id);
            if let Err(err) = self.notifications.deliver(&view.post.user_id, &record).await {
                error!(error = ?err, post_id = %view.post.id, "failed to deliver like notification");
            }
        }
    }

    pub async fn toggle_save(&self, view: &mut PostView, session: &Session) {
        if view.post.is_saved_by(&session.user_id) {
            view.post.remove_save(&session.user_id);
        } else {
            view.post.add_save(&session.user_id);
        }

        if let Err(err) = self.persist(&view.post).await {
            error!(error = ?err, post_id = %view.post.id, "failed to persist save toggle");
        }
    }

    /// Submit a comment. The flying token is shown for the configured window
    /// before the comment is committed; the token never delays persistence
    /// beyond that window.
    pub async fn add_comment(
        &self,
        view: &mut PostView,
        session: &Session,
        text: &str,
        anchor: Point,
    ) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        view.flying_comment = Some(FlyingComment {
            text: text.to_string(),
            anchor,
        });
        tokio::time::sleep(self.comment_latency).await;

        let comment = match Comment::compose(&session.user_id, text, OffsetDateTime::now_utc()) {
            Ok(comment) => comment,
            Err(err) => {
                error!(error = ?err, "failed to compose comment");
                view.flying_comment = None;
                return;
            }
        };

        view.post.comments.push(comment.encode());
        view.comments.push(HydratedComment {
            comment,
            author_name: session.name.clone(),
        });
        sort_hydrated(&mut view.comments);

        if let Err(err) = self.persist(&view.post).await {
            error!(error = ?err, post_id = %view.post.id, "failed to persist comment");
        } else if view.post.user_id != session.user_id {
            let record = comment_notification(session, &view.post.id);
            if let Err(err) = self.notifications.deliver(&view.post.user_id, &record).await {
                error!(error = ?err, post_id = %view.post.id, "failed to deliver comment notification");
            }
        }

        view.flying_comment = None;
    }

    /// Delete a comment by its timestamp key. Allowed for the comment author
    /// and the post owner.
    pub async fn delete_comment(&self, view: &mut PostView, session: &Session, created_at: &str) {
        let Some(target) = view
            .comments
            .iter()
            .find(|entry| entry.comment.created_at == created_at)
        else {
            return;
        };
        if target.comment.user_id != session.user_id && view.post.user_id != session.user_id {
            warn!(user_id = %session.user_id, "refusing comment delete for non-author");
            return;
        }

        view.comments
            .retain(|entry| entry.comment.created_at != created_at);
        view.post.comments.retain(|record| {
            Comment::decode(record)
                .map(|comment| comment.created_at != created_at)
                .unwrap_or(true)
        });

        if let Err(err) = self.persist(&view.post).await {
            error!(error = ?err, post_id = %view.post.id, "failed to persist comment delete");
        }
    }

    /// Decode a post's comment records and join author names from the user
    /// directory; unknown authors render as "Unknown User".
    pub async fn hydrate_comments(&self, records: &[String]) -> Vec<HydratedComment> {
        let comments = Comment::decode_all(records);
        let lookups = comments
            .iter()
            .map(|comment| self.directory.get_user_by_id(&comment.user_id));
        let profiles = join_all(lookups).await;

        comments
            .into_iter()
            .zip(profiles)
            .map(|(comment, profile)| {
                let author_name = match profile {
                    Ok(Some(profile)) => profile.name,
                    Ok(None) => "Unknown User".to_string(),
                    Err(err) => {
                        warn!(error = ?err, user_id = %comment.user_id, "failed to fetch comment author");
                        "Unknown User".to_string()
                    }
                };
                HydratedComment {
                    comment,
                    author_name,
                }
            })
            .collect()
    }

    /// Resolve profiles for every user who liked the post.
    pub async fn hydrate_likers(&self, post: &Post) -> Vec<UserProfile> {
        let lookups = post
            .liked_by
            .iter()
            .map(|user_id| self.directory.get_user_by_id(user_id));
        let profiles = join_all(lookups).await;

        post.liked_by
            .iter()
            .zip(profiles)
            .map(|(user_id, profile)| match profile {
                Ok(Some(profile)) => profile,
                Ok(None) => UserProfile::new(user_id, "Unknown User"),
                Err(err) => {
                    warn!(error = ?err, user_id = %user_id, "failed to fetch liker profile");
                    UserProfile::new(user_id, "Unknown User")
                }
            })
            .collect()
    }

    async fn persist(&self, post: &Post) -> Result<()> {
        self.documents
            .update(&self.posts_collection, &post.id, serde_json::to_value(post)?)
            .await?;
        Ok(())
    }
}

fn like_notification(session: &Session, post_id: &str) -> String {
    Notification {
        id: Ulid::new().to_string(),
        text: format!("{} liked your post!", session.name),
        post_id: Some(post_id.to_string()),
        from_user_id: session.user_id.clone(),
    }
    .encode()
}

fn comment_notification(session: &Session, post_id: &str) -> String {
    Notification {
        id: Ulid::new().to_string(),
        text: format!("{} commented on your post!", session.name),
        post_id: Some(post_id.to_string()),
        from_user_id: session.user_id.clone(),
    }
    .encode()
}

fn sort_hydrated(comments: &mut [HydratedComment]) {
    comments.sort_by(|a, b| b.comment.timestamp().cmp(&a.comment.timestamp()));
}
