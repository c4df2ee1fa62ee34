use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

use crate::app::engagement::EngagementService;
use crate::bridge::{RealtimeBridge, SubscriptionHandle};
use crate::config::AppConfig;
use crate::domain::engagement::HydratedComment;
use crate::domain::post::Post;
use crate::domain::user::{Session, UserProfile};
use crate::infra::directory::UserDirectory;
use crate::infra::documents::DocumentStore;
use crate::infra::files::FileStore;
use crate::panel::surface::Point;
use crate::store::{Action, SocialStore};

/// Transient token shown at the composer's screen position while a comment
/// submission is in flight. Cosmetic only.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyingComment {
    pub text: String,
    pub anchor: Point,
}

/// A toast raised to the user, anchored near the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastEvent {
    pub message: String,
    pub at: Point,
}

/// Everything one post page shows: the document plus its hydrated joins.
/// Owned by a single [`PostController`]; never shared between components.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub comments: Vec<HydratedComment>,
    pub author: Option<UserProfile>,
    pub likers: Vec<UserProfile>,
    pub flying_comment: Option<FlyingComment>,
}

/// Post document access and the delete flow.
#[derive(Clone)]
pub struct PostService {
    documents: Arc<dyn DocumentStore>,
    files: Arc<dyn FileStore>,
    directory: Arc<dyn UserDirectory>,
    store: SocialStore,
    posts_collection: String,
}

impl PostService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        files: Arc<dyn FileStore>,
        directory: Arc<dyn UserDirectory>,
        store: SocialStore,
        config: &AppConfig,
    ) -> Self {
        Self {
            documents,
            files,
            directory,
            store,
            posts_collection: config.posts_collection.clone(),
        }
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        match self
            .documents
            .get_by_id(&self.posts_collection, post_id)
            .await?
        {
            Some(document) => {
                let post = serde_json::from_value(document)
                    .map_err(|err| anyhow!("malformed post document: {}", err))?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    pub async fn author_of(&self, post: &Post) -> Option<UserProfile> {
        match self.directory.get_user_by_id(&post.user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = ?err, user_id = %post.user_id, "failed to fetch post author");
                None
            }
        }
    }

    /// Load every post owned by a user into the posts slice.
    pub async fn load_user_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        let documents = self
            .documents
            .query(
                &self.posts_collection,
                &[("user_id".to_string(), json!(user_id))],
            )
            .await?;
        let posts: Vec<Post> = documents
            .into_iter()
            .filter_map(|document| match serde_json::from_value(document) {
                Ok(post) => Some(post),
                Err(err) => {
                    warn!(error = %err, "discarding malformed post document");
                    None
                }
            })
            .collect();
        self.store.dispatch(Action::SetPosts {
            posts: posts.clone(),
        });
        Ok(posts)
    }

    /// Remove the document, then its featured image, then the store entry.
    /// A failed image delete is logged but does not undo the post delete.
    pub async fn delete_post(&self, post: &Post) -> Result<()> {
        self.documents
            .delete(&self.posts_collection, &post.id)
            .await?;
        if let Some(file_ref) = &post.featured_image {
            if let Err(err) = self.files.delete(file_ref).await {
                warn!(error = ?err, post_id = %post.id, "failed to delete featured image");
            }
        }
        self.store.dispatch(Action::DeletePost {
            post_id: post.id.clone(),
        });
        Ok(())
    }
}

/// One mounted post page. Holds the view, the realtime subscription, and the
/// ephemeral paging state for comments and the liked-by roster.
pub struct PostController {
    service: PostService,
    engagement: EngagementService,
    bridge: RealtimeBridge,
    session: Session,
    view: Arc<AsyncMutex<Option<PostView>>>,
    subscription: Option<SubscriptionHandle>,
    roster_page_size: usize,
    visible_likers: usize,
    comment_page_size: usize,
    show_all_comments: bool,
}

impl PostController {
    pub fn new(
        service: PostService,
        engagement: EngagementService,
        bridge: RealtimeBridge,
        session: Session,
        config: &AppConfig,
    ) -> Self {
        Self {
            service,
            engagement,
            bridge,
            session,
            view: Arc::new(AsyncMutex::new(None)),
            subscription: None,
            roster_page_size: config.roster_page_size,
            visible_likers: config.roster_page_size,
            comment_page_size: config.visible_comments,
            show_all_comments: false,
        }
    }

    /// Load the post and attach the realtime subscription; any previous
    /// subscription is torn down first. Returns `false` when the post does
    /// not exist (callers navigate away).
    pub async fn open(&mut self, post_id: &str) -> Result<bool> {
        self.close();

        let Some(post) = self.service.get_post(post_id).await? else {
            return Ok(false);
        };
        let author = self.service.author_of(&post).await;
        let comments = self.engagement.hydrate_comments(&post.comments).await;
        let likers = self.engagement.hydrate_likers(&post).await;
        *self.view.lock().await = Some(PostView {
            post,
            comments,
            author,
            likers,
            flying_comment: None,
        });

        let view = Arc::clone(&self.view);
        let engagement = self.engagement.clone();
        let handle = self.bridge.subscribe_post_updates(post_id, move |post| {
            let view = Arc::clone(&view);
            let engagement = engagement.clone();
            tokio::spawn(async move {
                let comments = engagement.hydrate_comments(&post.comments).await;
                let likers = engagement.hydrate_likers(&post).await;
                let mut guard = view.lock().await;
                if let Some(current) = guard.as_mut() {
                    current.post = post;
                    current.comments = comments;
                    current.likers = likers;
                }
            });
        })?;
        self.subscription = Some(handle);
        Ok(true)
    }

    /// Release the subscription and discard the view. Safe on every exit
    /// path; closing twice is a no-op.
    pub fn close(&mut self) {
        if let Some(handle) = self.subscription.take() {
            handle.close();
        }
        if let Ok(mut guard) = self.view.try_lock() {
            *guard = None;
        }
    }

    /// Read a projection of the current view, if one is loaded.
    pub async fn with_view<T>(&self, selector: impl FnOnce(&PostView) -> T) -> Option<T> {
        self.view.lock().await.as_ref().map(selector)
    }

    pub fn is_author(&self, view: &PostView) -> bool {
        view.post.user_id == self.session.user_id
    }

    pub async fn toggle_like(&self) {
        let mut guard = self.view.lock().await;
        if let Some(view) = guard.as_mut() {
            self.engagement.toggle_like(view, &self.session).await;
        }
    }

    pub async fn toggle_save(&self) {
        let mut guard = self.view.lock().await;
        if let Some(view) = guard.as_mut() {
            self.engagement.toggle_save(view, &self.session).await;
        }
    }

    pub async fn add_comment(&self, text: &str, anchor: Point) {
        let mut guard = self.view.lock().await;
        if let Some(view) = guard.as_mut() {
            self.engagement
                .add_comment(view, &self.session, text, anchor)
                .await;
        }
    }

    pub async fn delete_comment(&self, created_at: &str) {
        let mut guard = self.view.lock().await;
        if let Some(view) = guard.as_mut() {
            self.engagement
                .delete_comment(view, &self.session, created_at)
                .await;
        }
    }

    /// Delete the post. Only the author may; returns whether it happened.
    pub async fn delete_post(&mut self) -> Result<bool> {
        let post = {
            let guard = self.view.lock().await;
            let Some(view) = guard.as_ref() else {
                return Ok(false);
            };
            if !self.is_author(view) {
                warn!(user_id = %self.session.user_id, "refusing post delete for non-author");
                return Ok(false);
            }
            view.post.clone()
        };
        self.service.delete_post(&post).await?;
        self.close();
        Ok(true)
    }

    /// Liked-by roster: the current user first, revealed a page at a time.
    pub async fn roster(&self) -> Vec<UserProfile> {
        let guard = self.view.lock().await;
        let Some(view) = guard.as_ref() else {
            return Vec::new();
        };
        let mut likers = view.likers.clone();
        likers.sort_by_key(|profile| profile.user_id != self.session.user_id);
        likers.truncate(self.visible_likers);
        likers
    }

    pub fn show_more_likers(&mut self) {
        self.visible_likers += self.roster_page_size;
    }

    /// Closing the roster resets the reveal to the first page.
    pub fn reset_roster(&mut self) {
        self.visible_likers = self.roster_page_size;
    }

    /// Comments currently shown: the first page, or all of them.
    pub async fn comments(&self) -> Vec<HydratedComment> {
        let guard = self.view.lock().await;
        let Some(view) = guard.as_ref() else {
            return Vec::new();
        };
        if self.show_all_comments {
            view.comments.clone()
        } else {
            view.comments
                .iter()
                .take(self.comment_page_size)
                .cloned()
                .collect()
        }
    }

    pub fn toggle_show_more_comments(&mut self) {
        self.show_all_comments = !self.show_all_comments;
    }

    /// Copy guard: everyone but the author gets a warning toast instead of
    /// the copied content.
    pub async fn guard_copy(&self, at: Point) -> Option<ToastEvent> {
        let guard = self.view.lock().await;
        let view = guard.as_ref()?;
        if self.is_author(view) {
            return None;
        }
        Some(ToastEvent {
            message: "Only the author can copy the content.".to_string(),
            at,
        })
    }
}

impl Drop for PostController {
    fn drop(&mut self) {
        self.close();
    }
}
