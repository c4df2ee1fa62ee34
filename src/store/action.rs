use crate::domain::post::Post;
use crate::domain::user::{Session, UserProfile};

/// Every way the store can change. Reducers are pure: the same prior state
/// and action always produce the same next state, and all async work happens
/// before the dispatch.
#[derive(Debug, Clone)]
pub enum Action {
    /// Insert a wire record at the head of the list unless its decoded id is
    /// already present.
    AddNotification { record: String },
    /// Remove every entry whose decoded id matches.
    DeleteNotification { id: String },
    ClearNotifications,
    FetchNotificationsPending,
    /// Wholesale replacement: the external source is ground truth at the
    /// instant the fetch completed.
    FetchNotificationsSucceeded { records: Vec<String> },
    FetchNotificationsFailed { error: String },
    SetUserData { profile: UserProfile },
    Login { session: Session },
    Logout,
    SetPosts { posts: Vec<Post> },
    DeletePost { post_id: String },
}
