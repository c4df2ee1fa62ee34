//! Interaction action tests: optimistic like/save/comment flows, the
//! no-rollback gap, and owner notifications.

mod common;

use common::{settle, TestApp};
use verse::app::posts::PostView;
use verse::domain::post::Post;
use verse::panel::Point;

fn view_for(post: Post) -> PostView {
    PostView {
        post,
        comments: Vec::new(),
        author: None,
        likers: Vec::new(),
        flying_comment: None,
    }
}

const ANCHOR: Point = Point { x: 100.0, y: 200.0 };

// ===========================================================================
// Likes and saves
// ===========================================================================

#[tokio::test]
async fn like_is_applied_locally_before_the_server_confirms() {
    let app = TestApp::setup();
    let owner = app.create_user("like_owner").await;
    let reader = app.create_user("like_reader").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post.clone());

    app.state.engagement.toggle_like(&mut view, &reader).await;

    assert!(view.post.is_liked_by(&reader.user_id));
    assert!(view
        .likers
        .iter()
        .any(|profile| profile.user_id == reader.user_id));

    // And the write went through.
    let stored = app
        .state
        .posts
        .get_post(&post.id)
        .await
        .expect("get post")
        .expect("post exists");
    assert!(stored.is_liked_by(&reader.user_id));
}

#[tokio::test]
async fn failed_like_keeps_the_optimistic_state() {
    let app = TestApp::setup();
    let owner = app.create_user("fail_owner").await;
    let reader = app.create_user("fail_reader").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post.clone());

    app.backend.set_fail_writes(true);
    app.state.engagement.toggle_like(&mut view, &reader).await;

    // Local state keeps the like even though the write failed: the
    // documented optimistic-desync gap, pinned on purpose.
    assert!(view.post.is_liked_by(&reader.user_id));

    app.backend.set_fail_writes(false);
    let stored = app
        .state
        .posts
        .get_post(&post.id)
        .await
        .expect("get post")
        .expect("post exists");
    assert!(!stored.is_liked_by(&reader.user_id));
}

#[tokio::test]
async fn unlike_removes_the_membership() {
    let app = TestApp::setup();
    let owner = app.create_user("unlike_owner").await;
    let reader = app.create_user("unlike_reader").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post);

    app.state.engagement.toggle_like(&mut view, &reader).await;
    app.state.engagement.toggle_like(&mut view, &reader).await;

    assert!(!view.post.is_liked_by(&reader.user_id));
    assert!(view
        .likers
        .iter()
        .all(|profile| profile.user_id != reader.user_id));
}

#[tokio::test]
async fn save_toggles_membership() {
    let app = TestApp::setup();
    let owner = app.create_user("save_owner").await;
    let reader = app.create_user("save_reader").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post);

    app.state.engagement.toggle_save(&mut view, &reader).await;
    assert!(view.post.is_saved_by(&reader.user_id));

    app.state.engagement.toggle_save(&mut view, &reader).await;
    assert!(!view.post.is_saved_by(&reader.user_id));
}

#[tokio::test]
async fn like_notifies_the_post_owner() {
    let app = TestApp::setup();
    let owner = app.create_user("notify_owner").await;
    let reader = app.create_user("notify_reader").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post.clone());

    app.state.engagement.toggle_like(&mut view, &reader).await;

    app.state.notifications.fetch(&owner.user_id).await;
    let notifications = app
        .state
        .store
        .select(|state| state.notifications.decoded());
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].text.contains("liked your post"));
    assert_eq!(notifications[0].post_id.as_deref(), Some(post.id.as_str()));
    assert_eq!(notifications[0].from_user_id, reader.user_id);
}

#[tokio::test]
async fn liking_your_own_post_does_not_notify() {
    let app = TestApp::setup();
    let owner = app.create_user("self_like").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post);

    app.state.engagement.toggle_like(&mut view, &owner).await;

    app.state.notifications.fetch(&owner.user_id).await;
    assert_eq!(app.state.store.badge_count(), 0);
}

// ===========================================================================
// Comments
// ===========================================================================

#[tokio::test]
async fn comment_is_inserted_sorted_and_persisted() {
    let app = TestApp::setup();
    let owner = app.create_user("comment_owner").await;
    let reader = app.create_user("comment_reader").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post.clone());

    app.state
        .engagement
        .add_comment(&mut view, &reader, "first!", ANCHOR)
        .await;
    app.state
        .engagement
        .add_comment(&mut view, &reader, "second!", ANCHOR)
        .await;

    assert_eq!(view.comments.len(), 2);
    assert_eq!(view.comments[0].comment.text, "second!");
    assert_eq!(view.comments[0].author_name, reader.name);
    assert_eq!(view.flying_comment, None);

    let stored = app
        .state
        .posts
        .get_post(&post.id)
        .await
        .expect("get post")
        .expect("post exists");
    assert_eq!(stored.comments.len(), 2);

    // The owner heard about it.
    app.state.notifications.fetch(&owner.user_id).await;
    assert_eq!(app.state.store.badge_count(), 2);
}

#[tokio::test]
async fn blank_comments_are_ignored() {
    let app = TestApp::setup();
    let owner = app.create_user("blank_owner").await;
    let reader = app.create_user("blank_reader").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post);

    app.state
        .engagement
        .add_comment(&mut view, &reader, "   ", ANCHOR)
        .await;

    assert!(view.comments.is_empty());
    assert!(view.post.comments.is_empty());
}

#[tokio::test]
async fn comment_author_and_post_owner_may_delete() {
    let app = TestApp::setup();
    let owner = app.create_user("del_owner").await;
    let reader = app.create_user("del_reader").await;
    let other = app.create_user("del_other").await;
    let post = app.create_post_for_user(&owner).await;
    let mut view = view_for(post);

    app.state
        .engagement
        .add_comment(&mut view, &reader, "mine", ANCHOR)
        .await;
    let key = view.comments[0].comment.created_at.clone();

    // A bystander cannot delete it.
    app.state
        .engagement
        .delete_comment(&mut view, &other, &key)
        .await;
    assert_eq!(view.comments.len(), 1);

    // The post owner can.
    app.state
        .engagement
        .delete_comment(&mut view, &owner, &key)
        .await;
    assert!(view.comments.is_empty());
    assert!(view.post.comments.is_empty());
}

#[tokio::test]
async fn hydration_joins_author_names_with_fallback() {
    let app = TestApp::setup();
    let known = app.create_user("hydrate_known").await;
    let records = vec![
        format!("{}@@@hello@@@2026-08-01T10:00:00Z", known.user_id),
        "ghost@@@who@@@2026-08-02T10:00:00Z".to_string(),
    ];

    let comments = app.state.engagement.hydrate_comments(&records).await;
    assert_eq!(comments.len(), 2);
    // Newest first: the ghost's comment leads.
    assert_eq!(comments[0].author_name, "Unknown User");
    assert_eq!(comments[1].author_name, known.name);
}

// ===========================================================================
// End to end over the push channel
// ===========================================================================

#[tokio::test]
async fn a_like_reaches_the_other_viewer_of_the_post() {
    let app = TestApp::setup();
    let owner = app.create_user("e2e_owner").await;
    let reader = app.create_user("e2e_reader").await;
    let post = app.create_post_for_user(&owner).await;

    let mut owner_page = app.state.post_controller(owner.clone());
    assert!(owner_page.open(&post.id).await.expect("open"));

    let reader_page = {
        let mut page = app.state.post_controller(reader.clone());
        assert!(page.open(&post.id).await.expect("open"));
        page
    };

    reader_page.toggle_like().await;
    settle().await;

    let liked_by = owner_page
        .with_view(|view| view.post.liked_by.clone())
        .await
        .expect("view loaded");
    assert!(liked_by.contains(&reader.user_id));
}
