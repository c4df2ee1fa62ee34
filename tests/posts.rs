//! Post page tests: loading and hydration, the liked-by roster, comment
//! paging, the copy guard, and the delete flow.

mod common;

use common::{settle, TestApp};
use verse::panel::Point;

const POINTER: Point = Point { x: 12.0, y: 34.0 };

#[tokio::test]
async fn open_returns_false_for_a_missing_post() {
    let app = TestApp::setup();
    let user = app.create_user("missing_post").await;
    let mut page = app.state.post_controller(user);
    assert!(!page.open("nope").await.expect("open"));
}

#[tokio::test]
async fn open_hydrates_author_comments_and_likers() {
    let app = TestApp::setup();
    let owner = app.create_user("load_owner").await;
    let reader = app.create_user("load_reader").await;
    let post = app.create_post_for_user(&owner).await;

    // Seed a like and a comment through the reader's page.
    {
        let mut seed = app.state.post_controller(reader.clone());
        assert!(seed.open(&post.id).await.expect("open"));
        seed.toggle_like().await;
        seed.add_comment("seeded", POINTER).await;
        seed.close();
    }

    let mut page = app.state.post_controller(owner.clone());
    assert!(page.open(&post.id).await.expect("open"));

    let (author, comment_authors, likers) = page
        .with_view(|view| {
            (
                view.author.clone(),
                view.comments
                    .iter()
                    .map(|c| c.author_name.clone())
                    .collect::<Vec<_>>(),
                view.likers
                    .iter()
                    .map(|p| p.user_id.clone())
                    .collect::<Vec<_>>(),
            )
        })
        .await
        .expect("view loaded");

    assert_eq!(author.map(|a| a.user_id), Some(owner.user_id.clone()));
    assert_eq!(comment_authors, vec![reader.name.clone()]);
    assert_eq!(likers, vec![reader.user_id.clone()]);
}

#[tokio::test]
async fn roster_puts_the_current_user_first_and_pages() {
    let app = TestApp::setup();
    let owner = app.create_user("roster_owner").await;
    let post = app.create_post_for_user(&owner).await;

    // Five likers, the current user buried in the middle.
    let me = app.create_user("roster_me").await;
    let mut likers = Vec::new();
    for index in 0..4 {
        likers.push(app.create_user(&format!("roster_{}", index)).await);
    }
    for session in [&likers[0], &likers[1], &me, &likers[2], &likers[3]] {
        let mut page = app.state.post_controller((*session).clone());
        assert!(page.open(&post.id).await.expect("open"));
        page.toggle_like().await;
        page.close();
    }

    let mut page = app.state.post_controller(me.clone());
    assert!(page.open(&post.id).await.expect("open"));

    let first_page = page.roster().await;
    assert_eq!(first_page.len(), 3);
    assert_eq!(first_page[0].user_id, me.user_id);

    page.show_more_likers();
    assert_eq!(page.roster().await.len(), 5);

    page.reset_roster();
    assert_eq!(page.roster().await.len(), 3);
}

#[tokio::test]
async fn comments_page_until_expanded() {
    let app = TestApp::setup();
    let owner = app.create_user("page_owner").await;
    let post = app.create_post_for_user(&owner).await;

    let mut page = app.state.post_controller(owner.clone());
    assert!(page.open(&post.id).await.expect("open"));
    for index in 0..5 {
        page.add_comment(&format!("comment {}", index), POINTER).await;
    }

    assert_eq!(page.comments().await.len(), 3);
    page.toggle_show_more_comments();
    assert_eq!(page.comments().await.len(), 5);
    // Newest first even when expanded.
    assert_eq!(page.comments().await[0].comment.text, "comment 4");
}

#[tokio::test]
async fn copy_guard_warns_everyone_but_the_author() {
    let app = TestApp::setup();
    let owner = app.create_user("copy_owner").await;
    let reader = app.create_user("copy_reader").await;
    let post = app.create_post_for_user(&owner).await;

    let mut owner_page = app.state.post_controller(owner.clone());
    assert!(owner_page.open(&post.id).await.expect("open"));
    assert_eq!(owner_page.guard_copy(POINTER).await, None);

    let mut reader_page = app.state.post_controller(reader.clone());
    assert!(reader_page.open(&post.id).await.expect("open"));
    let toast = reader_page
        .guard_copy(POINTER)
        .await
        .expect("toast for non-author");
    assert_eq!(toast.message, "Only the author can copy the content.");
    assert_eq!(toast.at, POINTER);
}

#[tokio::test]
async fn only_the_author_can_delete_the_post() {
    let app = TestApp::setup();
    let owner = app.create_user("delete_owner").await;
    let reader = app.create_user("delete_reader").await;
    let post = app.create_post_for_user(&owner).await;

    let mut reader_page = app.state.post_controller(reader.clone());
    assert!(reader_page.open(&post.id).await.expect("open"));
    assert!(!reader_page.delete_post().await.expect("delete attempt"));
    assert!(app
        .state
        .posts
        .get_post(&post.id)
        .await
        .expect("get post")
        .is_some());

    let mut owner_page = app.state.post_controller(owner.clone());
    assert!(owner_page.open(&post.id).await.expect("open"));
    assert!(owner_page.delete_post().await.expect("delete"));
    assert!(app
        .state
        .posts
        .get_post(&post.id)
        .await
        .expect("get post")
        .is_none());
}

#[tokio::test]
async fn load_user_posts_fills_the_posts_slice() {
    let app = TestApp::setup();
    let owner = app.create_user("slice_owner").await;
    let other = app.create_user("slice_other").await;
    app.create_post_for_user(&owner).await;
    app.create_post_for_user(&owner).await;
    app.create_post_for_user(&other).await;

    let posts = app
        .state
        .posts
        .load_user_posts(&owner.user_id)
        .await
        .expect("load");
    assert_eq!(posts.len(), 2);
    assert_eq!(
        app.state.store.select(|state| state.posts.posts.len()),
        2
    );
}

#[tokio::test]
async fn closed_page_ignores_later_updates() {
    let app = TestApp::setup();
    let owner = app.create_user("closed_owner").await;
    let reader = app.create_user("closed_reader").await;
    let post = app.create_post_for_user(&owner).await;

    let mut owner_page = app.state.post_controller(owner.clone());
    assert!(owner_page.open(&post.id).await.expect("open"));
    owner_page.close();

    let mut reader_page = app.state.post_controller(reader.clone());
    assert!(reader_page.open(&post.id).await.expect("open"));
    reader_page.toggle_like().await;
    settle().await;

    assert!(owner_page.with_view(|view| view.post.id.clone()).await.is_none());
}
