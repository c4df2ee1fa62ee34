use crate::domain::post::Post;
use crate::store::action::Action;

#[derive(Debug, Clone, Default)]
pub struct PostsSlice {
    pub posts: Vec<Post>,
}

pub(crate) fn reduce(slice: &mut PostsSlice, action: &Action) {
    match action {
        Action::SetPosts { posts } => slice.posts = posts.clone(),
        Action::DeletePost { post_id } => slice.posts.retain(|post| post.id != *post_id),
        _ => {}
    }
}
