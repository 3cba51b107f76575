use serde_derive::Serialize;

use crate::types::Post;

#[derive(Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub created: String,
    pub link: String
}
impl PostSummary {
    pub fn from_post(post: &Post, base_url: &str) -> Self {
        PostSummary {
            id: post.id,
            title: post.title.clone(),
            created: post.created.format("%Y-%m-%d %H:%M").to_string(),
            link: post.permalink(base_url)
        }
    }
}

#[derive(Serialize)]
pub struct IndexView {
    pub posts: Vec<PostSummary>
}
