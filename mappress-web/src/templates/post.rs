use serde_derive::Serialize;

use crate::types::Post;

#[derive(Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: String
}
impl PostView {
    pub fn from_post(post: &Post) -> Self {
        PostView {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            created: post.created.format("%Y-%m-%d %H:%M").to_string()
        }
    }
}

/// The fragment served to the map page's popup fetch.
#[derive(Serialize)]
pub struct PostContentView {
    pub id: i64,
    pub title: String,
    pub content: String
}
impl PostContentView {
    pub fn from_post(post: &Post) -> Self {
        PostContentView {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone()
        }
    }
}
