//! Blog posts bundled into the binary.

use std::sync::OnceLock;

use axum::{extract::Path, Json};
use shared_types::BlogPost;

use crate::error::{ApiError, ApiResult};

const BLOG_POSTS_JSON: &str = include_str!("../content/blog_posts.json");

fn posts() -> &'static [BlogPost] {
    static POSTS: OnceLock<Vec<BlogPost>> = OnceLock::new();
    POSTS.get_or_init(|| match serde_json::from_str(BLOG_POSTS_JSON) {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("Bundled blog posts are malformed: {}", e);
            Vec::new()
        }
    })
}

pub fn find_post(slug: &str) -> Option<&'static BlogPost> {
    posts().iter().find(|post| post.slug == slug)
}

/// Post metadata for the index page, without content blocks.
pub async fn list_posts() -> Json<Vec<BlogPost>> {
    Json(
        posts()
            .iter()
            .map(|post| BlogPost {
                content: Vec::new(),
                ..post.clone()
            })
            .collect(),
    )
}

pub async fn get_post(Path(slug): Path<String>) -> ApiResult<Json<BlogPost>> {
    find_post(&slug)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Post"))
}
