//! Post service.

use microblog_common::{AppError, AppResult};
use microblog_db::{entities::post, repositories::PostRepository};
use serde::Deserialize;
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 140))]
    pub body: String,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(post_repo: PostRepository) -> Self {
        Self { post_repo }
    }

    /// Publish a post, timestamped now.
    pub async fn create(&self, user_id: i32, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        if input.body.trim().is_empty() {
            return Err(AppError::Validation("Post body is blank".to_string()));
        }

        let post = self
            .post_repo
            .create(user_id, input.body, chrono::Utc::now().into())
            .await?;

        tracing::info!(post_id = post.id, user_id, "Post created");
        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get(&self, id: i32) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }
}
