//! Feed service.
//!
//! A user's feed is their own posts plus the posts of everyone they follow,
//! newest first, each post at most once. Ties on timestamp are broken by
//! post ID, descending, so the order is total and pages never overlap.

use microblog_common::{AppResult, Config};
use microblog_db::{
    entities::post,
    repositories::{FeedCursor, FeedPage, PostRepository, UserRepository},
};

/// Feed service for business logic.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    page_size: u64,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub fn new(post_repo: PostRepository, user_repo: UserRepository, config: &Config) -> Self {
        Self {
            post_repo,
            user_repo,
            page_size: config.feed.page_size,
        }
    }

    /// The whole feed of a user.
    pub async fn feed_for(&self, user_id: i32) -> AppResult<Vec<post::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.post_repo.find_feed(user_id, FeedPage::all()).await
    }

    /// One page of a user's feed. `limit` defaults to the configured page size.
    pub async fn feed_page(
        &self,
        user_id: i32,
        limit: Option<u64>,
        until: Option<FeedCursor>,
    ) -> AppResult<Vec<post::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.post_repo
            .find_feed(user_id, self.page(limit, until))
            .await
    }

    /// Every post on the instance, newest first.
    pub async fn explore(
        &self,
        limit: Option<u64>,
        until: Option<FeedCursor>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_all(self.page(limit, until)).await
    }

    /// Posts by one user, newest first.
    pub async fn user_posts(
        &self,
        user_id: i32,
        limit: Option<u64>,
        until: Option<FeedCursor>,
    ) -> AppResult<Vec<post::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.post_repo
            .find_by_user(user_id, self.page(limit, until))
            .await
    }

    /// Number of posts by one user.
    pub async fn post_count(&self, user_id: i32) -> AppResult<u64> {
        self.post_repo.count_by_user(user_id).await
    }

    fn page(&self, limit: Option<u64>, until: Option<FeedCursor>) -> FeedPage {
        FeedPage {
            limit: Some(limit.unwrap_or(self.page_size)),
            until,
        }
    }
}
