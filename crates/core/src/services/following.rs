//! Follow graph service.

use futures::Stream;
use microblog_common::{AppError, AppResult};
use microblog_db::repositories::FollowerRepository;
use serde::Serialize;

/// Result of a follow or unfollow call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowOutcome {
    /// The edge set changed.
    Changed,
    /// The edge set was already in the requested state.
    Unchanged,
}

/// Follow graph service for business logic.
///
/// Every edge write in the application goes through here, so this is where
/// self-follows are refused; the repository itself accepts any pair.
#[derive(Clone)]
pub struct FollowService {
    follower_repo: FollowerRepository,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follower_repo: FollowerRepository) -> Self {
        Self { follower_repo }
    }

    /// Follow a user. Following someone already followed is a no-op.
    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> AppResult<FollowOutcome> {
        if follower_id == followed_id {
            return Err(AppError::SelfFollow);
        }

        if self
            .follower_repo
            .insert_if_absent(follower_id, followed_id)
            .await?
        {
            tracing::info!(follower_id, followed_id, "Follow edge created");
            Ok(FollowOutcome::Changed)
        } else {
            tracing::debug!(follower_id, followed_id, "Already following");
            Ok(FollowOutcome::Unchanged)
        }
    }

    /// Unfollow a user. Unfollowing someone not followed is a no-op.
    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> AppResult<FollowOutcome> {
        // No self-edge can exist through this service.
        if follower_id == followed_id {
            return Ok(FollowOutcome::Unchanged);
        }

        if self
            .follower_repo
            .delete_if_present(follower_id, followed_id)
            .await?
        {
            tracing::info!(follower_id, followed_id, "Follow edge removed");
            Ok(FollowOutcome::Changed)
        } else {
            tracing::debug!(follower_id, followed_id, "Not following");
            Ok(FollowOutcome::Unchanged)
        }
    }

    /// Check if `follower_id` follows `followed_id`.
    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        self.follower_repo.exists(follower_id, followed_id).await
    }

    /// Stream the IDs of a user's followers.
    pub async fn followers_of(
        &self,
        user_id: i32,
    ) -> AppResult<impl Stream<Item = AppResult<i32>> + Send + '_> {
        self.follower_repo.stream_followers(user_id).await
    }

    /// Stream the IDs of users a user follows.
    pub async fn following_of(
        &self,
        user_id: i32,
    ) -> AppResult<impl Stream<Item = AppResult<i32>> + Send + '_> {
        self.follower_repo.stream_following(user_id).await
    }

    /// Get a page of follower IDs.
    pub async fn followers_page(
        &self,
        user_id: i32,
        limit: u64,
        until_id: Option<i32>,
    ) -> AppResult<Vec<i32>> {
        self.follower_repo
            .find_followers(user_id, limit, until_id)
            .await
    }

    /// Get a page of followed user IDs.
    pub async fn following_page(
        &self,
        user_id: i32,
        limit: u64,
        until_id: Option<i32>,
    ) -> AppResult<Vec<i32>> {
        self.follower_repo
            .find_following(user_id, limit, until_id)
            .await
    }

    /// Count a user's followers.
    pub async fn follower_count(&self, user_id: i32) -> AppResult<u64> {
        self.follower_repo.count_followers(user_id).await
    }

    /// Count users a user follows.
    pub async fn following_count(&self, user_id: i32) -> AppResult<u64> {
        self.follower_repo.count_following(user_id).await
    }
}
