//! Post repository.
//!
//! Also hosts the feed query: a user's own posts merged with the posts of
//! everyone they follow, newest first.

use std::sync::Arc;

use super::clamp_limit;
use crate::entities::{Follower, Post, User, follower, post};
use chrono::Utc;
use microblog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::Query,
};
use serde::{Deserialize, Serialize};

/// Position in a feed, taken from the last post of the previous page.
///
/// Feeds are ordered by `(timestamp DESC, id DESC)`, so the cursor is the
/// same pair; the next page starts strictly after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCursor {
    pub timestamp: DateTimeWithTimeZone,
    pub id: i32,
}

impl FeedCursor {
    /// Cursor pointing just past the given post.
    #[must_use]
    pub fn after(post: &post::Model) -> Self {
        Self {
            timestamp: post.timestamp,
            id: post.id,
        }
    }
}

/// Page request for feed-ordered post queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedPage {
    /// Maximum number of posts; `None` returns everything.
    pub limit: Option<u64>,
    /// Only posts strictly after this cursor.
    pub until: Option<FeedCursor>,
}

impl FeedPage {
    /// Every post, no limit.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            limit: None,
            until: None,
        }
    }

    /// First page of the given size.
    #[must_use]
    pub const fn first(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            until: None,
        }
    }

    /// Page of the given size after a cursor.
    #[must_use]
    pub const fn after(limit: u64, cursor: FeedCursor) -> Self {
        Self {
            limit: Some(limit),
            until: Some(cursor),
        }
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a post for an existing author.
    ///
    /// The author check and the insert share one transaction, so a post is
    /// never written for a user that does not exist and concurrent readers
    /// never observe a partial write.
    pub async fn create(
        &self,
        author_id: i32,
        body: String,
        timestamp: DateTimeWithTimeZone,
    ) -> AppResult<post::Model> {
        // SQLite does not enforce varchar lengths.
        if body.chars().count() > post::MAX_BODY_LEN {
            return Err(AppError::Validation(format!(
                "Post body exceeds {} characters",
                post::MAX_BODY_LEN
            )));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let author = User::find_by_id(author_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        if author.is_none() {
            return Err(AppError::UserNotFound(author_id.to_string()));
        }

        let post = post::ActiveModel {
            body: Set(body),
            timestamp: Set(to_utc(timestamp)),
            user_id: Set(author_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(post)
    }

    /// Get posts by one author, feed-ordered.
    pub async fn find_by_user(&self, user_id: i32, page: FeedPage) -> AppResult<Vec<post::Model>> {
        paged(Post::find().filter(post::Column::UserId.eq(user_id)), page)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    /// Get every post, feed-ordered.
    pub async fn find_all(&self, page: FeedPage) -> AppResult<Vec<post::Model>> {
        paged(Post::find(), page)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    /// Get the feed for a user: their own posts plus posts by everyone they
    /// follow, ordered by `(timestamp DESC, id DESC)`.
    ///
    /// This is a single `SELECT` over `post` with the followed set as a
    /// subquery, so each post appears at most once no matter how many paths
    /// make it visible (including a data-level self-follow). Edges pointing
    /// at users without posts contribute nothing.
    pub async fn find_feed(&self, user_id: i32, page: FeedPage) -> AppResult<Vec<post::Model>> {
        let followed = Query::select()
            .column(follower::Column::FollowedId)
            .from(Follower)
            .and_where(follower::Column::FollowerId.eq(user_id))
            .to_owned();

        let authors = Condition::any()
            .add(post::Column::UserId.eq(user_id))
            .add(post::Column::UserId.in_subquery(followed));

        paged(Post::find().filter(authors), page)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    /// Count posts by one author.
    pub async fn count_by_user(&self, user_id: i32) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}

/// Apply feed ordering, the cursor, and the limit to a post query.
fn paged(query: Select<Post>, page: FeedPage) -> Select<Post> {
    let mut query = query
        .order_by_desc(post::Column::Timestamp)
        .order_by_desc(post::Column::Id);

    if let Some(cursor) = page.until {
        let timestamp = to_utc(cursor.timestamp);
        query = query.filter(
            Condition::any()
                .add(post::Column::Timestamp.lt(timestamp))
                .add(
                    Condition::all()
                        .add(post::Column::Timestamp.eq(timestamp))
                        .add(post::Column::Id.lt(cursor.id)),
                ),
        );
    }

    if let Some(limit) = page.limit {
        query = query.limit(clamp_limit(limit));
    }

    query
}

/// Timestamps are stored and compared in UTC.
///
/// `SQLite` keeps them as text, so only a single offset sorts correctly.
fn to_utc(timestamp: DateTimeWithTimeZone) -> DateTimeWithTimeZone {
    timestamp.with_timezone(&Utc).into()
}
