//! Follower repository (the follow-graph edge set).

use std::sync::Arc;

use super::clamp_limit;
use crate::entities::{Follower, User, follower};
use futures::{Stream, StreamExt};
use microblog_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::OnConflict,
};

/// Follower repository for database operations.
///
/// Edges are unique per ordered `(follower_id, followed_id)` pair. Writes are
/// idempotent: inserting an existing edge or deleting a missing one is a
/// no-op, reported through the returned `bool`.
#[derive(Clone)]
pub struct FollowerRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowerRepository {
    /// Create a new follower repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if an edge exists.
    pub async fn exists(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        let edge = Follower::find_by_id((follower_id, followed_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(edge.is_some())
    }

    /// Insert an edge unless it already exists.
    ///
    /// Runs in one transaction: both users must exist, then the edge is
    /// written with `ON CONFLICT DO NOTHING` so concurrent follows of the
    /// same pair never produce a duplicate. Returns whether a row was added.
    pub async fn insert_if_absent(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        ensure_user(&txn, follower_id).await?;
        ensure_user(&txn, followed_id).await?;

        let model = follower::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
        };
        let inserted = Follower::insert(model)
            .on_conflict(
                OnConflict::columns([follower::Column::FollowerId, follower::Column::FollowedId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Delete an edge if present. Returns whether a row was removed.
    pub async fn delete_if_present(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let result = Follower::delete_by_id((follower_id, followed_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Stream the IDs of users following `user_id`, ascending.
    ///
    /// Rows are pulled from the database as the stream is polled; the
    /// follower set is never loaded into memory as a whole.
    pub async fn stream_followers(
        &self,
        user_id: i32,
    ) -> AppResult<impl Stream<Item = AppResult<i32>> + Send + '_> {
        let rows = Follower::find()
            .filter(follower::Column::FollowedId.eq(user_id))
            .order_by_asc(follower::Column::FollowerId)
            .stream(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(rows.map(|row| {
            row.map(|edge| edge.follower_id)
                .map_err(|e| AppError::Storage(e.to_string()))
        }))
    }

    /// Stream the IDs of users that `user_id` follows, ascending.
    pub async fn stream_following(
        &self,
        user_id: i32,
    ) -> AppResult<impl Stream<Item = AppResult<i32>> + Send + '_> {
        let rows = Follower::find()
            .filter(follower::Column::FollowerId.eq(user_id))
            .order_by_asc(follower::Column::FollowedId)
            .stream(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(rows.map(|row| {
            row.map(|edge| edge.followed_id)
                .map_err(|e| AppError::Storage(e.to_string()))
        }))
    }

    /// Get follower IDs of a user (paginated, descending).
    pub async fn find_followers(
        &self,
        user_id: i32,
        limit: u64,
        until_id: Option<i32>,
    ) -> AppResult<Vec<i32>> {
        let mut query = Follower::find()
            .filter(follower::Column::FollowedId.eq(user_id))
            .order_by_desc(follower::Column::FollowerId);

        if let Some(id) = until_id {
            query = query.filter(follower::Column::FollowerId.lt(id));
        }

        let edges = query
            .limit(clamp_limit(limit))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(edges.into_iter().map(|edge| edge.follower_id).collect())
    }

    /// Get IDs of users a user follows (paginated, descending).
    pub async fn find_following(
        &self,
        user_id: i32,
        limit: u64,
        until_id: Option<i32>,
    ) -> AppResult<Vec<i32>> {
        let mut query = Follower::find()
            .filter(follower::Column::FollowerId.eq(user_id))
            .order_by_desc(follower::Column::FollowedId);

        if let Some(id) = until_id {
            query = query.filter(follower::Column::FollowedId.lt(id));
        }

        let edges = query
            .limit(clamp_limit(limit))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(edges.into_iter().map(|edge| edge.followed_id).collect())
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: i32) -> AppResult<u64> {
        Follower::find()
            .filter(follower::Column::FollowedId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    /// Count users a user follows.
    pub async fn count_following(&self, user_id: i32) -> AppResult<u64> {
        Follower::find()
            .filter(follower::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}

async fn ensure_user(txn: &DatabaseTransaction, id: i32) -> AppResult<()> {
    let user = User::find_by_id(id)
        .one(txn)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    if user.is_none() {
        return Err(AppError::UserNotFound(id.to_string()));
    }
    Ok(())
}
