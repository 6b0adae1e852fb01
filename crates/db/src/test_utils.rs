//! Test utilities for database operations.
//!
//! Provides an in-memory `SQLite` database with migrations applied, plus
//! seeding helpers that write rows directly (bypassing service policy).

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, Set,
    prelude::DateTimeWithTimeZone,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{Follower, follower, post, user};
use crate::migrations::Migrator;

/// URL of a private in-memory `SQLite` database.
pub const MEMORY_URL: &str = "sqlite::memory:";

/// A migrated throwaway database.
///
/// The pool holds exactly one connection: every connection to
/// `sqlite::memory:` opens its own empty database. Streams borrowed from the
/// pool must therefore be drained and dropped before the next query.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    pub async fn new() -> Result<Self, DbErr> {
        Self::connect(MEMORY_URL, 1).await
    }

    /// Open the database at `url` with a pool of `max_connections` and run
    /// all migrations.
    ///
    /// Use a file-backed `SQLite` URL when several connections must see the
    /// same data.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(max_connections)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!(url, max_connections, "Created test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.conn.as_ref()
    }

    /// Shared handle, as repositories and services take it.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Insert a user named `username` with email `{username}@example.com`.
    pub async fn seed_user(&self, username: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            password_hash: Set(None),
            about_me: Set(None),
            last_seen: Set(Some(timestamp(0))),
            ..Default::default()
        }
        .insert(self.connection())
        .await
    }

    /// Insert a post at `secs` seconds after the Unix epoch.
    pub async fn seed_post(
        &self,
        user_id: i32,
        body: &str,
        secs: i64,
    ) -> Result<post::Model, DbErr> {
        post::ActiveModel {
            body: Set(body.to_string()),
            timestamp: Set(try_timestamp(secs)?),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(self.connection())
        .await
    }

    /// Insert a raw follow edge, self-edges included.
    pub async fn seed_follow(&self, follower_id: i32, followed_id: i32) -> Result<(), DbErr> {
        Follower::insert(follower::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
        })
        .exec_without_returning(self.connection())
        .await?;
        Ok(())
    }
}

/// UTC timestamp `secs` seconds after the Unix epoch.
///
/// Fails when `secs` is outside the range chrono can represent.
pub fn try_timestamp(secs: i64) -> Result<DateTimeWithTimeZone, DbErr> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(Into::into)
        .ok_or_else(|| DbErr::Custom(format!("timestamp out of range: {secs}")))
}

/// Shorthand for [`try_timestamp`] with literal test values.
///
/// Out-of-range input yields the Unix epoch; use [`try_timestamp`] when the
/// value is not known to be valid.
#[must_use]
pub fn timestamp(secs: i64) -> DateTimeWithTimeZone {
    try_timestamp(secs).unwrap_or_else(|_| Utc.timestamp_nanos(0).into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_utc() {
        let ts = timestamp(60);
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts.timestamp(), 60);
    }

    #[test]
    fn test_out_of_range_timestamp() {
        assert!(matches!(try_timestamp(i64::MAX), Err(DbErr::Custom(_))));
        assert_eq!(timestamp(i64::MAX), timestamp(0));
    }

    #[tokio::test]
    async fn test_new_database_is_migrated_and_empty() {
        let db = TestDatabase::new().await.unwrap();
        let users = crate::entities::User::find()
            .all(db.connection())
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_seed_helpers() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.seed_user("alice").await.unwrap();
        let post = db.seed_post(alice.id, "hi", 10).await.unwrap();

        assert_eq!(alice.email, "alice@example.com");
        assert_eq!(post.user_id, alice.id);
        assert_eq!(post.timestamp, timestamp(10));
    }

    #[tokio::test]
    async fn test_seed_post_rejects_out_of_range_time() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.seed_user("alice").await.unwrap();

        let result = db.seed_post(alice.id, "too late", i64::MAX).await;

        assert!(matches!(result, Err(DbErr::Custom(_))));
        let posts = crate::entities::Post::find()
            .all(db.connection())
            .await
            .unwrap();
        assert!(posts.is_empty());
    }
}
