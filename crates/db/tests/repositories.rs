//! Repository integration tests against an in-memory `SQLite` database.
//!
//! These run the real SQL of the follow graph and feed query, so they check
//! what the mock-based unit tests cannot: conflict handling, composite keys,
//! subquery semantics and ordering.

#![allow(clippy::unwrap_used)]

use chrono::{FixedOffset, TimeZone, Utc};
use futures::TryStreamExt;
use microblog_common::AppError;
use microblog_db::repositories::{
    FeedCursor, FeedPage, FollowerRepository, PostRepository, UserRepository,
};
use microblog_db::test_utils::{TestDatabase, timestamp};

fn ids(posts: &[microblog_db::entities::post::Model]) -> Vec<i32> {
    posts.iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn test_insert_if_absent_is_idempotent() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let b = db.seed_user("b").await.unwrap();
    let repo = FollowerRepository::new(db.shared());

    assert!(repo.insert_if_absent(a.id, b.id).await.unwrap());
    assert!(!repo.insert_if_absent(a.id, b.id).await.unwrap());

    assert!(repo.exists(a.id, b.id).await.unwrap());
    assert!(!repo.exists(b.id, a.id).await.unwrap());
    assert_eq!(repo.count_followers(b.id).await.unwrap(), 1);
    assert_eq!(repo.count_following(a.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_if_absent_unknown_user() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let repo = FollowerRepository::new(db.shared());

    let result = repo.insert_if_absent(a.id, 404).await;

    assert!(matches!(result, Err(AppError::UserNotFound(_))));
    assert_eq!(repo.count_following(a.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_if_present() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let b = db.seed_user("b").await.unwrap();
    let repo = FollowerRepository::new(db.shared());

    assert!(!repo.delete_if_present(a.id, b.id).await.unwrap());

    repo.insert_if_absent(a.id, b.id).await.unwrap();
    assert!(repo.delete_if_present(a.id, b.id).await.unwrap());
    assert!(!repo.delete_if_present(a.id, b.id).await.unwrap());
    assert!(!repo.exists(a.id, b.id).await.unwrap());
}

#[tokio::test]
async fn test_streams_and_pages() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let b = db.seed_user("b").await.unwrap();
    let c = db.seed_user("c").await.unwrap();
    let repo = FollowerRepository::new(db.shared());

    repo.insert_if_absent(a.id, c.id).await.unwrap();
    repo.insert_if_absent(b.id, c.id).await.unwrap();
    repo.insert_if_absent(c.id, a.id).await.unwrap();

    let followers: Vec<i32> = repo
        .stream_followers(c.id)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(followers, vec![a.id, b.id]);

    let following: Vec<i32> = repo
        .stream_following(c.id)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(following, vec![a.id]);

    let first = repo.find_followers(c.id, 1, None).await.unwrap();
    assert_eq!(first, vec![b.id]);
    let second = repo.find_followers(c.id, 1, Some(b.id)).await.unwrap();
    assert_eq!(second, vec![a.id]);
    assert!(repo.find_following(b.id, 10, Some(c.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feed_merges_own_and_followed_posts() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let b = db.seed_user("b").await.unwrap();
    let c = db.seed_user("c").await.unwrap();

    let p1 = db.seed_post(a.id, "from a", 10).await.unwrap();
    let p2 = db.seed_post(b.id, "from b", 20).await.unwrap();
    db.seed_post(c.id, "from c", 30).await.unwrap();
    db.seed_follow(a.id, b.id).await.unwrap();

    let posts = PostRepository::new(db.shared());

    let feed_a = posts.find_feed(a.id, FeedPage::all()).await.unwrap();
    assert_eq!(ids(&feed_a), vec![p2.id, p1.id]);

    let feed_b = posts.find_feed(b.id, FeedPage::all()).await.unwrap();
    assert_eq!(ids(&feed_b), vec![p2.id]);
}

#[tokio::test]
async fn test_feed_self_edge_does_not_duplicate() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let p1 = db.seed_post(a.id, "one", 10).await.unwrap();
    db.seed_follow(a.id, a.id).await.unwrap();

    let posts = PostRepository::new(db.shared());
    let feed = posts.find_feed(a.id, FeedPage::all()).await.unwrap();

    assert_eq!(ids(&feed), vec![p1.id]);
}

#[tokio::test]
async fn test_feed_ties_break_on_id_and_cursor_resumes() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let b = db.seed_user("b").await.unwrap();
    db.seed_follow(a.id, b.id).await.unwrap();

    let p1 = db.seed_post(a.id, "one", 10).await.unwrap();
    let p2 = db.seed_post(b.id, "two", 10).await.unwrap();
    let p3 = db.seed_post(a.id, "three", 20).await.unwrap();

    let posts = PostRepository::new(db.shared());

    let page1 = posts.find_feed(a.id, FeedPage::first(2)).await.unwrap();
    assert_eq!(ids(&page1), vec![p3.id, p2.id]);

    let cursor = FeedCursor::after(&page1[1]);
    let page2 = posts
        .find_feed(a.id, FeedPage::after(2, cursor))
        .await
        .unwrap();
    assert_eq!(ids(&page2), vec![p1.id]);
}

#[tokio::test]
async fn test_feed_followed_user_without_posts() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let quiet = db.seed_user("quiet").await.unwrap();
    db.seed_follow(a.id, quiet.id).await.unwrap();

    let posts = PostRepository::new(db.shared());
    assert!(posts.find_feed(a.id, FeedPage::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_post_and_explore() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let b = db.seed_user("b").await.unwrap();
    let posts = PostRepository::new(db.shared());

    let first = posts
        .create(a.id, "first".to_string(), timestamp(5))
        .await
        .unwrap();
    let second = posts
        .create(b.id, "second".to_string(), timestamp(6))
        .await
        .unwrap();

    let all = posts.find_all(FeedPage::all()).await.unwrap();
    assert_eq!(ids(&all), vec![second.id, first.id]);
    assert_eq!(posts.count_by_user(a.id).await.unwrap(), 1);

    let by_b = posts.find_by_user(b.id, FeedPage::all()).await.unwrap();
    assert_eq!(ids(&by_b), vec![second.id]);

    let missing = posts.create(99, "nobody".to_string(), timestamp(7)).await;
    assert!(matches!(missing, Err(AppError::UserNotFound(_))));
}

#[tokio::test]
async fn test_duplicate_username_maps_to_duplicate_identity() {
    let db = TestDatabase::new().await.unwrap();
    db.seed_user("alice").await.unwrap();
    let users = UserRepository::new(db.shared());

    let clash = microblog_db::entities::user::ActiveModel {
        username: sea_orm::Set("alice".to_string()),
        email: sea_orm::Set("other@example.com".to_string()),
        last_seen: sea_orm::Set(Some(timestamp(0))),
        ..Default::default()
    };
    let result = users.create(clash).await;

    assert!(matches!(result, Err(AppError::DuplicateIdentity(_))));
}

#[tokio::test]
async fn test_touch_last_seen() {
    let db = TestDatabase::new().await.unwrap();
    let alice = db.seed_user("alice").await.unwrap();
    let users = UserRepository::new(db.shared());

    users.touch_last_seen(alice.id).await.unwrap();

    let reloaded = users.get_by_id(alice.id).await.unwrap();
    assert!(reloaded.last_seen.unwrap() > timestamp(0));
}

#[tokio::test]
async fn test_oversized_limits_are_clamped() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let b = db.seed_user("b").await.unwrap();
    db.seed_follow(a.id, b.id).await.unwrap();
    let p1 = db.seed_post(a.id, "one", 10).await.unwrap();
    let p2 = db.seed_post(b.id, "two", 20).await.unwrap();

    let posts = PostRepository::new(db.shared());
    let feed = posts
        .find_feed(a.id, FeedPage::first(u64::MAX))
        .await
        .unwrap();
    assert_eq!(ids(&feed), vec![p2.id, p1.id]);

    let cursor = FeedCursor::after(&feed[0]);
    let rest = posts
        .find_all(FeedPage::after(u64::MAX, cursor))
        .await
        .unwrap();
    assert_eq!(ids(&rest), vec![p1.id]);

    let follows = FollowerRepository::new(db.shared());
    assert_eq!(follows.find_followers(b.id, u64::MAX, None).await.unwrap(), vec![a.id]);
    assert_eq!(follows.find_following(a.id, u64::MAX, None).await.unwrap(), vec![b.id]);
}

#[tokio::test]
async fn test_feed_orders_mixed_offsets_by_instant() {
    let db = TestDatabase::new().await.unwrap();
    let a = db.seed_user("a").await.unwrap();
    let posts = PostRepository::new(db.shared());

    let plus_five = FixedOffset::east_opt(5 * 3600).unwrap();
    // 05:00Z, written with a +05:00 offset.
    let early = plus_five
        .with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
        .single()
        .unwrap();
    let late = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).single().unwrap();

    let p1 = posts.create(a.id, "early".to_string(), early).await.unwrap();
    let p2 = posts
        .create(a.id, "late".to_string(), late.into())
        .await
        .unwrap();

    assert_eq!(p1.timestamp, early);
    assert_eq!(p1.timestamp.offset().local_minus_utc(), 0);

    let feed = posts.find_feed(a.id, FeedPage::all()).await.unwrap();
    assert_eq!(ids(&feed), vec![p2.id, p1.id]);

    // 06:00Z, written with a +05:00 offset.
    let cursor = FeedCursor {
        timestamp: plus_five
            .with_ymd_and_hms(2024, 1, 1, 11, 0, 0)
            .single()
            .unwrap(),
        id: p2.id,
    };
    let page = posts
        .find_feed(a.id, FeedPage::after(10, cursor))
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![p1.id]);
}
