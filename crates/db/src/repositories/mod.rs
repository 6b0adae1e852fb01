//! Database repositories.

pub mod follower;
pub mod post;
pub mod user;

pub use follower::FollowerRepository;
pub use post::{FeedCursor, FeedPage, PostRepository};
pub use user::UserRepository;

/// Clamp a row limit to what every backend can bind.
///
/// `SQLite` binds `LIMIT` as `i64`; larger values are not representable.
pub(crate) const fn clamp_limit(limit: u64) -> u64 {
    let max = i64::MAX.unsigned_abs();
    if limit > max { max } else { limit }
}
