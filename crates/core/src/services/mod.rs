//! Business logic services.

#![allow(missing_docs)]

pub mod feed;
pub mod following;
pub mod post;
pub mod user;

pub use feed::FeedService;
pub use following::{FollowOutcome, FollowService};
pub use post::{CreatePostInput, PostService};
pub use user::{RegisterInput, UpdateProfileInput, UserService};
