//! Database entities.

#![allow(missing_docs)]

pub mod follower;
pub mod post;
pub mod user;

pub use follower::Entity as Follower;
pub use post::Entity as Post;
pub use user::Entity as User;
