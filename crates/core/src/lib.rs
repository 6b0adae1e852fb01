//! Core business logic for the microblog.
//!
//! Services take explicit user IDs on every call; there is no ambient
//! "current user".

pub mod services;

pub use services::*;
