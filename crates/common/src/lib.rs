//! Common utilities and shared types for the microblog workspace.
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Credentials**: Argon2 password hashing and avatar URL derivation
//!
//! # Example
//!
//! ```no_run
//! use microblog_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Database: {}", config.database.url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;

pub use config::Config;
pub use crypto::{avatar_url, check_password, set_password};
pub use error::{AppError, AppResult};
