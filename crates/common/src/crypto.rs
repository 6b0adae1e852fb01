//! Credential and identity primitives.
//!
//! Password hashing is delegated to Argon2 (salted, PHC string format); this
//! module never implements its own KDF. Avatar URLs are a pure derivation from
//! the user's email address.
//!
//! # Examples
//!
//! ```
//! use microblog_common::crypto::{avatar_url, check_password, set_password};
//!
//! let stored = set_password("hunter2").expect("hashing failed");
//! assert!(check_password("hunter2", &stored));
//! assert!(!check_password("hunter3", &stored));
//!
//! let url = avatar_url("https://www.gravatar.com/avatar", "john@example.com", 80).unwrap();
//! assert!(url.ends_with("?d=identicon&s=80"));
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use url::Url;

use crate::{AppError, AppResult};

/// Hash a plaintext password into a storable PHC string.
pub fn set_password(plaintext: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Check a plaintext password against a stored hash.
///
/// A stored value that is not a valid PHC string never matches.
#[must_use]
pub fn check_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Derive the identicon avatar URL for an email address.
///
/// The email is trimmed and lowercased before hashing, so the same mailbox
/// always maps to the same image.
pub fn avatar_url(base_url: &str, email: &str, size: u32) -> AppResult<String> {
    let normalized = email.trim().to_lowercase();
    let digest = format!("{:x}", md5::compute(normalized.as_bytes()));

    let mut url = Url::parse(base_url)
        .map_err(|e| AppError::Config(format!("Invalid avatar base URL: {e}")))?;

    url.path_segments_mut()
        .map_err(|()| AppError::Config(format!("Avatar base URL cannot be a base: {base_url}")))?
        .pop_if_empty()
        .push(&digest);

    url.query_pairs_mut()
        .append_pair("d", "identicon")
        .append_pair("s", &size.to_string());

    Ok(url.into())
}
