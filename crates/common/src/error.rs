//! Error types for the microblog core.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Follow-graph and feed operations never produce an error for "already
/// following", "not following" or "empty feed"; those are valid states.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot follow yourself")]
    SelfFollow,

    #[error("Unauthorized")]
    Unauthorized,

    // === Server Errors ===
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for callers at the request-handling boundary.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::DuplicateIdentity(_) => "DUPLICATE_IDENTITY",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::SelfFollow => "SELF_FOLLOW",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether the caller caused this error (bad input, missing
    /// record, failed credentials) rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::PostNotFound(_)
                | Self::DuplicateIdentity(_)
                | Self::Validation(_)
                | Self::SelfFollow
                | Self::Unauthorized
        )
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
