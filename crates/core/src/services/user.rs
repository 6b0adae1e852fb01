//! User service.

use microblog_common::{AppError, AppResult, Config, check_password, set_password};
use microblog_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    avatar_base_url: String,
    avatar_default_size: u32,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(email, length(max = 120))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for editing a profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(length(max = 140))]
    pub about_me: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, config: &Config) -> Self {
        Self {
            user_repo,
            avatar_base_url: config.avatar.base_url.clone(),
            avatar_default_size: config.avatar.default_size,
        }
    }

    /// Register a new user.
    ///
    /// Username is checked before email, so a request colliding on both
    /// reports the username.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;
        reject_blank("Username", &input.username)?;
        reject_blank("Password", &input.password)?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateIdentity(format!(
                "username {} is taken",
                input.username
            )));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::DuplicateIdentity(format!(
                "email {} is registered",
                input.email
            )));
        }

        let password_hash = set_password(&input.password)?;

        let model = user::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(Some(password_hash)),
            about_me: Set(None),
            last_seen: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = user.id, username = %user.username, "Registered user");

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i32) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let password_hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;
        if !check_password(password, password_hash) {
            tracing::debug!(username, "Password check failed");
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Change a user's username and bio.
    ///
    /// Keeping one's own username is not a collision.
    pub async fn update_profile(
        &self,
        id: i32,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;
        reject_blank("Username", &input.username)?;

        let user = self.user_repo.get_by_id(id).await?;

        if user.username != input.username {
            let taken = self
                .user_repo
                .find_by_username(&input.username)
                .await?
                .is_some_and(|other| other.id != id);
            if taken {
                return Err(AppError::DuplicateIdentity(format!(
                    "username {} is taken",
                    input.username
                )));
            }
        }

        let mut active: user::ActiveModel = user.into();
        active.username = Set(input.username);
        active.about_me = Set(input.about_me);

        self.user_repo.update(active).await
    }

    /// Record that a user was just active.
    pub async fn touch_last_seen(&self, id: i32) -> AppResult<()> {
        self.user_repo.touch_last_seen(id).await
    }

    /// Identicon URL for a user. `size` defaults to the configured size.
    pub fn avatar_url(&self, user: &user::Model, size: Option<u32>) -> AppResult<String> {
        microblog_common::avatar_url(
            &self.avatar_base_url,
            &user.email,
            size.unwrap_or(self.avatar_default_size),
        )
    }
}

fn reject_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is blank")));
    }
    Ok(())
}
