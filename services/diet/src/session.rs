//! Session management backed by the user record
//!
//! A user holds exactly one session token at a time. Registration issues the
//! first one and every session request overwrites it; concurrent renewals
//! resolve as last writer wins.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{NewUser, User, stored_now},
    repositories::UserStore,
};

/// Session manager for registering users and resolving their sessions
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new user and issue its first session token
    pub async fn register(&self, new_user: NewUser) -> ApiResult<(User, String)> {
        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(user_already_exists());
        }

        let token = new_session_token();
        let user = User::register(new_user, token.clone(), stored_now());

        // A concurrent registration can still win the race to the unique index.
        match self.users.insert(&user).await {
            Ok(()) => Ok((user, token)),
            Err(e) if e.is_unique_violation() => Err(user_already_exists()),
            Err(e) => Err(e.into()),
        }
    }

    /// Issue a fresh session token for the user owning `email`, replacing
    /// any previous one
    pub async fn create_session(&self, email: &str) -> ApiResult<String> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(user_does_not_exist)?;

        let token = new_session_token();
        if !self.users.update_session_token(user.id, &token).await? {
            return Err(user_does_not_exist());
        }

        Ok(token)
    }

    /// Resolve a session token to its user
    pub async fn resolve(&self, token: Option<&str>) -> ApiResult<User> {
        let token = match token {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Err(ApiError::Unauthenticated),
        };

        self.users
            .find_by_session_token(token)
            .await?
            .ok_or(ApiError::Unauthenticated)
    }
}

fn new_session_token() -> String {
    Uuid::new_v4().to_string()
}

fn user_already_exists() -> ApiError {
    ApiError::AlreadyExists("User already exists".to_string())
}

fn user_does_not_exist() -> ApiError {
    ApiError::NotFound("User does not exist".to_string())
}
