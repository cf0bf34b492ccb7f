//! Credential and registration flow
//!
//! Registration and profile changes are the only writers of user records.
//! Username and email uniqueness is pre-checked for a friendly error and
//! then guaranteed by the store's unique constraints; a constraint
//! violation maps back onto the same duplicate error.

use serde::Serialize;
use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::auth::jwt::TokenService;
use crate::auth::password::{hash_password, verify_password};
use crate::models::user::{self, NewUser, ProfileChanges, User, UserRole, UserStatus};
use crate::store::{Store, StoreError};

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
}

/// Access and refresh token issued together at login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Account flows
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Registers a new account with role `user` and status `active`
    ///
    /// # Errors
    ///
    /// - `DuplicateUsername` if the username is taken (exact match)
    /// - `DuplicateEmail` if a non-empty email is taken
    pub async fn register(&self, input: Registration) -> ServiceResult<User> {
        let email = input.email.filter(|e| !e.is_empty());

        if self
            .store
            .find_user_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateUsername);
        }
        if let Some(email) = &email {
            if self.store.find_user_by_email(email).await?.is_some() {
                return Err(ServiceError::DuplicateEmail);
            }
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .store
            .create_user(NewUser {
                username: input.username,
                email,
                password_hash,
                nickname: input.nickname.unwrap_or_default(),
                role: UserRole::User,
                status: UserStatus::Active,
            })
            .await
            .map_err(map_user_conflict)?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues an access/refresh token pair
    ///
    /// Unknown usernames and wrong passwords fail with the same
    /// `InvalidCredentials` error.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<(User, TokenPair)> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !user.is_active() {
            return Err(ServiceError::AccountDisabled);
        }

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let role = user.role.as_str();
        let pair = TokenPair {
            token: self.tokens.issue_access_token(user.id, &user.username, role)?,
            refresh_token: self.tokens.issue_refresh_token(user.id, &user.username, role)?,
        };

        tracing::info!(user_id = user.id, "User logged in");
        Ok((user, pair))
    }

    /// Exchanges a refresh token for a fresh access token
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<String> {
        Ok(self.tokens.refresh_access_token(refresh_token)?)
    }

    pub async fn get_user(&self, id: i64) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }

    /// Applies explicitly supplied profile fields
    pub async fn update_profile(&self, id: i64, changes: ProfileChanges) -> ServiceResult<User> {
        if changes.is_empty() {
            return self.get_user(id).await;
        }

        if let Some(Some(email)) = &changes.email {
            if let Some(owner) = self.store.find_user_by_email(email).await? {
                if owner.id != id {
                    return Err(ServiceError::DuplicateEmail);
                }
            }
        }

        self.store
            .update_profile(id, &changes)
            .await
            .map_err(map_user_conflict)?
            .ok_or(ServiceError::NotFound("User"))
    }

    /// Replaces the password after re-verifying the old one
    pub async fn change_password(
        &self,
        id: i64,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let user = self.get_user(id).await?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(ServiceError::WrongPassword);
        }

        let password_hash = hash_password(new_password)?;
        if !self.store.update_password_hash(id, &password_hash).await? {
            return Err(ServiceError::NotFound("User"));
        }

        tracing::info!(user_id = id, "Password changed");
        Ok(())
    }
}

fn map_user_conflict(err: StoreError) -> ServiceError {
    match err {
        StoreError::UniqueViolation(c) if c == user::USERNAME_UNIQUE => {
            ServiceError::DuplicateUsername
        }
        StoreError::UniqueViolation(c) if c == user::EMAIL_UNIQUE => ServiceError::DuplicateEmail,
        other => ServiceError::Store(other),
    }
}
