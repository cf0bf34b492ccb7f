//! User model and database operations
//!
//! Users are the only principals of the system. The credential flow in
//! [`crate::services::account`] is the sole writer of this table.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id BIGSERIAL PRIMARY KEY,
//!     username VARCHAR(50) NOT NULL,          -- users_username_key
//!     email VARCHAR(100),                     -- users_email_key, NULL when absent
//!     password_hash VARCHAR(255) NOT NULL,
//!     nickname VARCHAR(50) NOT NULL DEFAULT '',
//!     avatar VARCHAR(255) NOT NULL DEFAULT '',
//!     role user_role NOT NULL DEFAULT 'user',
//!     status user_status NOT NULL DEFAULT 'active',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Unique constraint on `users.username`
pub const USERNAME_UNIQUE: &str = "users_username_key";

/// Unique constraint on `users.email`
pub const EMAIL_UNIQUE: &str = "users_email_key";

/// Coarse permission tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access including the admin routes
    Admin,

    /// Regular account
    User,
}

impl UserRole {
    /// Role string as carried in tokens
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

/// Account status; disabled accounts cannot log in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Disabled,
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique and case-sensitive
    pub username: String,

    /// Optional email address, unique when present
    pub email: Option<String>,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name
    pub nickname: String,

    /// Avatar URL
    pub avatar: String,

    pub role: UserRole,

    pub status: UserStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account may log in
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Public projection of a user, attached to articles and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,

    /// `None` stores NULL; an empty string is never stored
    pub email: Option<String>,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub nickname: String,

    pub role: UserRole,

    pub status: UserStatus,
}

/// Partial profile update
///
/// `None` leaves a field untouched. `email: Some(None)` clears the address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub nickname: Option<String>,
    pub email: Option<Option<String>>,
    pub avatar: Option<String>,
}

impl ProfileChanges {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.email.is_none() && self.avatar.is_none()
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, nickname, avatar, role, status, \
                            created_at, updated_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on [`USERNAME_UNIQUE`] or
    /// [`EMAIL_UNIQUE`] when the name or address is taken.
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, nickname, role, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.nickname)
        .bind(data.role)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by exact email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Loads every user whose ID is in `ids`
    pub async fn find_many(pool: &PgPool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial profile update
    ///
    /// Returns the updated user, or `None` if it doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE users SET updated_at = NOW()");

        if let Some(nickname) = &changes.nickname {
            query.push(", nickname = ").push_bind(nickname);
        }
        if let Some(email) = &changes.email {
            query.push(", email = ").push_bind(email);
        }
        if let Some(avatar) = &changes.avatar {
            query.push(", avatar = ").push_bind(avatar);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {USER_COLUMNS}"));

        query.build_query_as::<User>().fetch_optional(pool).await
    }

    /// Replaces the password hash in a single statement
    ///
    /// Returns `false` if the user doesn't exist.
    pub async fn update_password_hash(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            password_hash: "$argon2id$secret".to_string(),
            nickname: "Alice".to_string(),
            avatar: String::new(),
            role: UserRole::User,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_role_strings() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::User.as_str(), "user");
    }

    #[test]
    fn test_summary_projection() {
        let summary = UserSummary::from(&sample());
        assert_eq!(summary.id, 1);
        assert_eq!(summary.username, "alice");
    }

    #[test]
    fn test_profile_changes_is_empty() {
        assert!(ProfileChanges::default().is_empty());
        assert!(!ProfileChanges {
            email: Some(None),
            ..Default::default()
        }
        .is_empty());
    }
}
