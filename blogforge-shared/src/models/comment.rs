//! Comment model and database operations
//!
//! Comments are soft-deleted: deletion flips `status` to `deleted` and the
//! row stays so that replies keep their parent.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE comments (
//!     id BIGSERIAL PRIMARY KEY,
//!     article_id BIGINT NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
//!     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     parent_id BIGINT REFERENCES comments(id) ON DELETE SET NULL,
//!     content TEXT NOT NULL,
//!     status comment_status NOT NULL DEFAULT 'active',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "comment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Active,
    Deleted,
}

/// Comment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,

    /// Comment this one replies to
    pub parent_id: Option<i64>,

    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment with its author attached
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,

    pub user: Option<UserSummary>,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
}

const COMMENT_COLUMNS: &str =
    "id, article_id, user_id, parent_id, content, status, created_at, updated_at";

impl Comment {
    pub async fn create(pool: &PgPool, data: NewComment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (article_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(data.article_id)
        .bind(data.user_id)
        .bind(data.parent_id)
        .bind(data.content)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Active comments of an article, oldest first
    pub async fn list_active_for_article(
        pool: &PgPool,
        article_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS} FROM comments
            WHERE article_id = $1 AND status = 'active'
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(article_id)
        .fetch_all(pool)
        .await
    }

    /// Flags a comment deleted; `false` if it didn't exist
    pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE comments SET status = 'deleted', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
