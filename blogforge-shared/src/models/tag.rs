//! Tag model and database operations
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tags (
//!     id BIGSERIAL PRIMARY KEY,
//!     name VARCHAR(50) NOT NULL,              -- tags_name_key
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE article_tags (
//!     article_id BIGINT NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
//!     tag_id BIGINT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
//!     PRIMARY KEY (article_id, tag_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Unique constraint on `tags.name`
pub const NAME_UNIQUE: &str = "tags_name_key";

/// Article tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tag together with the article it is attached to
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleTag {
    pub article_id: i64,
    #[sqlx(flatten)]
    pub tag: Tag,
}

impl Tag {
    /// Creates a tag
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name) VALUES ($1) RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Finds a tag by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, created_at, updated_at FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a tag by exact name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "SELECT id, name, created_at, updated_at FROM tags WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Lists all tags by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, created_at, updated_at FROM tags ORDER BY name")
            .fetch_all(pool)
            .await
    }

    /// Deletes a tag and, by cascade, its article associations
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads the tags of every article in `article_ids`
    pub async fn for_articles(
        pool: &PgPool,
        article_ids: &[i64],
    ) -> Result<Vec<ArticleTag>, sqlx::Error> {
        sqlx::query_as::<_, ArticleTag>(
            r#"
            SELECT at.article_id, t.id, t.name, t.created_at, t.updated_at
            FROM article_tags at
            JOIN tags t ON t.id = at.tag_id
            WHERE at.article_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(article_ids)
        .fetch_all(pool)
        .await
    }
}
