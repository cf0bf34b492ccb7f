//! Category model and database operations
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE categories (
//!     id BIGSERIAL PRIMARY KEY,
//!     name VARCHAR(50) NOT NULL,              -- categories_name_key
//!     description VARCHAR(255) NOT NULL DEFAULT '',
//!     sort INTEGER NOT NULL DEFAULT 0,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Articles reference categories through `articles.category_id` without a
//! foreign key; [`crate::services::categories`] refuses to delete a category
//! that is still referenced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Unique constraint on `categories.name`
pub const NAME_UNIQUE: &str = "categories_name_key";

/// Article category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,

    /// Unique, case-sensitive name
    pub name: String,

    pub description: String,

    /// Display priority, ascending
    pub sort: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub sort: i32,
}

/// Partial category update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort: Option<i32>,
}

const CATEGORY_COLUMNS: &str = "id, name, description, sort, created_at, updated_at";

impl Category {
    /// Creates a category
    pub async fn create(pool: &PgPool, data: NewCategory) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, description, sort)
            VALUES ($1, $2, $3)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.sort)
        .fetch_one(pool)
        .await
    }

    /// Finds a category by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a category by exact name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Loads every category whose ID is in `ids`
    pub async fn find_many(pool: &PgPool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Lists all categories, `sort` ascending then newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort ASC, id DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update; `None` if the category doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: &CategoryChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query =
            sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE categories SET updated_at = NOW()");

        if let Some(name) = &changes.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = &changes.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(sort) = changes.sort {
            query.push(", sort = ").push_bind(sort);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {CATEGORY_COLUMNS}"));

        query.build_query_as::<Category>().fetch_optional(pool).await
    }

    /// Deletes a category; `false` if it didn't exist
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
