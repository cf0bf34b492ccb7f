//! Article model and database operations
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE articles (
//!     id BIGSERIAL PRIMARY KEY,
//!     title VARCHAR(200) NOT NULL,
//!     description VARCHAR(500) NOT NULL DEFAULT '',
//!     content TEXT NOT NULL DEFAULT '',
//!     cover VARCHAR(255) NOT NULL DEFAULT '',
//!     author_id BIGINT NOT NULL REFERENCES users(id),
//!     category_id BIGINT,
//!     view_count BIGINT NOT NULL DEFAULT 0,
//!     like_count BIGINT NOT NULL DEFAULT 0,
//!     status article_status NOT NULL DEFAULT 'draft',
//!     is_top BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Ordering
//!
//! Listings are always ordered pinned first, then newest first:
//! `is_top DESC, created_at DESC, id DESC`. The trailing `id` keeps pages
//! stable when two articles share a creation timestamp.
//!
//! # Counters
//!
//! `view_count` and `like_count` are only ever changed by single-statement
//! `col = col + 1` updates, so concurrent increments never lose a write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::category::Category;
use super::tag::Tag;
use super::user::UserSummary;

/// Publication state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "article_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    /// Numeric form used on the wire (`0` draft, `1` published)
    pub fn code(&self) -> i16 {
        match self {
            ArticleStatus::Draft => 0,
            ArticleStatus::Published => 1,
        }
    }

    /// Parses the numeric wire form
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(ArticleStatus::Draft),
            1 => Some(ArticleStatus::Published),
            _ => None,
        }
    }
}

/// Article row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub cover: String,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub view_count: i64,
    pub like_count: i64,
    pub status: ArticleStatus,
    pub is_top: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article with its author, category and tags attached
#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: Article,

    pub author: Option<UserSummary>,

    pub category: Option<Category>,

    pub tags: Vec<Tag>,
}

/// Input for creating an article
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    pub content: String,
    pub cover: String,
    pub category_id: Option<i64>,
    pub status: ArticleStatus,
    pub is_top: bool,

    /// Unknown tag IDs are ignored
    pub tag_ids: Vec<i64>,
}

/// Partial article update
///
/// `None` leaves a field untouched; `category_id: Some(None)` detaches the
/// category. Tags are replaced only when `tag_ids` is a non-empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub cover: Option<String>,
    pub category_id: Option<Option<i64>>,
    pub status: Option<ArticleStatus>,
    pub is_top: Option<bool>,
    pub tag_ids: Option<Vec<i64>>,
}

impl ArticleChanges {
    /// The tag set to install, if the update replaces tags at all
    pub fn replacement_tags(&self) -> Option<&[i64]> {
        match &self.tag_ids {
            Some(ids) if !ids.is_empty() => Some(ids),
            _ => None,
        }
    }
}

/// Equality filters for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub status: Option<ArticleStatus>,
    pub category_id: Option<i64>,
}

impl ArticleFilter {
    /// Whether `article` passes every filter
    pub fn matches(&self, article: &Article) -> bool {
        self.status.map_or(true, |s| article.status == s)
            && self.category_id.map_or(true, |c| article.category_id == Some(c))
    }

    fn push_where(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(" WHERE TRUE");
        if let Some(status) = self.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(category_id) = self.category_id {
            query.push(" AND category_id = ").push_bind(category_id);
        }
    }
}

/// Counter column targeted by an increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Likes,
}

impl Counter {
    fn column(&self) -> &'static str {
        match self {
            Counter::Views => "view_count",
            Counter::Likes => "like_count",
        }
    }
}

const ARTICLE_COLUMNS: &str = "id, title, description, content, cover, author_id, category_id, \
                               view_count, like_count, status, is_top, created_at, updated_at";

impl Article {
    /// Creates an article and its tag associations in one transaction
    pub async fn create(pool: &PgPool, author_id: i64, data: NewArticle) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let article = sqlx::query_as::<_, Article>(&format!(
            r#"
            INSERT INTO articles (title, description, content, cover, author_id, category_id, status, is_top)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.content)
        .bind(data.cover)
        .bind(author_id)
        .bind(data.category_id)
        .bind(data.status)
        .bind(data.is_top)
        .fetch_one(&mut *tx)
        .await?;

        if !data.tag_ids.is_empty() {
            attach_tags(&mut tx, article.id, &data.tag_ids).await?;
        }

        tx.commit().await?;
        Ok(article)
    }

    /// Finds an article by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists one page of articles matching `filter` in listing order
    pub async fn list(
        pool: &PgPool,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {ARTICLE_COLUMNS} FROM articles"));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY is_top DESC, created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        query.build_query_as::<Article>().fetch_all(pool).await
    }

    /// Counts articles matching `filter`
    pub async fn count(pool: &PgPool, filter: &ArticleFilter) -> Result<i64, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles");
        filter.push_where(&mut query);

        query.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Counts articles filed under a category
    pub async fn count_in_category(pool: &PgPool, category_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(pool)
            .await
    }

    /// Applies a partial update to the article row
    ///
    /// Tags are not touched here; see [`Article::replace_tags`].
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: &ArticleChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE articles SET updated_at = NOW()");

        if let Some(title) = &changes.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = &changes.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(content) = &changes.content {
            query.push(", content = ").push_bind(content);
        }
        if let Some(cover) = &changes.cover {
            query.push(", cover = ").push_bind(cover);
        }
        if let Some(category_id) = changes.category_id {
            query.push(", category_id = ").push_bind(category_id);
        }
        if let Some(status) = changes.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(is_top) = changes.is_top {
            query.push(", is_top = ").push_bind(is_top);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {ARTICLE_COLUMNS}"));

        query.build_query_as::<Article>().fetch_optional(pool).await
    }

    /// Replaces the full tag set of an article
    pub async fn replace_tags(pool: &PgPool, id: i64, tag_ids: &[i64]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        attach_tags(&mut tx, id, tag_ids).await?;

        tx.commit().await
    }

    /// Deletes an article; tag links and comments go with it by cascade
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically adds one to a counter
    ///
    /// Returns the number of rows touched; zero for a missing article.
    pub async fn increment(pool: &PgPool, id: i64, counter: Counter) -> Result<u64, sqlx::Error> {
        let column = counter.column();
        let result = sqlx::query(&format!(
            "UPDATE articles SET {column} = {column} + 1 WHERE id = $1"
        ))
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

async fn attach_tags(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    article_id: i64,
    tag_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO article_tags (article_id, tag_id)
        SELECT $1, id FROM tags WHERE id = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(article_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
