//! Storage seam
//!
//! Services talk to storage only through the traits in this module. Two
//! implementations exist:
//!
//! - [`postgres::PgStore`]: production storage, delegating to the model
//!   queries in [`crate::models`]
//! - [`memory::MemoryStore`]: in-process storage used by tests and local
//!   tooling
//!
//! # Contract
//!
//! - Uniqueness of usernames, emails, category names and tag names is
//!   enforced by the store itself and reported as
//!   [`StoreError::UniqueViolation`] carrying the constraint name.
//! - `increment_counter` is atomic: concurrent increments on one article
//!   never lose an update.
//! - Deleting an article removes its tag associations and comments.
//! - Unknown tag IDs passed to article create/replace are ignored.

use async_trait::async_trait;

use crate::models::{
    article::{Article, ArticleChanges, ArticleFilter, Counter, NewArticle},
    category::{Category, CategoryChanges, NewCategory},
    comment::{Comment, NewComment},
    tag::{ArticleTag, Tag},
    user::{NewUser, ProfileChanges, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(
                    db_err.constraint().unwrap_or_default().to_string(),
                );
            }
        }
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store; sole owner of user records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, data: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_users(&self, ids: &[i64]) -> StoreResult<Vec<User>>;
    async fn update_profile(&self, id: i64, changes: &ProfileChanges) -> StoreResult<Option<User>>;

    /// Returns `false` if the user doesn't exist
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn create_article(&self, author_id: i64, data: NewArticle) -> StoreResult<Article>;
    async fn find_article(&self, id: i64) -> StoreResult<Option<Article>>;

    /// One page in `is_top DESC, created_at DESC, id DESC` order
    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Article>>;

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64>;
    async fn count_articles_in_category(&self, category_id: i64) -> StoreResult<i64>;

    /// Row fields only; tag associations are left alone
    async fn update_article(&self, id: i64, changes: &ArticleChanges) -> StoreResult<Option<Article>>;

    async fn replace_article_tags(&self, id: i64, tag_ids: &[i64]) -> StoreResult<()>;
    async fn delete_article(&self, id: i64) -> StoreResult<bool>;

    /// Atomic `+1`; returns rows touched (zero for a missing article)
    async fn increment_counter(&self, id: i64, counter: Counter) -> StoreResult<u64>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create_category(&self, data: NewCategory) -> StoreResult<Category>;
    async fn find_category(&self, id: i64) -> StoreResult<Option<Category>>;
    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>>;
    async fn find_categories(&self, ids: &[i64]) -> StoreResult<Vec<Category>>;

    /// Ordered `sort ASC, id DESC`
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    async fn update_category(&self, id: i64, changes: &CategoryChanges) -> StoreResult<Option<Category>>;
    async fn delete_category(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn create_tag(&self, name: &str) -> StoreResult<Tag>;
    async fn find_tag(&self, id: i64) -> StoreResult<Option<Tag>>;
    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>>;

    /// Ordered by name
    async fn list_tags(&self) -> StoreResult<Vec<Tag>>;

    async fn delete_tag(&self, id: i64) -> StoreResult<bool>;
    async fn tags_for_articles(&self, article_ids: &[i64]) -> StoreResult<Vec<ArticleTag>>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, data: NewComment) -> StoreResult<Comment>;
    async fn find_comment(&self, id: i64) -> StoreResult<Option<Comment>>;

    /// Active comments, oldest first
    async fn list_comments(&self, article_id: i64) -> StoreResult<Vec<Comment>>;

    async fn soft_delete_comment(&self, id: i64) -> StoreResult<bool>;
}

/// Everything the services need from storage
#[async_trait]
pub trait Store: UserStore + ArticleStore + CategoryStore + TagStore + CommentStore {
    /// Cheap round-trip used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}
