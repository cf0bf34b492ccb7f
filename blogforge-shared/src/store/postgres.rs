//! PostgreSQL-backed store
//!
//! A thin adapter from the store traits onto the model queries. Uniqueness
//! is guaranteed by the unique constraints in the schema and surfaces as
//! [`StoreError::UniqueViolation`](super::StoreError::UniqueViolation).

use async_trait::async_trait;
use sqlx::PgPool;

use super::{ArticleStore, CategoryStore, CommentStore, Store, StoreResult, TagStore, UserStore};
use crate::db::pool::health_check;
use crate::models::{
    article::{Article, ArticleChanges, ArticleFilter, Counter, NewArticle},
    category::{Category, CategoryChanges, NewCategory},
    comment::{Comment, NewComment},
    tag::{ArticleTag, Tag},
    user::{NewUser, ProfileChanges, User},
};

/// Store over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_users(&self, ids: &[i64]) -> StoreResult<Vec<User>> {
        Ok(User::find_many(&self.pool, ids).await?)
    }

    async fn update_profile(&self, id: i64, changes: &ProfileChanges) -> StoreResult<Option<User>> {
        Ok(User::update_profile(&self.pool, id, changes).await?)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<bool> {
        Ok(User::update_password_hash(&self.pool, id, password_hash).await?)
    }
}

#[async_trait]
impl ArticleStore for PgStore {
    async fn create_article(&self, author_id: i64, data: NewArticle) -> StoreResult<Article> {
        Ok(Article::create(&self.pool, author_id, data).await?)
    }

    async fn find_article(&self, id: i64) -> StoreResult<Option<Article>> {
        Ok(Article::find_by_id(&self.pool, id).await?)
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Article>> {
        Ok(Article::list(&self.pool, filter, limit, offset).await?)
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64> {
        Ok(Article::count(&self.pool, filter).await?)
    }

    async fn count_articles_in_category(&self, category_id: i64) -> StoreResult<i64> {
        Ok(Article::count_in_category(&self.pool, category_id).await?)
    }

    async fn update_article(&self, id: i64, changes: &ArticleChanges) -> StoreResult<Option<Article>> {
        Ok(Article::update(&self.pool, id, changes).await?)
    }

    async fn replace_article_tags(&self, id: i64, tag_ids: &[i64]) -> StoreResult<()> {
        Ok(Article::replace_tags(&self.pool, id, tag_ids).await?)
    }

    async fn delete_article(&self, id: i64) -> StoreResult<bool> {
        Ok(Article::delete(&self.pool, id).await?)
    }

    async fn increment_counter(&self, id: i64, counter: Counter) -> StoreResult<u64> {
        Ok(Article::increment(&self.pool, id, counter).await?)
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn create_category(&self, data: NewCategory) -> StoreResult<Category> {
        Ok(Category::create(&self.pool, data).await?)
    }

    async fn find_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(Category::find_by_id(&self.pool, id).await?)
    }

    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(Category::find_by_name(&self.pool, name).await?)
    }

    async fn find_categories(&self, ids: &[i64]) -> StoreResult<Vec<Category>> {
        Ok(Category::find_many(&self.pool, ids).await?)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(Category::list(&self.pool).await?)
    }

    async fn update_category(&self, id: i64, changes: &CategoryChanges) -> StoreResult<Option<Category>> {
        Ok(Category::update(&self.pool, id, changes).await?)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<bool> {
        Ok(Category::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl TagStore for PgStore {
    async fn create_tag(&self, name: &str) -> StoreResult<Tag> {
        Ok(Tag::create(&self.pool, name).await?)
    }

    async fn find_tag(&self, id: i64) -> StoreResult<Option<Tag>> {
        Ok(Tag::find_by_id(&self.pool, id).await?)
    }

    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        Ok(Tag::find_by_name(&self.pool, name).await?)
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(Tag::list(&self.pool).await?)
    }

    async fn delete_tag(&self, id: i64) -> StoreResult<bool> {
        Ok(Tag::delete(&self.pool, id).await?)
    }

    async fn tags_for_articles(&self, article_ids: &[i64]) -> StoreResult<Vec<ArticleTag>> {
        Ok(Tag::for_articles(&self.pool, article_ids).await?)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn create_comment(&self, data: NewComment) -> StoreResult<Comment> {
        Ok(Comment::create(&self.pool, data).await?)
    }

    async fn find_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        Ok(Comment::find_by_id(&self.pool, id).await?)
    }

    async fn list_comments(&self, article_id: i64) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_active_for_article(&self.pool, article_id).await?)
    }

    async fn soft_delete_comment(&self, id: i64) -> StoreResult<bool> {
        Ok(Comment::soft_delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
