//! Article query engine and article mutations
//!
//! Listings filter first, then count, then page. Related rows (author,
//! category, tags) are loaded in one batch per relation for the whole page
//! rather than per article.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Page, Pagination, ServiceError, ServiceResult};
use crate::models::article::{
    Article, ArticleChanges, ArticleFilter, ArticleStatus, ArticleView, Counter, NewArticle,
};
use crate::models::category::Category;
use crate::models::tag::Tag;
use crate::models::user::UserSummary;
use crate::store::Store;

/// Listing request: equality filters plus clamped paging
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleQuery {
    pub pagination: Pagination,
    pub status: Option<ArticleStatus>,
    pub category_id: Option<i64>,
}

impl ArticleQuery {
    fn filter(&self) -> ArticleFilter {
        ArticleFilter {
            status: self.status,
            category_id: self.category_id,
        }
    }
}

/// Article flows
#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn Store>,
}

impl ArticleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// One page of articles, pinned first then newest first
    pub async fn list(&self, query: ArticleQuery) -> ServiceResult<Page<ArticleView>> {
        let filter = query.filter();
        let Pagination { page, size } = query.pagination;

        let total = self.store.count_articles(&filter).await?;
        let articles = self
            .store
            .list_articles(&filter, size, query.pagination.offset())
            .await?;

        Ok(Page {
            list: self.attach(articles).await?,
            total,
            page,
            size,
        })
    }

    /// Fetches one article and schedules a view-count increment
    ///
    /// The increment runs on its own task after the read; its failure is
    /// logged and never reaches the caller.
    pub async fn get(&self, id: i64) -> ServiceResult<ArticleView> {
        let article = self.find(id).await?;

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.increment_counter(id, Counter::Views).await {
                tracing::warn!(article_id = id, error = %e, "Failed to increment view count");
            }
        });

        self.view(article).await
    }

    pub async fn create(&self, author_id: i64, data: NewArticle) -> ServiceResult<ArticleView> {
        self.ensure_category(data.category_id).await?;

        let article = self.store.create_article(author_id, data).await?;
        tracing::info!(article_id = article.id, author_id, "Article created");
        self.view(article).await
    }

    /// Partial update; tags are replaced only for a non-empty `tag_ids`
    pub async fn update(&self, id: i64, changes: ArticleChanges) -> ServiceResult<ArticleView> {
        self.find(id).await?;
        if let Some(category_id) = changes.category_id {
            self.ensure_category(category_id).await?;
        }

        let article = self
            .store
            .update_article(id, &changes)
            .await?
            .ok_or(ServiceError::NotFound("Article"))?;

        if let Some(tag_ids) = changes.replacement_tags() {
            self.store.replace_article_tags(id, tag_ids).await?;
        }

        tracing::info!(article_id = id, "Article updated");
        self.view(article).await
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.find(id).await?;

        if !self.store.delete_article(id).await? {
            return Err(ServiceError::NotFound("Article"));
        }

        tracing::info!(article_id = id, "Article deleted");
        Ok(())
    }

    /// Likes an existing article
    pub async fn like(&self, id: i64) -> ServiceResult<()> {
        self.find(id).await?;
        self.increment_like_count(id).await
    }

    /// Atomic `+1`; a missing article is a no-op
    pub async fn increment_like_count(&self, id: i64) -> ServiceResult<()> {
        self.store.increment_counter(id, Counter::Likes).await?;
        Ok(())
    }

    /// Atomic `+1`; a missing article is a no-op
    pub async fn increment_view_count(&self, id: i64) -> ServiceResult<()> {
        self.store.increment_counter(id, Counter::Views).await?;
        Ok(())
    }

    async fn find(&self, id: i64) -> ServiceResult<Article> {
        self.store
            .find_article(id)
            .await?
            .ok_or(ServiceError::NotFound("Article"))
    }

    /// Articles may only point at categories that exist
    async fn ensure_category(&self, category_id: Option<i64>) -> ServiceResult<()> {
        let Some(id) = category_id else {
            return Ok(());
        };

        match self.store.find_category(id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound("Category")),
        }
    }

    async fn view(&self, article: Article) -> ServiceResult<ArticleView> {
        let mut views = self.attach(vec![article]).await?;
        views.pop().ok_or(ServiceError::NotFound("Article"))
    }

    async fn attach(&self, articles: Vec<Article>) -> ServiceResult<Vec<ArticleView>> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let article_ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        let mut author_ids: Vec<i64> = articles.iter().map(|a| a.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let mut category_ids: Vec<i64> = articles.iter().filter_map(|a| a.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        let authors: HashMap<i64, UserSummary> = self
            .store
            .find_users(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        let categories: HashMap<i64, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .find_categories(&category_ids)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for link in self.store.tags_for_articles(&article_ids).await? {
            tags.entry(link.article_id).or_default().push(link.tag);
        }

        Ok(articles
            .into_iter()
            .map(|article| ArticleView {
                author: authors.get(&article.author_id).cloned(),
                category: article.category_id.and_then(|c| categories.get(&c).cloned()),
                tags: tags.remove(&article.id).unwrap_or_default(),
                article,
            })
            .collect())
    }
}
