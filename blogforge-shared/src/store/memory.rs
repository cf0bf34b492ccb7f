//! In-memory store
//!
//! Mirrors the PostgreSQL store's observable behaviour (ordering, unique
//! constraints and their names, cascades, atomic counters) behind a single
//! `RwLock`. Every trait call takes the lock once, so each call is atomic
//! with respect to every other call.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::{
    ArticleStore, CategoryStore, CommentStore, Store, StoreError, StoreResult, TagStore, UserStore,
};
use crate::models::{
    article::{Article, ArticleChanges, ArticleFilter, Counter, NewArticle},
    category::{self, Category, CategoryChanges, NewCategory},
    comment::{Comment, CommentStatus, NewComment},
    tag::{self, ArticleTag, Tag},
    user::{self, NewUser, ProfileChanges, User},
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    articles: BTreeMap<i64, Article>,
    categories: BTreeMap<i64, Category>,
    tags: BTreeMap<i64, Tag>,
    article_tags: BTreeSet<(i64, i64)>,
    comments: BTreeMap<i64, Comment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.as_deref() == Some(email))
    }

    fn attach_tags(&mut self, article_id: i64, tag_ids: &[i64]) {
        for tag_id in tag_ids {
            if self.tags.contains_key(tag_id) {
                self.article_tags.insert((article_id, *tag_id));
            }
        }
    }
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation(constraint.to_string())
}

/// Store kept entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;

        if t.users.values().any(|u| u.username == data.username) {
            return Err(unique(user::USERNAME_UNIQUE));
        }
        if let Some(email) = &data.email {
            if t.email_taken(email, None) {
                return Err(unique(user::EMAIL_UNIQUE));
            }
        }

        let now = Utc::now();
        let user = User {
            id: t.next_id(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            nickname: data.nickname,
            avatar: String::new(),
            role: data.role,
            status: data.status,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email.as_deref() == Some(email)).cloned())
    }

    async fn find_users(&self, ids: &[i64]) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| t.users.get(id).cloned()).collect())
    }

    async fn update_profile(&self, id: i64, changes: &ProfileChanges) -> StoreResult<Option<User>> {
        let mut t = self.tables.write().await;

        if let Some(Some(email)) = &changes.email {
            if t.email_taken(email, Some(id)) {
                return Err(unique(user::EMAIL_UNIQUE));
            }
        }

        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(nickname) = &changes.nickname {
            user.nickname = nickname.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(avatar) = &changes.avatar {
            user.avatar = avatar.clone();
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        Ok(match t.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn create_article(&self, author_id: i64, data: NewArticle) -> StoreResult<Article> {
        let mut t = self.tables.write().await;

        if !t.users.contains_key(&author_id) {
            return Err(StoreError::Database(format!(
                "author {} does not exist",
                author_id
            )));
        }

        let now = Utc::now();
        let article = Article {
            id: t.next_id(),
            title: data.title,
            description: data.description,
            content: data.content,
            cover: data.cover,
            author_id,
            category_id: data.category_id,
            view_count: 0,
            like_count: 0,
            status: data.status,
            is_top: data.is_top,
            created_at: now,
            updated_at: now,
        };
        t.articles.insert(article.id, article.clone());
        t.attach_tags(article.id, &data.tag_ids);

        Ok(article)
    }

    async fn find_article(&self, id: i64) -> StoreResult<Option<Article>> {
        Ok(self.tables.read().await.articles.get(&id).cloned())
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Article>> {
        let t = self.tables.read().await;

        let mut matching: Vec<&Article> = t.articles.values().filter(|a| filter.matches(a)).collect();
        matching.sort_by(|a, b| {
            b.is_top
                .cmp(&a.is_top)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        Ok(matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or_default())
            .take(usize::try_from(limit).unwrap_or_default())
            .cloned()
            .collect())
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t.articles.values().filter(|a| filter.matches(a)).count() as i64)
    }

    async fn count_articles_in_category(&self, category_id: i64) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t.articles
            .values()
            .filter(|a| a.category_id == Some(category_id))
            .count() as i64)
    }

    async fn update_article(&self, id: i64, changes: &ArticleChanges) -> StoreResult<Option<Article>> {
        let mut t = self.tables.write().await;

        let Some(article) = t.articles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            article.title = title.clone();
        }
        if let Some(description) = &changes.description {
            article.description = description.clone();
        }
        if let Some(content) = &changes.content {
            article.content = content.clone();
        }
        if let Some(cover) = &changes.cover {
            article.cover = cover.clone();
        }
        if let Some(category_id) = changes.category_id {
            article.category_id = category_id;
        }
        if let Some(status) = changes.status {
            article.status = status;
        }
        if let Some(is_top) = changes.is_top {
            article.is_top = is_top;
        }
        article.updated_at = Utc::now();

        Ok(Some(article.clone()))
    }

    async fn replace_article_tags(&self, id: i64, tag_ids: &[i64]) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.article_tags.retain(|(article_id, _)| *article_id != id);
        t.attach_tags(id, tag_ids);
        Ok(())
    }

    async fn delete_article(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.write().await;

        if t.articles.remove(&id).is_none() {
            return Ok(false);
        }
        t.article_tags.retain(|(article_id, _)| *article_id != id);
        t.comments.retain(|_, c| c.article_id != id);

        Ok(true)
    }

    async fn increment_counter(&self, id: i64, counter: Counter) -> StoreResult<u64> {
        let mut t = self.tables.write().await;

        let Some(article) = t.articles.get_mut(&id) else {
            return Ok(0);
        };
        match counter {
            Counter::Views => article.view_count += 1,
            Counter::Likes => article.like_count += 1,
        }

        Ok(1)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn create_category(&self, data: NewCategory) -> StoreResult<Category> {
        let mut t = self.tables.write().await;

        if t.categories.values().any(|c| c.name == data.name) {
            return Err(unique(category::NAME_UNIQUE));
        }

        let now = Utc::now();
        let category = Category {
            id: t.next_id(),
            name: data.name,
            description: data.description,
            sort: data.sort,
            created_at: now,
            updated_at: now,
        };
        t.categories.insert(category.id, category.clone());

        Ok(category)
    }

    async fn find_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let t = self.tables.read().await;
        Ok(t.categories.values().find(|c| c.name == name).cloned())
    }

    async fn find_categories(&self, ids: &[i64]) -> StoreResult<Vec<Category>> {
        let t = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| t.categories.get(id).cloned()).collect())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let t = self.tables.read().await;

        let mut categories: Vec<Category> = t.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.sort.cmp(&b.sort).then(b.id.cmp(&a.id)));

        Ok(categories)
    }

    async fn update_category(&self, id: i64, changes: &CategoryChanges) -> StoreResult<Option<Category>> {
        let mut t = self.tables.write().await;

        if let Some(name) = &changes.name {
            if t.categories.values().any(|c| c.id != id && &c.name == name) {
                return Err(unique(category::NAME_UNIQUE));
            }
        }

        let Some(category) = t.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            category.name = name.clone();
        }
        if let Some(description) = &changes.description {
            category.description = description.clone();
        }
        if let Some(sort) = changes.sort {
            category.sort = sort;
        }
        category.updated_at = Utc::now();

        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn create_tag(&self, name: &str) -> StoreResult<Tag> {
        let mut t = self.tables.write().await;

        if t.tags.values().any(|tag| tag.name == name) {
            return Err(unique(tag::NAME_UNIQUE));
        }

        let now = Utc::now();
        let tag = Tag {
            id: t.next_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.tags.insert(tag.id, tag.clone());

        Ok(tag)
    }

    async fn find_tag(&self, id: i64) -> StoreResult<Option<Tag>> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        let t = self.tables.read().await;
        Ok(t.tags.values().find(|tag| tag.name == name).cloned())
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let t = self.tables.read().await;

        let mut tags: Vec<Tag> = t.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(tags)
    }

    async fn delete_tag(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.write().await;

        if t.tags.remove(&id).is_none() {
            return Ok(false);
        }
        t.article_tags.retain(|(_, tag_id)| *tag_id != id);

        Ok(true)
    }

    async fn tags_for_articles(&self, article_ids: &[i64]) -> StoreResult<Vec<ArticleTag>> {
        let t = self.tables.read().await;

        let mut rows: Vec<ArticleTag> = t
            .article_tags
            .iter()
            .filter(|(article_id, _)| article_ids.contains(article_id))
            .filter_map(|(article_id, tag_id)| {
                t.tags.get(tag_id).map(|tag| ArticleTag {
                    article_id: *article_id,
                    tag: tag.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|row| row.tag.id);

        Ok(rows)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(&self, data: NewComment) -> StoreResult<Comment> {
        let mut t = self.tables.write().await;

        let now = Utc::now();
        let comment = Comment {
            id: t.next_id(),
            article_id: data.article_id,
            user_id: data.user_id,
            parent_id: data.parent_id,
            content: data.content,
            status: CommentStatus::Active,
            created_at: now,
            updated_at: now,
        };
        t.comments.insert(comment.id, comment.clone());

        Ok(comment)
    }

    async fn find_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self, article_id: i64) -> StoreResult<Vec<Comment>> {
        let t = self.tables.read().await;

        // BTreeMap iteration is id order, which is creation order here.
        Ok(t.comments
            .values()
            .filter(|c| c.article_id == article_id && c.status == CommentStatus::Active)
            .cloned()
            .collect())
    }

    async fn soft_delete_comment(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        Ok(match t.comments.get_mut(&id) {
            Some(comment) => {
                comment.status = CommentStatus::Deleted;
                comment.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::article::ArticleStatus;
    use crate::models::user::{UserRole, UserStatus};
    use std::sync::Arc;

    fn new_user(username: &str, email: Option<&str>) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash: "hash".to_string(),
            nickname: String::new(),
            role: UserRole::User,
            status: UserStatus::Active,
        }
    }

    fn new_article(is_top: bool, tag_ids: Vec<i64>) -> NewArticle {
        NewArticle {
            title: "title".to_string(),
            description: String::new(),
            content: String::new(),
            cover: String::new(),
            category_id: None,
            status: ArticleStatus::Published,
            is_top,
            tag_ids,
        }
    }

    #[tokio::test]
    async fn test_user_unique_constraints() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice", Some("a@example.com"))).await.unwrap();

        let err = store.create_user(new_user("alice", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref c) if c == user::USERNAME_UNIQUE));

        let err = store.create_user(new_user("bob", Some("a@example.com"))).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref c) if c == user::EMAIL_UNIQUE));

        // NULL emails never collide
        store.create_user(new_user("carol", None)).await.unwrap();
        store.create_user(new_user("dave", None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_listing_order_and_paging() {
        let store = MemoryStore::new();
        let author = store.create_user(new_user("alice", None)).await.unwrap();

        let pinned = store.create_article(author.id, new_article(true, vec![])).await.unwrap();
        let newer = store.create_article(author.id, new_article(false, vec![])).await.unwrap();

        let all = store.list_articles(&ArticleFilter::default(), 10, 0).await.unwrap();
        assert_eq!(all.iter().map(|a| a.id).collect::<Vec<_>>(), vec![pinned.id, newer.id]);

        let second = store.list_articles(&ArticleFilter::default(), 1, 1).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, newer.id);
    }

    #[tokio::test]
    async fn test_delete_article_cascades() {
        let store = MemoryStore::new();
        let author = store.create_user(new_user("alice", None)).await.unwrap();
        let tag = store.create_tag("rust").await.unwrap();
        let article = store.create_article(author.id, new_article(false, vec![tag.id, 999])).await.unwrap();
        store
            .create_comment(NewComment {
                article_id: article.id,
                user_id: author.id,
                parent_id: None,
                content: "hi".to_string(),
            })
            .await
            .unwrap();

        let tags = store.tags_for_articles(&[article.id]).await.unwrap();
        assert_eq!(tags.len(), 1, "unknown tag ids are ignored");

        assert!(store.delete_article(article.id).await.unwrap());
        assert!(store.tags_for_articles(&[article.id]).await.unwrap().is_empty());
        assert!(store.list_comments(article.id).await.unwrap().is_empty());
        assert!(!store.delete_article(article.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_increments() {
        let store = Arc::new(MemoryStore::new());
        let author = store.create_user(new_user("alice", None)).await.unwrap();
        let article = store.create_article(author.id, new_article(false, vec![])).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_counter(article.id, Counter::Views).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        }

        let article = store.find_article(article.id).await.unwrap().unwrap();
        assert_eq!(article.view_count, 50);
        assert_eq!(store.increment_counter(9999, Counter::Likes).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_category_ordering() {
        let store = MemoryStore::new();
        let b = store.create_category(NewCategory { name: "b".into(), description: String::new(), sort: 1 }).await.unwrap();
        let a = store.create_category(NewCategory { name: "a".into(), description: String::new(), sort: 0 }).await.unwrap();
        let c = store.create_category(NewCategory { name: "c".into(), description: String::new(), sort: 1 }).await.unwrap();

        let ids: Vec<i64> = store.list_categories().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, c.id, b.id]);
    }
}
