//! Threaded comments with soft delete

use std::collections::HashMap;
use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::auth::middleware::AuthContext;
use crate::models::comment::{CommentStatus, CommentView, NewComment};
use crate::models::user::{UserRole, UserSummary};
use crate::store::Store;

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Active comments of an article, oldest first, with authors attached
    pub async fn list_for_article(&self, article_id: i64) -> ServiceResult<Vec<CommentView>> {
        self.ensure_article(article_id).await?;

        let comments = self.store.list_comments(article_id).await?;

        let mut user_ids: Vec<i64> = comments.iter().map(|c| c.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let users: HashMap<i64, UserSummary> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .find_users(&user_ids)
                .await?
                .iter()
                .map(|u| (u.id, UserSummary::from(u)))
                .collect()
        };

        Ok(comments
            .into_iter()
            .map(|comment| CommentView {
                user: users.get(&comment.user_id).cloned(),
                comment,
            })
            .collect())
    }

    /// Posts a comment, optionally replying to another on the same article
    pub async fn create(
        &self,
        article_id: i64,
        user_id: i64,
        content: String,
        parent_id: Option<i64>,
    ) -> ServiceResult<CommentView> {
        self.ensure_article(article_id).await?;

        if let Some(parent_id) = parent_id {
            match self.store.find_comment(parent_id).await? {
                Some(parent)
                    if parent.article_id == article_id
                        && parent.status == CommentStatus::Active => {}
                _ => {
                    return Err(ServiceError::InvalidInput(
                        "Parent comment does not belong to this article".to_string(),
                    ))
                }
            }
        }

        let comment = self
            .store
            .create_comment(NewComment {
                article_id,
                user_id,
                parent_id,
                content,
            })
            .await?;

        tracing::info!(comment_id = comment.id, article_id, user_id, "Comment posted");

        let user = self.store.find_user(user_id).await?;
        Ok(CommentView {
            user: user.as_ref().map(UserSummary::from),
            comment,
        })
    }

    /// Soft-deletes a comment; only its author or an admin may do so
    pub async fn delete(&self, comment_id: i64, actor: &AuthContext) -> ServiceResult<()> {
        let comment = self
            .store
            .find_comment(comment_id)
            .await?
            .filter(|c| c.status == CommentStatus::Active)
            .ok_or(ServiceError::NotFound("Comment"))?;

        if comment.user_id != actor.user_id && !actor.has_role(UserRole::Admin.as_str()) {
            return Err(ServiceError::Forbidden("Not allowed to delete this comment"));
        }

        self.store.soft_delete_comment(comment_id).await?;
        tracing::info!(comment_id, actor = actor.user_id, "Comment deleted");
        Ok(())
    }

    async fn ensure_article(&self, article_id: i64) -> ServiceResult<()> {
        match self.store.find_article(article_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound("Article")),
        }
    }
}
