//! Tag management

use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::models::tag::{self, Tag};
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct TagService {
    store: Arc<dyn Store>,
}

impl TagService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All tags, by name
    pub async fn list(&self) -> ServiceResult<Vec<Tag>> {
        Ok(self.store.list_tags().await?)
    }

    pub async fn create(&self, name: &str) -> ServiceResult<Tag> {
        if self.store.find_tag_by_name(name).await?.is_some() {
            return Err(ServiceError::DuplicateName("Tag"));
        }

        let tag = self.store.create_tag(name).await.map_err(|e| match e {
            StoreError::UniqueViolation(c) if c == tag::NAME_UNIQUE => ServiceError::DuplicateName("Tag"),
            other => ServiceError::Store(other),
        })?;

        tracing::info!(tag_id = tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    /// Deletes a tag and detaches it from every article
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.store.delete_tag(id).await? {
            return Err(ServiceError::NotFound("Tag"));
        }

        tracing::info!(tag_id = id, "Tag deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_tag_lifecycle() {
        let tags = TagService::new(Arc::new(MemoryStore::new()));

        let rust = tags.create("rust").await.unwrap();
        tags.create("axum").await.unwrap();
        assert!(matches!(tags.create("rust").await, Err(ServiceError::DuplicateName("Tag"))));

        let names: Vec<String> = tags.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["axum", "rust"]);

        tags.delete(rust.id).await.unwrap();
        assert!(matches!(tags.delete(rust.id).await, Err(ServiceError::NotFound("Tag"))));
        assert_eq!(tags.list().await.unwrap().len(), 1);
    }
}
