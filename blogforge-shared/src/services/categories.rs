//! Category management
//!
//! Names are unique. A category still referenced by any article cannot be
//! deleted.

use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::models::category::{self, Category, CategoryChanges, NewCategory};
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn Store>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, data: NewCategory) -> ServiceResult<Category> {
        if self.store.find_category_by_name(&data.name).await?.is_some() {
            return Err(ServiceError::DuplicateName("Category"));
        }

        let category = self
            .store
            .create_category(data)
            .await
            .map_err(map_name_conflict)?;

        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// All categories, `sort ASC, id DESC`
    pub async fn list(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Category> {
        self.store
            .find_category(id)
            .await?
            .ok_or(ServiceError::NotFound("Category"))
    }

    pub async fn update(&self, id: i64, changes: CategoryChanges) -> ServiceResult<Category> {
        self.get(id).await?;

        if let Some(name) = &changes.name {
            if let Some(other) = self.store.find_category_by_name(name).await? {
                if other.id != id {
                    return Err(ServiceError::DuplicateName("Category"));
                }
            }
        }

        self.store
            .update_category(id, &changes)
            .await
            .map_err(map_name_conflict)?
            .ok_or(ServiceError::NotFound("Category"))
    }

    /// Deletes an unused category
    ///
    /// # Errors
    ///
    /// - `NotFound` if the category doesn't exist
    /// - `InUse` if any article is filed under it
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.get(id).await?;

        let in_use = self.store.count_articles_in_category(id).await?;
        if in_use > 0 {
            tracing::debug!(category_id = id, articles = in_use, "Refusing to delete category in use");
            return Err(ServiceError::InUse);
        }

        self.store.delete_category(id).await?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}

fn map_name_conflict(err: StoreError) -> ServiceError {
    match err {
        StoreError::UniqueViolation(c) if c == category::NAME_UNIQUE => {
            ServiceError::DuplicateName("Category")
        }
        other => ServiceError::Store(other),
    }
}
