use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::entities::category::{
    ActiveModel as CategoryActiveModel, Column, Entity as Category, Model as CategoryModel,
};
use crate::errors::ServiceError;
use crate::repositories::{BaseRepository, Repository};

/// Repository for the category tree
#[derive(Debug)]
pub struct CategoryRepository<'c, C> {
    base: BaseRepository<'c, C>,
}

impl<'c, C: ConnectionTrait> CategoryRepository<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a category, optionally under `parent_id`
    pub async fn create(
        &self,
        name: impl Into<String>,
        parent_id: Option<i32>,
    ) -> Result<CategoryModel, ServiceError> {
        let name = name.into();
        if name.trim().is_empty() || name.chars().count() > 255 {
            return Err(ServiceError::ValidationError(
                "category name must be 1-255 characters".to_string(),
            ));
        }

        let category = CategoryActiveModel {
            name: Set(name),
            parent_id: Set(parent_id),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await?;

        Ok(category)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<CategoryModel>, ServiceError> {
        Ok(Category::find_by_id(id).one(self.base.get_db()).await?)
    }

    /// Direct children of a category, oldest first
    pub async fn find_children(&self, id: i32) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(Category::find()
            .filter(Column::ParentId.eq(id))
            .order_by_asc(Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    /// Delete a category. Its subtree goes with it via `ON DELETE CASCADE`.
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = Category::delete_by_id(id).exec(self.base.get_db()).await?;
        debug!(category_id = id, rows = result.rows_affected, "category deleted");
        Ok(result.rows_affected > 0)
    }
}
