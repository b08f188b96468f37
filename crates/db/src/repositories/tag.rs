//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tag::Model>> {
        Tag::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<tag::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {id}")))
    }

    /// Find a tag by its exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags ordered by post count, most used first.
    pub async fn find_popular(&self, limit: u64) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_desc(tag::Column::PostCount)
            .order_by_asc(tag::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new tag.
    pub async fn create(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a tag.
    pub async fn update(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a tag. Posts carrying it become untagged.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Tag::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment post count atomically (single UPDATE query, no fetch).
    pub async fn increment_post_count(&self, id: &str) -> AppResult<()> {
        Tag::update_many()
            .col_expr(
                tag::Column::PostCount,
                Expr::col(tag::Column::PostCount).add(1),
            )
            .filter(tag::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement post count atomically, never below zero.
    pub async fn decrement_post_count(&self, id: &str) -> AppResult<()> {
        Tag::update_many()
            .col_expr(
                tag::Column::PostCount,
                Expr::cust("GREATEST(post_count - 1, 0)"),
            )
            .filter(tag::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
