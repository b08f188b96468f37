//! Quote repository.

use std::sync::Arc;

use crate::entities::{Quote, quote};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
};

/// Quote repository for database operations.
#[derive(Clone)]
pub struct QuoteRepository {
    db: Arc<DatabaseConnection>,
}

impl QuoteRepository {
    /// Create a new quote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a quote by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<quote::Model>> {
        Quote::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a quote by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<quote::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quote {id}")))
    }

    /// All quotes in creation order.
    pub async fn find_all(&self) -> AppResult<Vec<quote::Model>> {
        Quote::find()
            .order_by_asc(quote::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count quotes.
    pub async fn count(&self) -> AppResult<u64> {
        Quote::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The quote at position `offset` in creation order.
    pub async fn find_nth(&self, offset: u64) -> AppResult<Option<quote::Model>> {
        Quote::find()
            .order_by_asc(quote::Column::Id)
            .offset(offset)
            .limit(1)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new quote.
    pub async fn create(&self, model: quote::ActiveModel) -> AppResult<quote::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a quote.
    pub async fn update(&self, model: quote::ActiveModel) -> AppResult<quote::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a quote.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Quote::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
