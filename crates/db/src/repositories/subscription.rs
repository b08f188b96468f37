//! Subscription repository.

use std::sync::Arc;

use crate::entities::{Subscription, subscription};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, sea_query::OnConflict,
};

/// Subscription repository for database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the subscription of `subscriber_id` to `author_id`.
    pub async fn find_by_pair(
        &self,
        subscriber_id: &str,
        author_id: &str,
    ) -> AppResult<Option<subscription::Model>> {
        Subscription::find()
            .filter(subscription::Column::SubscriberId.eq(subscriber_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a subscription unless the subscriber already follows the author.
    ///
    /// Returns `false` when the unique index rejected the row, which happens
    /// when a concurrent request inserted it first.
    pub async fn insert_if_absent(&self, model: subscription::ActiveModel) -> AppResult<bool> {
        let inserted = Subscription::insert(model)
            .on_conflict(
                OnConflict::columns([
                    subscription::Column::SubscriberId,
                    subscription::Column::AuthorId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    /// Delete a subscription.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Subscription::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Authors a user subscribes to, newest subscription first.
    pub async fn find_by_subscriber(
        &self,
        subscriber_id: &str,
    ) -> AppResult<Vec<subscription::Model>> {
        Subscription::find()
            .filter(subscription::Column::SubscriberId.eq(subscriber_id))
            .order_by_desc(subscription::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users subscribed to an author, newest subscription first.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<subscription::Model>> {
        Subscription::find()
            .filter(subscription::Column::AuthorId.eq(author_id))
            .order_by_desc(subscription::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
