//! Post favorite repository.

use std::sync::Arc;

use crate::entities::{PostFavorite, post_favorite};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::OnConflict,
};

/// Post favorite repository for database operations.
#[derive(Clone)]
pub struct PostFavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl PostFavoriteRepository {
    /// Create a new post favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a favorite by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<post_favorite::Model>> {
        PostFavorite::find()
            .filter(post_favorite::Column::UserId.eq(user_id))
            .filter(post_favorite::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a favorite unless the user already favorited the post.
    ///
    /// Returns `false` when the unique index rejected the row, which happens
    /// when a concurrent request inserted it first.
    pub async fn insert_if_absent(&self, model: post_favorite::ActiveModel) -> AppResult<bool> {
        let inserted = PostFavorite::insert(model)
            .on_conflict(
                OnConflict::columns([post_favorite::Column::UserId, post_favorite::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    /// Delete a favorite.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        PostFavorite::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Favorites of a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<post_favorite::Model>> {
        PostFavorite::find()
            .filter(post_favorite::Column::UserId.eq(user_id))
            .order_by_desc(post_favorite::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count favorites on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        PostFavorite::find()
            .filter(post_favorite::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
