//! User repository.

use std::sync::Arc;

use crate::entities::{
    User,
    user::{self, UserStatus},
};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .order_by_desc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email. The lookup is case-insensitive.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user. Posts, comments, votes and subscriptions cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = User::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::UserNotFound(id.to_string()));
        }
        Ok(())
    }

    /// List users, newest first, optionally filtered by a case-insensitive
    /// substring of the first or last name.
    pub async fn search(&self, query: Option<&str>, limit: u64) -> AppResult<Vec<user::Model>> {
        let mut select = User::find();

        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!(
                "%{}%",
                q.to_lowercase().replace('%', "\\%").replace('_', "\\_")
            );
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(user::Column::FirstName))).like(&pattern))
                    .add(Expr::expr(Func::lower(Expr::col(user::Column::LastName))).like(&pattern)),
            );
        }

        select
            .order_by_desc(user::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Next page of users the activity sweep may reclassify (everyone but
    /// banned users), ordered by ID and starting after `after`.
    pub async fn find_sweepable_page(
        &self,
        after: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        let mut query = User::find()
            .filter(user::Column::Status.ne(UserStatus::Banned))
            .order_by_asc(user::Column::Id);

        if let Some(id) = after {
            query = query.filter(user::Column::Id.gt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write an activity status (single UPDATE query, no fetch).
    pub async fn set_status(
        &self,
        user_id: &str,
        status: UserStatus,
        at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<()> {
        User::update_many()
            .col_expr(user::Column::Status, Expr::value(status))
            .col_expr(user::Column::StatusUpdatedAt, Expr::value(Some(at)))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
