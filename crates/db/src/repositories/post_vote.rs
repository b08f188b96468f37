//! Post vote repository.

use std::sync::Arc;

use crate::entities::{
    PostVote,
    post_vote::{self, VoteKind},
};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, OnConflict},
};

/// Post vote repository for database operations.
#[derive(Clone)]
pub struct PostVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl PostVoteRepository {
    /// Create a new post vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the vote of a user on a post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<post_vote::Model>> {
        PostVote::find()
            .filter(post_vote::Column::UserId.eq(user_id))
            .filter(post_vote::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a vote unless the user already voted on the post.
    ///
    /// Returns `false` when the unique index rejected the row, which happens
    /// when a concurrent request inserted it first.
    pub async fn insert_if_absent(&self, model: post_vote::ActiveModel) -> AppResult<bool> {
        let inserted = PostVote::insert(model)
            .on_conflict(
                OnConflict::columns([post_vote::Column::UserId, post_vote::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    /// Delete a vote.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        PostVote::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Switch the kind of an existing vote in place (single UPDATE query).
    pub async fn set_kind(&self, id: &str, kind: VoteKind) -> AppResult<()> {
        PostVote::update_many()
            .col_expr(post_vote::Column::Kind, Expr::value(kind))
            .filter(post_vote::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Votes of one kind cast by a user, newest first.
    pub async fn find_by_user_and_kind(
        &self,
        user_id: &str,
        kind: VoteKind,
    ) -> AppResult<Vec<post_vote::Model>> {
        PostVote::find()
            .filter(post_vote::Column::UserId.eq(user_id))
            .filter(post_vote::Column::Kind.eq(kind))
            .order_by_desc(post_vote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count votes of one kind on a post.
    pub async fn count_by_post_and_kind(&self, post_id: &str, kind: VoteKind) -> AppResult<u64> {
        PostVote::find()
            .filter(post_vote::Column::PostId.eq(post_id))
            .filter(post_vote::Column::Kind.eq(kind))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
